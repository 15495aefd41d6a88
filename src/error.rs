//! Error types for Voronoi diagram construction and queries

use std::fmt;

/// Errors that can occur while building a diagram or querying it
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// No sites were supplied
    EmptyInput,
    /// A site has a NaN or infinite coordinate
    InvalidSite {
        /// Index of the offending site in the input slice
        index: usize,
        /// Short description of the problem
        reason: &'static str,
    },
    /// Two input sites coincide and the duplicate policy rejects them
    DuplicateSite {
        /// Index of the first occurrence
        first: usize,
        /// Index of the later, coincident site
        duplicate: usize,
    },
    /// An open edge never meets the clip rectangle
    RayMissedBounds {
        /// Half-edge whose ray or line missed
        half_edge: usize,
    },
    /// An edge still has an open endpoint after clipping
    UnterminatedEdge {
        /// Half-edge with the open endpoint
        half_edge: usize,
    },
    /// Boundary stitching found a chain exit with no entry for the same face
    UnmatchedBoundaryChain {
        /// Face whose chain could not be closed
        face: usize,
    },
    /// A face's `next` pointers do not form a closed cycle
    BrokenFaceCycle {
        /// Face whose cycle is broken
        face: usize,
    },
    /// Requested site index does not exist
    SiteNotFound(usize),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VoronoiError::EmptyInput => write!(f, "no sites supplied"),
            VoronoiError::InvalidSite { index, reason } => {
                write!(f, "invalid site {}: {}", index, reason)
            }
            VoronoiError::DuplicateSite { first, duplicate } => {
                write!(f, "site {} duplicates site {}", duplicate, first)
            }
            VoronoiError::RayMissedBounds { half_edge } => {
                write!(f, "half-edge {} does not reach the clip rectangle", half_edge)
            }
            VoronoiError::UnterminatedEdge { half_edge } => {
                write!(f, "half-edge {} still has an open endpoint after clipping", half_edge)
            }
            VoronoiError::UnmatchedBoundaryChain { face } => {
                write!(f, "boundary chain of face {} could not be closed", face)
            }
            VoronoiError::BrokenFaceCycle { face } => {
                write!(f, "face {} does not form a closed boundary cycle", face)
            }
            VoronoiError::SiteNotFound(id) => write!(f, "site not found: {}", id),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for Voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = VoronoiError::DuplicateSite { first: 0, duplicate: 3 };
        assert_eq!(err.to_string(), "site 3 duplicates site 0");

        let err = VoronoiError::InvalidSite { index: 2, reason: "coordinate is NaN" };
        assert_eq!(err.to_string(), "invalid site 2: coordinate is NaN");
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(VoronoiError::EmptyInput);
        assert_eq!(err.to_string(), "no sites supplied");
    }
}
