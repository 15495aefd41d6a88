//! Diagram Configuration and Builder
//!
//! This module provides the configuration consumed by
//! [`crate::VoronoiDiagram::build`]: the clip rectangle, how far it grows when
//! it is too small, and how coincident input sites are treated.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::{Result, VoronoiError};

/// Default margin added around the data when the clip rectangle must grow
pub const DEFAULT_MARGIN: f64 = 10.0;

/// What to do with input sites that coincide
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`VoronoiError::DuplicateSite`]
    #[default]
    Reject,
    /// Keep the first occurrence; later copies share its cell
    Merge,
}

/// Configuration for building a Voronoi diagram
///
/// The same configuration and sites always produce the identical diagram.
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::*;
///
/// let config = DiagramConfigBuilder::new()
///     .bounds(DVec2::new(0.0, 0.0), DVec2::new(100.0, 50.0))
///     .unwrap()
///     .duplicates(DuplicatePolicy::Merge)
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: DiagramConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Rectangle the diagram is clipped to
    ///
    /// If it does not strictly contain every site and Voronoi vertex it is
    /// enlarged to do so. `None` uses the extent of the data grown by `margin`.
    pub bounds: Option<BoundingBox>,

    /// Distance added around the data whenever the clip rectangle is derived or enlarged
    pub margin: f64,

    /// Treatment of coincident input sites
    pub duplicates: DuplicatePolicy,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            bounds: None,
            margin: DEFAULT_MARGIN,
            duplicates: DuplicatePolicy::Reject,
        }
    }
}

/// Builder for creating DiagramConfig with validation
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::*;
///
/// // Use defaults: rectangle derived from the sites
/// let config = DiagramConfigBuilder::new().build().unwrap();
/// assert!(config.bounds.is_none());
///
/// // Customize
/// let config = DiagramConfigBuilder::new()
///     .bounds(DVec2::new(-5.0, -5.0), DVec2::new(15.0, 5.0))
///     .unwrap()
///     .margin(2.5)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.margin, 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct DiagramConfigBuilder {
    bounds: Option<BoundingBox>,
    margin: f64,
    duplicates: DuplicatePolicy,
}

impl DiagramConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - bounds: derived from the sites
    /// - margin: 10.0
    /// - duplicates: Reject
    pub fn new() -> Self {
        let defaults = DiagramConfig::default();
        Self {
            bounds: defaults.bounds,
            margin: defaults.margin,
            duplicates: defaults.duplicates,
        }
    }

    /// Set the clip rectangle from its bottom-left and top-right corners
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a coordinate is not finite or the rectangle
    /// is empty on either axis
    pub fn bounds(mut self, min: DVec2, max: DVec2) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(VoronoiError::InvalidConfig(format!(
                "Bounds must be finite (got {} to {})",
                min, max
            )));
        }
        if min.x >= max.x || min.y >= max.y {
            return Err(VoronoiError::InvalidConfig(format!(
                "Bounds minimum must be below maximum on both axes (got {} to {})",
                min, max
            )));
        }
        self.bounds = Some(BoundingBox::new(min, max));
        Ok(self)
    }

    /// Set the margin used when the clip rectangle is derived or enlarged
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the margin is not a positive finite number
    pub fn margin(mut self, margin: f64) -> Result<Self> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "Margin must be positive (got {})",
                margin
            )));
        }
        self.margin = margin;
        Ok(self)
    }

    /// Set how coincident input sites are handled
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DiagramConfig> {
        Ok(DiagramConfig {
            bounds: self.bounds,
            margin: self.margin,
            duplicates: self.duplicates,
        })
    }
}

impl Default for DiagramConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
