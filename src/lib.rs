//! Planar Voronoi diagrams with Fortune's sweepline algorithm
//!
//! Builds the Voronoi diagram of a set of 2D sites in O(n log n) and returns
//! it as a closed half-edge graph (DCEL) clipped to an axis-aligned
//! rectangle, with per-site cell polygons and segment views for drawing.
//!
//! # Quick Start
//!
//! ```rust
//! use fortune_voronoi::*;
//!
//! let bounds = BoundingBox::new(DVec2::ZERO, DVec2::new(200.0, 100.0));
//! let sites = generate_jittered_sites(64, &bounds, 42);
//!
//! let config = DiagramConfigBuilder::new()
//!     .bounds(bounds.min, bounds.max).unwrap()
//!     .build().unwrap();
//!
//! // Even out the cells, then build the final diagram
//! let sites = lloyd_relaxation(&sites, &config, LloydOptions::default()).unwrap();
//! let diagram = VoronoiDiagram::build(&sites, &config).unwrap();
//!
//! assert_eq!(diagram.face_count(), sites.len() + 1);
//! for segment in diagram.segments() {
//!     // draw segment.start -> segment.end
//! #   let _ = segment.length();
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) point-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and bounds
//!
//! # Logging
//!
//! Progress and timings are reported through the `log` facade; install any
//! logger to see them.

// Modules
pub mod error;
pub mod config;
pub mod bounds;
pub mod fortune;
pub mod diagram;
pub mod cell;
pub mod generation;

#[cfg(feature = "spatial-index")]
pub mod spatial;

mod util;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{DiagramConfig, DiagramConfigBuilder, DuplicatePolicy, DEFAULT_MARGIN};
pub use bounds::BoundingBox;
pub use diagram::{Face, FaceHalfEdges, FaceId, HalfEdge, HalfEdgeId, Segment, VertexId, VoronoiDiagram};
pub use cell::VoronoiCell;
pub use fortune::SweepStats;
pub use generation::{generate_jittered_sites, generate_random_sites, lloyd_relaxation, LloydOptions};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
