//! Lloyd's Relaxation for uniform site distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of a site set by
//! moving each site to the centroid of its clipped Voronoi cell.

use glam::DVec2;

use crate::bounds::BoundingBox;
use crate::config::DiagramConfig;
use crate::diagram::VoronoiDiagram;
use crate::error::{Result, VoronoiError};
use crate::util::Timed;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            // Relative to the rectangle diagonal; for a 100x100 rectangle this
            // stops once no site moves more than ~0.14 units.
            convergence_threshold: 0.001,
        }
    }
}

/// Apply Lloyd's Relaxation to a set of sites
///
/// Each iteration builds a fresh diagram of the current sites and moves
/// every site to the centroid of its cell. The clip rectangle is fixed
/// before the first iteration: the configured bounds if present, otherwise
/// the sites' extent grown by the configured margin. Sites never leave it.
///
/// # Errors
///
/// Returns the first construction error, or `InvalidConfig` if
/// `convergence_threshold` is negative or not finite
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::*;
///
/// let bounds = BoundingBox::new(DVec2::ZERO, DVec2::new(100.0, 100.0));
/// let sites = generate_random_sites(50, &bounds, 42);
/// let config = DiagramConfigBuilder::new()
///     .bounds(bounds.min, bounds.max)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let relaxed = lloyd_relaxation(&sites, &config, LloydOptions::default()).unwrap();
/// assert_eq!(relaxed.len(), sites.len());
/// ```
pub fn lloyd_relaxation(
    sites: &[DVec2],
    config: &DiagramConfig,
    options: LloydOptions,
) -> Result<Vec<DVec2>> {
    if !options.convergence_threshold.is_finite() || options.convergence_threshold < 0.0 {
        return Err(VoronoiError::InvalidConfig(format!(
            "Lloyd convergence threshold must be non-negative (got {})",
            options.convergence_threshold
        )));
    }
    if sites.is_empty() {
        return Err(VoronoiError::EmptyInput);
    }

    let _timer = Timed::info("Lloyd relaxation");
    let bounds = match config.bounds {
        Some(bounds) => bounds,
        None => BoundingBox::from_points(sites.iter().copied())
            .ok_or(VoronoiError::EmptyInput)?
            .grow(config.margin),
    };
    let config = DiagramConfig {
        bounds: Some(bounds),
        ..*config
    };
    let convergence_threshold = options.convergence_threshold * bounds.diagonal();

    log::debug!(
        "Lloyd: {} sites, max {} iterations, threshold {:.4} (abs: {:.4})",
        sites.len(),
        options.max_iterations,
        options.convergence_threshold,
        convergence_threshold
    );

    let mut points = sites.to_vec();
    for iteration in 0..options.max_iterations {
        let _iter_timer = Timed::debug("Lloyd iteration");

        let diagram = VoronoiDiagram::build(&points, &config)?;
        let (new_points, max_displacement) = compute_new_points(&diagram, &bounds);
        points = new_points;

        log::debug!(
            "Lloyd iteration {}: max displacement {:.4}",
            iteration + 1,
            max_displacement
        );

        // Early exit if converged
        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            log::debug!(
                "Lloyd converged at iteration {} (max_disp {:.4} < threshold {:.4})",
                iteration + 1,
                max_displacement,
                convergence_threshold
            );
            break;
        }
    }

    Ok(points)
}

/// Cell centroids of every site and the largest distance any site moved
fn compute_new_points(diagram: &VoronoiDiagram, bounds: &BoundingBox) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;

    let new_points = diagram
        .cells()
        .into_iter()
        .map(|mut cell| {
            // The diagram may have grown past `bounds` to contain far vertices
            if diagram.bounds() != bounds {
                cell.vertices = bounds.clip_polygon(&cell.vertices);
            }
            let moved = cell.centroid();
            max_displacement = max_displacement.max(moved.distance(cell.site));
            moved
        })
        .collect();

    (new_points, max_displacement)
}
