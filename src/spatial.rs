//! Spatial indexing for fast point-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;
#[cfg(feature = "spatial-index")]
use glam::DVec2;

/// Wrapper around a KD-tree over the diagram's sites
///
/// The nearest site to a point owns the Voronoi cell containing it, so a
/// nearest-neighbour query answers point location in O(log n) without
/// walking any polygons.
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build the index from site positions
    ///
    /// Item `i` of the tree is `sites[i]`.
    ///
    /// # Example
    ///
    /// ```
    /// use fortune_voronoi::*;
    ///
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// let sites = vec![
    ///     DVec2::new(0.0, 0.0),
    ///     DVec2::new(10.0, 0.0),
    ///     DVec2::new(5.0, 10.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(6.0, 7.0)), 2);
    /// # }
    /// ```
    pub fn new(sites: &[DVec2]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|s| s.to_array()).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Index of the site nearest to `point`
    pub fn find_nearest(&self, point: DVec2) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&point.to_array());
        result.item
    }
}
