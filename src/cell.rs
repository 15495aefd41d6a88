//! Voronoi Cell Structure
//!
//! A per-site polygon view of a finished diagram, convenient for rendering,
//! relaxation and neighbourhood queries.

use glam::DVec2;

/// The clipped Voronoi region of one site
///
/// Each cell carries:
/// - The index of its site (0 to site_count-1)
/// - The site position
/// - Neighbour connectivity (sites sharing an edge)
/// - The clipped boundary polygon
///
/// Cells are snapshots: they are built from a [`crate::VoronoiDiagram`] on
/// demand and do not borrow from it.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index of the site owning this cell
    pub id: usize,

    /// The site itself
    pub site: DVec2,

    /// Indices of sites whose cells share an edge with this one, ascending
    pub neighbors: Vec<usize>,

    /// Boundary polygon, clockwise, clipped to the diagram's rectangle
    pub vertices: Vec<DVec2>,

    /// Whether part of the boundary lies on the clip rectangle
    pub is_boundary: bool,
}

impl VoronoiCell {
    /// Create a new Voronoi cell
    ///
    /// This is typically called by [`crate::VoronoiDiagram::cell`], not by user code.
    pub fn new(
        id: usize,
        site: DVec2,
        neighbors: Vec<usize>,
        vertices: Vec<DVec2>,
        is_boundary: bool,
    ) -> Self {
        Self {
            id,
            site,
            neighbors,
            vertices,
            is_boundary,
        }
    }

    /// Get the number of neighboring cells
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this cell is a neighbor of another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_cell_id: usize) -> bool {
        self.neighbors.binary_search(&other_cell_id).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Signed shoelace sum; negative for clockwise polygons
    fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.vertices[i].perp_dot(self.vertices[(i + 1) % n]))
            .sum::<f64>()
            * 0.5
    }

    /// Area enclosed by the cell polygon
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Centroid of the cell polygon
    ///
    /// Falls back to the vertex average for degenerate polygons and to the
    /// site for cells without vertices.
    pub fn centroid(&self) -> DVec2 {
        let n = self.vertices.len();
        if n == 0 {
            return self.site;
        }
        let signed = self.signed_area();
        if signed.abs() <= f64::EPSILON {
            return self.vertices.iter().copied().sum::<DVec2>() / n as f64;
        }

        let mut acc = DVec2::ZERO;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            acc += (a + b) * a.perp_dot(b);
        }
        acc / (6.0 * signed)
    }

    /// Length of the cell boundary
    pub fn perimeter(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.vertices[i].distance(self.vertices[(i + 1) % n]))
            .sum()
    }

    /// Whether the point lies inside or on the (convex, clockwise) cell polygon
    pub fn contains(&self, point: DVec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let scale = self.perimeter().max(1.0);
        (0..n).all(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            (b - a).perp_dot(point - a) <= 1e-9 * scale * scale
        })
    }

    /// Euclidean distance between the sites of two cells
    pub fn distance_to(&self, other: &VoronoiCell) -> f64 {
        self.site.distance(other.site)
    }
}
