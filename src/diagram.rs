//! The finished Voronoi diagram
//!
//! A closed planar half-edge graph: every site owns one face whose boundary
//! is a clockwise cycle of half-edges, and the area outside the clip
//! rectangle is one extra face whose cycle runs counter-clockwise around it.
//! Elements are stored in flat arenas and addressed by typed indices.

use std::collections::HashSet;
use std::fmt;

use glam::DVec2;

use crate::bounds::BoundingBox;
use crate::cell::VoronoiCell;
use crate::config::DiagramConfig;
use crate::error::{Result, VoronoiError};
use crate::fortune::{self, SweepStats};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

macro_rules! idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(
    /// Index into [`VoronoiDiagram::vertices`]
    VertexId
);
idx!(
    /// Index into [`VoronoiDiagram::half_edges`]
    HalfEdgeId
);
idx!(
    /// Index into [`VoronoiDiagram::faces`]
    FaceId
);

/// A directed half-edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Vertex this half-edge leaves from
    pub origin: VertexId,
    /// The same edge in the opposite direction
    pub twin: HalfEdgeId,
    /// Next half-edge around `face`
    pub next: HalfEdgeId,
    /// Previous half-edge around `face`
    pub prev: HalfEdgeId,
    /// Face on the right of this half-edge
    pub face: FaceId,
}

/// A face of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Input index of the site owning this face; `None` for the outer face
    pub site: Option<usize>,
    /// Any half-edge on the face boundary
    pub edge: HalfEdgeId,
}

/// A straight piece of the diagram, for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    #[inline]
    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) * 0.5
    }
}

/// A Voronoi diagram clipped to a rectangle
///
/// Built in one pass from a set of sites; the diagram is immutable
/// afterwards. Building again from the same sites and configuration gives
/// an identical diagram.
///
/// # Examples
///
/// ```
/// use fortune_voronoi::*;
///
/// let sites = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(5.0, 10.0)];
/// let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();
///
/// assert_eq!(diagram.face_count(), 4);
/// assert_eq!(diagram.interior_vertices().len(), 1);
/// assert_eq!(diagram.segments().len(), 3);
/// ```
#[derive(Clone)]
pub struct VoronoiDiagram {
    /// Sites as supplied by the caller
    sites: Vec<DVec2>,

    /// Face of every input site
    site_faces: Vec<FaceId>,

    bounds: BoundingBox,
    vertices: Vec<DVec2>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    outer: FaceId,
    stats: SweepStats,

    /// Nearest-site lookup over the distinct sites (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl fmt::Debug for VoronoiDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoronoiDiagram")
            .field("sites", &self.sites.len())
            .field("bounds", &self.bounds)
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edge_count())
            .field("faces", &self.faces.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl VoronoiDiagram {
    /// Build the diagram of `sites`
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if `sites` is empty
    /// - `InvalidSite` if a coordinate is not finite
    /// - `DuplicateSite` if two sites coincide under [`crate::DuplicatePolicy::Reject`]
    /// - `RayMissedBounds`, `UnmatchedBoundaryChain`, `UnterminatedEdge` or
    ///   `BrokenFaceCycle` if the diagram could not be closed
    ///
    /// # Example
    ///
    /// ```
    /// use fortune_voronoi::*;
    ///
    /// let config = DiagramConfigBuilder::new()
    ///     .bounds(DVec2::new(-5.0, -5.0), DVec2::new(15.0, 5.0))
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    /// let diagram = VoronoiDiagram::build(&[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)], &config).unwrap();
    ///
    /// let bisector = diagram.segments();
    /// assert_eq!(bisector.len(), 1);
    /// assert_eq!(bisector[0].start.x, 5.0);
    /// ```
    pub fn build(sites: &[DVec2], config: &DiagramConfig) -> Result<Self> {
        let construction = fortune::construct(sites, config)?;
        Self::assemble(sites, construction)
    }

    /// Drop spliced-out half-edges, renumber, and check every face is one closed cycle
    fn assemble(input: &[DVec2], construction: fortune::Construction) -> Result<Self> {
        let fortune::Construction {
            sites: distinct,
            site_faces,
            clipped,
            stats,
        } = construction;
        let dcel = clipped.dcel;
        let records = dcel.half_edges();

        // Input index of the first occurrence of each distinct site
        let mut face_sites = vec![None; distinct.len()];
        for (i, &face) in site_faces.iter().enumerate() {
            face_sites[face].get_or_insert(i);
        }

        let mut edge_ids = vec![None; records.len()];
        let mut vertex_used = vec![false; dcel.vertices().len()];
        let mut live = 0;
        for (i, record) in records.iter().enumerate() {
            if record.removed {
                continue;
            }
            let origin = record
                .origin
                .ok_or(VoronoiError::UnterminatedEdge { half_edge: i })?;
            vertex_used[origin.0] = true;
            edge_ids[i] = Some(HalfEdgeId(live));
            live += 1;
        }

        let mut vertex_ids = vec![None; vertex_used.len()];
        let mut vertices = Vec::new();
        for (i, used) in vertex_used.into_iter().enumerate() {
            if used {
                vertex_ids[i] = Some(VertexId(vertices.len()));
                vertices.push(dcel.vertex(VertexId(i)));
            }
        }

        let mut half_edges = Vec::with_capacity(live);
        for (i, record) in records.iter().enumerate() {
            if record.removed {
                continue;
            }
            let broken = || VoronoiError::BrokenFaceCycle { face: record.face.0 };
            let origin = record
                .origin
                .and_then(|v| vertex_ids[v.0])
                .ok_or(VoronoiError::UnterminatedEdge { half_edge: i })?;
            let twin = edge_ids[record.twin.0].ok_or_else(broken)?;
            let next = record.next.and_then(|h| edge_ids[h.0]).ok_or_else(broken)?;
            let prev = record.prev.and_then(|h| edge_ids[h.0]).ok_or_else(broken)?;
            half_edges.push(HalfEdge {
                origin,
                twin,
                next,
                prev,
                face: record.face,
            });
        }

        let faces = dcel
            .faces()
            .iter()
            .enumerate()
            .map(|(i, face)| {
                let edge = face
                    .edge
                    .and_then(|h| edge_ids[h.0])
                    .ok_or(VoronoiError::BrokenFaceCycle { face: i })?;
                Ok(Face {
                    site: face.site.and_then(|s| face_sites[s]),
                    edge,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&distinct);

        let diagram = Self {
            sites: input.to_vec(),
            site_faces: site_faces.into_iter().map(FaceId).collect(),
            bounds: clipped.bounds,
            vertices,
            half_edges,
            faces,
            outer: clipped.outer,
            stats,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        };
        diagram.validate_cycles()?;
        Ok(diagram)
    }

    /// Every half-edge belongs to exactly one closed `next` cycle, that of its face
    fn validate_cycles(&self) -> Result<()> {
        let mut seen = vec![false; self.half_edges.len()];
        for (i, face) in self.faces.iter().enumerate() {
            let broken = VoronoiError::BrokenFaceCycle { face: i };
            let mut h = face.edge;
            loop {
                let edge = &self.half_edges[h.0];
                let next = &self.half_edges[edge.next.0];
                if edge.face.0 != i
                    || seen[h.0]
                    || next.prev != h
                    || next.origin != self.half_edges[edge.twin.0].origin
                {
                    return Err(broken);
                }
                seen[h.0] = true;
                h = edge.next;
                if h == face.edge {
                    break;
                }
            }
        }
        match seen.iter().position(|&s| !s) {
            Some(h) => Err(VoronoiError::BrokenFaceCycle {
                face: self.half_edges[h].face.0,
            }),
            None => Ok(()),
        }
    }

    /// Sites as supplied to [`VoronoiDiagram::build`]
    #[inline]
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    /// Number of input sites, duplicates included
    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Face owned by an input site
    ///
    /// Merged duplicates share the face of their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `site` is out of range
    pub fn face_of_site(&self, site: usize) -> Result<FaceId> {
        self.site_faces
            .get(site)
            .copied()
            .ok_or(VoronoiError::SiteNotFound(site))
    }

    /// The rectangle the diagram was clipped to
    ///
    /// This is the requested rectangle, or a larger one when the requested
    /// rectangle did not strictly contain every site and vertex.
    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Event counters from the sweep
    #[inline]
    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<DVec2> {
        self.vertices.get(id.0).copied()
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.half_edges.get(id.0)
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0)
    }

    /// The face outside the clip rectangle
    #[inline]
    pub fn outer_face(&self) -> FaceId {
        self.outer
    }

    /// Vertex a half-edge points to
    pub fn destination(&self, id: HalfEdgeId) -> Option<VertexId> {
        self.half_edges
            .get(id.0)
            .map(|e| self.half_edges[e.twin.0].origin)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges (twin pairs)
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    /// Number of faces: one per distinct site plus the outer face
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Half-edges around a face, following `next`
    ///
    /// Site faces are walked clockwise. An unknown face yields nothing.
    ///
    /// # Example
    ///
    /// ```
    /// # use fortune_voronoi::*;
    /// let diagram = VoronoiDiagram::build(&[DVec2::ZERO], &DiagramConfig::default()).unwrap();
    /// let face = diagram.face_of_site(0).unwrap();
    /// assert_eq!(diagram.face_half_edges(face).count(), 4);
    /// ```
    pub fn face_half_edges(&self, face: FaceId) -> FaceHalfEdges<'_> {
        let start = self.faces.get(face.0).map(|f| f.edge);
        FaceHalfEdges {
            half_edges: &self.half_edges,
            start: start.unwrap_or(HalfEdgeId(0)),
            current: start,
        }
    }

    /// Corner positions of a face, in walking order
    pub fn face_vertices(&self, face: FaceId) -> Vec<DVec2> {
        self.face_half_edges(face)
            .map(|h| self.vertices[self.half_edges[h.0].origin.0])
            .collect()
    }

    /// Clockwise boundary polygon of a site's cell
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `site` is out of range
    pub fn cell_polygon(&self, site: usize) -> Result<Vec<DVec2>> {
        Ok(self.face_vertices(self.face_of_site(site)?))
    }

    /// Sites whose cells share an edge with `site`'s cell, ascending
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `site` is out of range
    pub fn neighbors(&self, site: usize) -> Result<Vec<usize>> {
        let face = self.face_of_site(site)?;
        let mut neighbors: Vec<usize> = self
            .face_half_edges(face)
            .filter_map(|h| {
                let twin = self.half_edges[h.0].twin;
                self.faces[self.half_edges[twin.0].face.0].site
            })
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Ok(neighbors)
    }

    /// Polygon view of one site's cell
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `site` is out of range
    ///
    /// # Example
    ///
    /// ```
    /// # use fortune_voronoi::*;
    /// let sites = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
    /// let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();
    /// let cell = diagram.cell(0).unwrap();
    /// assert_eq!(cell.neighbors, vec![1]);
    /// assert!(cell.is_boundary);
    /// assert!(cell.contains(DVec2::new(1.0, 1.0)));
    /// ```
    pub fn cell(&self, site: usize) -> Result<VoronoiCell> {
        let face = self.face_of_site(site)?;
        let is_boundary = self.face_half_edges(face).any(|h| {
            let twin = self.half_edges[h.0].twin;
            self.half_edges[twin.0].face == self.outer
        });
        Ok(VoronoiCell::new(
            site,
            self.sites[site],
            self.neighbors(site)?,
            self.face_vertices(face),
            is_boundary,
        ))
    }

    /// Polygon views of every input site's cell
    pub fn cells(&self) -> Vec<VoronoiCell> {
        (0..self.sites.len())
            .filter_map(|site| self.cell(site).ok())
            .collect()
    }

    /// Sites reachable from `site` in at most `hops` neighbour steps, ascending
    ///
    /// `hops = 0` gives just the site itself. An unknown site gives nothing.
    pub fn cells_within_hops(&self, site: usize, hops: usize) -> Vec<usize> {
        let Ok(face) = self.face_of_site(site) else {
            return vec![];
        };
        let start = self.faces[face.0].site.unwrap_or(site);

        let mut visited = HashSet::new();
        let mut current = vec![start];
        visited.insert(start);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell in &current {
                for neighbor in self.neighbors(cell).unwrap_or_default() {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut cells: Vec<usize> = visited.into_iter().collect();
        cells.sort_unstable();
        cells
    }

    fn segment(&self, h: HalfEdgeId) -> Segment {
        let edge = &self.half_edges[h.0];
        Segment::new(
            self.vertices[edge.origin.0],
            self.vertices[self.half_edges[edge.twin.0].origin.0],
        )
    }

    /// Every edge separating two sites, once each
    pub fn segments(&self) -> Vec<Segment> {
        (0..self.half_edges.len())
            .map(HalfEdgeId)
            .filter(|&h| {
                let edge = &self.half_edges[h.0];
                h < edge.twin
                    && edge.face != self.outer
                    && self.half_edges[edge.twin.0].face != self.outer
            })
            .map(|h| self.segment(h))
            .collect()
    }

    /// Pieces of the clip rectangle between consecutive boundary vertices
    pub fn boundary_segments(&self) -> Vec<Segment> {
        (0..self.half_edges.len())
            .map(HalfEdgeId)
            .filter(|&h| {
                let twin = self.half_edges[h.0].twin;
                self.half_edges[h.0].face != self.outer && self.half_edges[twin.0].face == self.outer
            })
            .map(|h| self.segment(h))
            .collect()
    }

    /// Closed boundary of one site's cell, clockwise
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `site` is out of range
    pub fn cell_segments(&self, site: usize) -> Result<Vec<Segment>> {
        let face = self.face_of_site(site)?;
        Ok(self.face_half_edges(face).map(|h| self.segment(h)).collect())
    }

    /// Edges between sites clipped to a display rectangle
    ///
    /// Edges entirely outside `view` are dropped.
    pub fn segments_within(&self, view: &BoundingBox) -> Vec<Segment> {
        self.segments()
            .into_iter()
            .filter_map(|s| view.clip_segment(s.start, s.end))
            .map(|(start, end)| Segment::new(start, end))
            .collect()
    }

    /// Voronoi vertices not lying on the clip rectangle
    pub fn interior_vertices(&self) -> Vec<DVec2> {
        self.vertices
            .iter()
            .copied()
            .filter(|&v| !self.bounds.on_boundary(v))
            .collect()
    }

    /// Find the site whose cell contains a point (requires spatial-index feature)
    ///
    /// Returns the input index of the nearest site; for merged duplicates this
    /// is the first occurrence.
    ///
    /// # Example
    ///
    /// ```
    /// # use fortune_voronoi::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// let sites = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
    /// let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();
    /// assert_eq!(diagram.find_cell_at(DVec2::new(7.0, 3.0)), 1);
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, point: DVec2) -> usize {
        let face = self.spatial_index.find_nearest(point);
        self.faces[face].site.unwrap_or(face)
    }
}

/// Iterator over the half-edges of one face, see [`VoronoiDiagram::face_half_edges`]
#[derive(Debug, Clone)]
pub struct FaceHalfEdges<'a> {
    half_edges: &'a [HalfEdge],
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl Iterator for FaceHalfEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let h = self.current?;
        let next = self.half_edges[h.0].next;
        self.current = (next != self.start).then_some(next);
        Some(h)
    }
}
