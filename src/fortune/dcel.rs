//! Half-edge builder used while the sweep runs
//!
//! During the sweep edges are born with both endpoints open and acquire
//! endpoints as circle events fire. The builder keeps those partial records;
//! [`crate::diagram::VoronoiDiagram`] is assembled from it once clipping has
//! closed every boundary.
//!
//! Face `i` belongs to site `i`. Every face lies to the right of its
//! half-edges, so bounded faces are walked clockwise. `next` and `prev` are
//! not maintained incrementally: once every endpoint is known, coincident
//! vertices are merged and the links are derived from the angular order of
//! the half-edges around each vertex.

use glam::DVec2;

use super::kernel;
use crate::diagram::{FaceId, HalfEdgeId, VertexId};
use crate::util::{find_root, union};

/// A half-edge whose endpoints may still be unknown
#[derive(Debug, Clone)]
pub struct HalfEdgeRecord {
    pub origin: Option<VertexId>,
    pub twin: HalfEdgeId,
    pub next: Option<HalfEdgeId>,
    pub prev: Option<HalfEdgeId>,
    pub face: FaceId,
    /// A point on the edge's supporting line, used when both ends are open
    pub anchor: DVec2,
    /// Set when the edge collapsed to zero length
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub struct FaceRecord {
    pub site: Option<usize>,
    pub edge: Option<HalfEdgeId>,
}

#[derive(Debug, Clone, Default)]
pub struct DcelBuilder {
    vertices: Vec<DVec2>,
    half_edges: Vec<HalfEdgeRecord>,
    faces: Vec<FaceRecord>,
}

impl DcelBuilder {
    /// Builder with one empty face per site
    pub fn with_sites(site_count: usize) -> Self {
        Self {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: (0..site_count)
                .map(|i| FaceRecord {
                    site: Some(i),
                    edge: None,
                })
                .collect(),
        }
    }

    /// Add the unbounded face surrounding the clip rectangle
    pub fn add_outer_face(&mut self) -> FaceId {
        self.faces.push(FaceRecord {
            site: None,
            edge: None,
        });
        FaceId(self.faces.len() - 1)
    }

    pub fn add_vertex(&mut self, position: DVec2) -> VertexId {
        self.vertices.push(position);
        VertexId(self.vertices.len() - 1)
    }

    /// Create a twin pair with both endpoints open
    ///
    /// Returns the half-edge bordering `face`; its twin borders `twin_face`.
    /// `anchor` is any point on the edge's supporting line.
    pub fn create_edge(&mut self, face: FaceId, twin_face: FaceId, anchor: DVec2) -> HalfEdgeId {
        let h = HalfEdgeId(self.half_edges.len());
        let t = HalfEdgeId(h.0 + 1);
        for (id, twin, f) in [(h, t, face), (t, h, twin_face)] {
            self.half_edges.push(HalfEdgeRecord {
                origin: None,
                twin,
                next: None,
                prev: None,
                face: f,
                anchor,
                removed: false,
            });
            if self.faces[f.0].edge.is_none() {
                self.faces[f.0].edge = Some(id);
            }
        }
        h
    }

    /// Create a twin pair leaving `origin`, bordering `face`, with an open destination
    pub fn create_edge_from(&mut self, origin: VertexId, face: FaceId, twin_face: FaceId) -> HalfEdgeId {
        let anchor = self.vertices[origin.0];
        let h = self.create_edge(face, twin_face, anchor);
        self.set_origin(h, origin);
        h
    }

    pub fn set_origin(&mut self, h: HalfEdgeId, v: VertexId) {
        debug_assert!(self.half_edges[h.0].origin.is_none(), "origin of {} already set", h);
        self.half_edges[h.0].origin = Some(v);
    }

    /// Fix the destination of `h`, which is the origin of its twin
    pub fn set_destination(&mut self, h: HalfEdgeId, v: VertexId) {
        let t = self.twin(h);
        self.set_origin(t, v);
    }

    #[inline]
    pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h.0].twin
    }

    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> Option<VertexId> {
        self.half_edges[h.0].origin
    }

    #[inline]
    pub fn destination(&self, h: HalfEdgeId) -> Option<VertexId> {
        self.origin(self.twin(h))
    }

    #[cfg(test)]
    pub fn next(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edges[h.0].next
    }

    #[cfg(test)]
    pub fn prev(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edges[h.0].prev
    }

    #[inline]
    pub fn face(&self, h: HalfEdgeId) -> FaceId {
        self.half_edges[h.0].face
    }

    #[inline]
    pub fn anchor(&self, h: HalfEdgeId) -> DVec2 {
        self.half_edges[h.0].anchor
    }

    #[inline]
    pub fn vertex(&self, v: VertexId) -> DVec2 {
        self.vertices[v.0]
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn half_edges(&self) -> &[HalfEdgeRecord] {
        &self.half_edges
    }

    pub fn faces(&self) -> &[FaceRecord] {
        &self.faces
    }

    /// Live half-edges with at least one open endpoint
    pub fn unbounded_half_edges(&self) -> Vec<HalfEdgeId> {
        (0..self.half_edges.len())
            .map(HalfEdgeId)
            .filter(|&h| {
                !self.half_edges[h.0].removed
                    && (self.origin(h).is_none() || self.destination(h).is_none())
            })
            .collect()
    }

    /// Merge the endpoints of every edge shorter than the distance tolerance
    ///
    /// Events that fire at the same point (cocircular sites, a site landing
    /// on a breakpoint) each create their own vertex, joined to the others by
    /// zero-length edges. Those vertices are unified, keeping the position of
    /// the one created first, and every edge whose endpoints end up identical
    /// is removed. Returns the number of vertices merged away.
    pub fn merge_coincident_vertices(&mut self) -> usize {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        let mut merged = 0;

        for i in 0..self.half_edges.len() {
            let h = HalfEdgeId(i);
            if self.half_edges[i].removed || self.twin(h).0 < i {
                continue;
            }
            let (Some(a), Some(b)) = (self.origin(h), self.destination(h)) else {
                continue;
            };
            if !kernel::points_coincide(self.vertices[a.0], self.vertices[b.0]) {
                continue;
            }
            if union(&mut parent, a.0, b.0) {
                merged += 1;
            }
        }
        if merged == 0 {
            return 0;
        }

        for i in 0..self.half_edges.len() {
            if let Some(v) = self.half_edges[i].origin {
                self.half_edges[i].origin = Some(VertexId(find_root(&mut parent, v.0)));
            }
        }
        for i in 0..self.half_edges.len() {
            let h = HalfEdgeId(i);
            let record = &self.half_edges[i];
            if !record.removed && record.origin.is_some() && record.origin == self.destination(h) {
                log::trace!("removing zero-length edge {} at {:?}", h, self.vertex_of(h));
                self.half_edges[i].removed = true;
                let t = self.twin(h);
                self.half_edges[t.0].removed = true;
            }
        }
        log::debug!("merged {} coincident vertices", merged);
        merged
    }

    /// Derive `next`, `prev` and each face's entry edge from the geometry
    ///
    /// With faces on the right of their half-edges, the half-edge following
    /// `h` is the first one leaving `h`'s destination counter-clockwise after
    /// `h`'s twin. Every live half-edge must have both endpoints.
    pub fn link_around_vertices(&mut self) {
        let mut fans: Vec<Vec<(f64, HalfEdgeId)>> = vec![Vec::new(); self.vertices.len()];
        for i in 0..self.half_edges.len() {
            let h = HalfEdgeId(i);
            self.half_edges[i].next = None;
            self.half_edges[i].prev = None;
            if self.half_edges[i].removed {
                continue;
            }
            if let (Some(from), Some(to)) = (self.origin(h), self.destination(h)) {
                let d = self.vertices[to.0] - self.vertices[from.0];
                fans[from.0].push((d.y.atan2(d.x), h));
            }
        }

        for fan in &mut fans {
            fan.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1 .0.cmp(&b.1 .0)));
            for k in 0..fan.len() {
                let arriving = self.twin(fan[k].1);
                let leaving = fan[(k + 1) % fan.len()].1;
                self.half_edges[arriving.0].next = Some(leaving);
                self.half_edges[leaving.0].prev = Some(arriving);
            }
        }

        for face in &mut self.faces {
            face.edge = None;
        }
        for (i, record) in self.half_edges.iter().enumerate() {
            if !record.removed {
                self.faces[record.face.0].edge.get_or_insert(HalfEdgeId(i));
            }
        }
    }

    fn vertex_of(&self, h: HalfEdgeId) -> Option<DVec2> {
        self.origin(h).map(|v| self.vertices[v.0])
    }

    /// Number of live twin pairs
    pub fn edge_count(&self) -> usize {
        self.half_edges.iter().filter(|e| !e.removed).count() / 2
    }
}
