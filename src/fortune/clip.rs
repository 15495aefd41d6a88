//! Closing the diagram against a bounding rectangle
//!
//! When the sweep ends, edges still traced by a breakpoint (and the upward
//! bisectors of a shared top row) have open ends. Each open end is extended
//! along its bisector until it meets the clip rectangle; edges open at both
//! ends are clipped as full lines. The boundary points are then sorted
//! clockwise around the rectangle together with its corners and joined by
//! boundary segments. Finally coincident vertices are merged and the face
//! cycles are linked, so every site face becomes a closed cycle and the
//! rectangle's outside becomes one extra face.

use glam::DVec2;

use super::dcel::DcelBuilder;
use super::kernel;
use super::sweep::{OpenEnd, SweepOutput};
use crate::bounds::BoundingBox;
use crate::diagram::{FaceId, HalfEdgeId, VertexId};
use crate::error::{Result, VoronoiError};

/// The closed diagram and the rectangle it was clipped to
#[derive(Debug)]
pub struct ClipOutput {
    pub dcel: DcelBuilder,
    pub bounds: BoundingBox,
    pub outer: FaceId,
    /// Vertices merged into a coincident one
    pub merged_vertices: usize,
}

#[derive(Debug, Clone, Copy)]
enum PerimeterPoint {
    Corner(VertexId),
    /// An edge reaching the boundary; `incoming` ends here and its twin starts here
    Hit { vertex: VertexId, incoming: HalfEdgeId },
}

impl PerimeterPoint {
    fn vertex(self) -> VertexId {
        match self {
            PerimeterPoint::Corner(v) => v,
            PerimeterPoint::Hit { vertex, .. } => vertex,
        }
    }
}

/// Close every open edge and stitch the rectangle boundary into the faces
pub fn clip_to_box(
    sweep: SweepOutput,
    sites: &[DVec2],
    requested: Option<BoundingBox>,
    margin: f64,
) -> Result<ClipOutput> {
    let SweepOutput {
        mut dcel,
        beachline,
        top_row_ends,
        lowest_event_y,
        ..
    } = sweep;

    let bounds = clip_rectangle(&dcel, sites, lowest_event_y, requested, margin);

    let mut ends: Vec<OpenEnd> = beachline
        .breakpoints()
        .into_iter()
        .map(|(left, right, edge)| OpenEnd {
            edge,
            direction: kernel::breakpoint_direction(sites[left], sites[right]),
        })
        .collect();
    ends.extend(top_row_ends);
    log::debug!("extending {} open edge ends to {:?}", ends.len(), bounds);

    let mut points = Vec::with_capacity(ends.len() + 4);
    for end in ends {
        extend_open_end(&mut dcel, &bounds, end, &mut points)?;
    }

    if let Some(h) = dcel.unbounded_half_edges().first() {
        return Err(VoronoiError::UnterminatedEdge { half_edge: h.0 });
    }

    let tol = bounds.tolerance();
    for corner in bounds.corners() {
        let taken = points
            .iter()
            .any(|p: &PerimeterPoint| dcel.vertex(p.vertex()).distance(corner) <= tol);
        if !taken {
            let v = dcel.add_vertex(corner);
            points.push(PerimeterPoint::Corner(v));
        }
    }

    points.sort_by(|a, b| {
        let ka = bounds.perimeter_key(dcel.vertex(a.vertex()));
        let kb = bounds.perimeter_key(dcel.vertex(b.vertex()));
        ka.total_cmp(&kb)
    });

    let outer = dcel.add_outer_face();
    stitch_boundary(&mut dcel, &points, outer)?;

    let merged_vertices = dcel.merge_coincident_vertices();
    dcel.link_around_vertices();

    Ok(ClipOutput {
        dcel,
        bounds,
        outer,
        merged_vertices,
    })
}

/// The requested rectangle, or a larger one if it does not strictly contain
/// every vertex, every site and the lowest point the sweep reached
fn clip_rectangle(
    dcel: &DcelBuilder,
    sites: &[DVec2],
    lowest_event_y: f64,
    requested: Option<BoundingBox>,
    margin: f64,
) -> BoundingBox {
    let points = sites.iter().chain(dcel.vertices()).copied();
    let Some(mut extent) = BoundingBox::from_points(points) else {
        return requested.unwrap_or_else(|| BoundingBox::new(DVec2::ZERO, DVec2::ONE));
    };
    if lowest_event_y.is_finite() && lowest_event_y < extent.min.y {
        extent.min.y = lowest_event_y;
    }

    match requested {
        Some(rect) => {
            let tol = rect.tolerance();
            if rect.contains_strictly(extent.min, tol) && rect.contains_strictly(extent.max, tol) {
                rect
            } else {
                let expanded = rect.union(&extent.grow(margin));
                log::debug!("clip rectangle {:?} expanded to {:?}", rect, expanded);
                expanded
            }
        }
        None => extent.grow(margin),
    }
}

/// Give an open end a boundary vertex and record where it meets the rectangle
fn extend_open_end(
    dcel: &mut DcelBuilder,
    bounds: &BoundingBox,
    end: OpenEnd,
    points: &mut Vec<PerimeterPoint>,
) -> Result<()> {
    let h = end.edge;
    if dcel.destination(h).is_some() {
        // Closed together with the other end of a two-sided line
        return Ok(());
    }
    let missed = VoronoiError::RayMissedBounds { half_edge: h.0 };

    match dcel.origin(h) {
        Some(start) => {
            let exit = bounds
                .ray_exit(dcel.vertex(start), end.direction)
                .ok_or(missed)?;
            let v = dcel.add_vertex(exit);
            dcel.set_destination(h, v);
            points.push(PerimeterPoint::Hit { vertex: v, incoming: h });
        }
        None => {
            let (entry, exit) = bounds
                .clip_line(dcel.anchor(h), end.direction)
                .ok_or(missed)?;
            let from = dcel.add_vertex(entry);
            let to = dcel.add_vertex(exit);
            dcel.set_origin(h, from);
            dcel.set_destination(h, to);
            points.push(PerimeterPoint::Hit { vertex: to, incoming: h });
            points.push(PerimeterPoint::Hit {
                vertex: from,
                incoming: dcel.twin(h),
            });
        }
    }
    Ok(())
}

/// Join clockwise-sorted boundary points with segments
///
/// Walking clockwise, the segment after a hit belongs to the face of the
/// half-edge arriving there, and the half-edge leaving the next hit must
/// border that same face. The outside twins border the outer face.
fn stitch_boundary(dcel: &mut DcelBuilder, points: &[PerimeterPoint], outer: FaceId) -> Result<()> {
    let n = points.len();
    let start = points
        .iter()
        .position(|p| matches!(p, PerimeterPoint::Hit { .. }));

    let mut face = match start.map(|i| points[i]) {
        Some(PerimeterPoint::Hit { incoming, .. }) => dcel.face(incoming),
        // No edges at all: a single site owns the whole rectangle
        _ => FaceId(0),
    };
    let start = start.unwrap_or(0);

    for step in 0..n {
        let from = points[(start + step) % n];
        let to = points[(start + step + 1) % n];
        if let PerimeterPoint::Hit { incoming, .. } = from {
            face = dcel.face(incoming);
        }
        if let PerimeterPoint::Hit { incoming, .. } = to {
            if dcel.face(dcel.twin(incoming)) != face {
                return Err(VoronoiError::UnmatchedBoundaryChain { face: face.0 });
            }
        }

        let a = dcel.vertex(from.vertex());
        let b = dcel.vertex(to.vertex());
        let seg = dcel.create_edge(face, outer, (a + b) * 0.5);
        dcel.set_origin(seg, from.vertex());
        dcel.set_destination(seg, to.vertex());
    }
    Ok(())
}
