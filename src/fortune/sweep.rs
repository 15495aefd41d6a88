//! Fortune's sweepline driver
//!
//! Pops events in sweep order and dispatches them: site events split the arc
//! above the new site, circle events remove a squeezed arc and emit a Voronoi
//! vertex. Circle events are (re)detected for every triple of consecutive
//! arcs whose middle arc changed.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::beachline::{Beachline, NodeId};
use super::dcel::DcelBuilder;
use super::events::{CircleId, Event, EventQueue};
use super::kernel;
use crate::diagram::{FaceId, HalfEdgeId};

/// Counters collected while sweeping
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Site events processed
    pub site_events: usize,
    /// Circle events scheduled
    pub circle_events_scheduled: usize,
    /// Circle events that fired and produced a vertex
    pub circle_events_processed: usize,
    /// Cancelled circle events skipped when popped
    pub stale_events_skipped: usize,
    /// Vertices merged into a coincident one when the diagram was closed
    pub merged_vertices: usize,
}

/// An edge end the sweep leaves open, with the direction it extends towards
#[derive(Debug, Clone, Copy)]
pub struct OpenEnd {
    /// Half-edge whose destination is open
    pub edge: HalfEdgeId,
    pub direction: DVec2,
}

/// Everything the clipper needs once the queue has drained
#[derive(Debug)]
pub struct SweepOutput {
    pub dcel: DcelBuilder,
    pub beachline: Beachline,
    /// Upward ends of bisectors between sites sharing the top-most coordinate
    pub top_row_ends: Vec<OpenEnd>,
    /// Lowest sweep coordinate any event reached
    pub lowest_event_y: f64,
    pub stats: SweepStats,
}

/// State of one sweep over a fixed set of distinct sites
pub struct Sweep<'a> {
    sites: &'a [DVec2],
    queue: EventQueue,
    beachline: Beachline,
    dcel: DcelBuilder,
    top_row_ends: Vec<OpenEnd>,
    sweep_y: f64,
    lowest_event_y: f64,
    stats: SweepStats,
}

impl<'a> Sweep<'a> {
    /// Prime the queue with every site; `sites` must not contain duplicates
    pub fn new(sites: &'a [DVec2]) -> Self {
        Self {
            sites,
            queue: EventQueue::with_sites(sites),
            beachline: Beachline::new(),
            dcel: DcelBuilder::with_sites(sites.len()),
            top_row_ends: Vec::new(),
            sweep_y: f64::INFINITY,
            lowest_event_y: f64::INFINITY,
            stats: SweepStats::default(),
        }
    }

    /// Process events until the queue is empty
    pub fn run(mut self) -> SweepOutput {
        while let Some(event) = self.queue.pop() {
            match event {
                Event::Site(site) => self.handle_site_event(site),
                Event::Circle(id) => self.handle_circle_event(id),
            }
        }
        self.stats.circle_events_scheduled = self.queue.circles_scheduled();
        log::debug!(
            "sweep finished: {} sites, {} circle events ({} stale), {} vertices",
            self.stats.site_events,
            self.stats.circle_events_processed,
            self.stats.stale_events_skipped,
            self.dcel.vertices().len()
        );
        SweepOutput {
            dcel: self.dcel,
            beachline: self.beachline,
            top_row_ends: self.top_row_ends,
            lowest_event_y: self.lowest_event_y,
            stats: self.stats,
        }
    }

    /// Move the sweep line down to `y`; it never moves back up
    fn advance_to(&mut self, y: f64) {
        self.sweep_y = self.sweep_y.min(y);
        self.lowest_event_y = self.lowest_event_y.min(y);
    }

    fn handle_site_event(&mut self, site: usize) {
        let position = self.sites[site];
        self.advance_to(position.y);
        self.stats.site_events += 1;

        if self.beachline.is_empty() {
            self.beachline.insert_root(site);
            return;
        }

        let target = self
            .beachline
            .find_arc_above(self.sites, position.x, self.sweep_y);
        let split = self.beachline.insert_split(
            target,
            site,
            self.sites,
            &mut self.dcel,
            &mut self.queue,
        );
        log::trace!(
            "site {} at {:?} splits arc of site {}",
            site,
            position,
            self.beachline.site(split.left)
        );

        if split.right.is_none() {
            // Bisector of two top-row sites: its upper end is traced by no breakpoint
            let twin = self.dcel.twin(split.edge);
            let left_site = self.beachline.site(split.left);
            self.top_row_ends.push(OpenEnd {
                edge: twin,
                direction: kernel::breakpoint_direction(self.sites[site], self.sites[left_site]),
            });
        }

        if let Some(pred) = self.beachline.predecessor_leaf(split.left) {
            self.detect_circle_event(pred, split.left, split.arc);
        }
        if let Some(right) = split.right {
            if let Some(succ) = self.beachline.successor_leaf(right) {
                self.detect_circle_event(split.arc, right, succ);
            }
        }
    }

    fn handle_circle_event(&mut self, id: CircleId) {
        let event = *self.queue.circle(id);
        if !event.active {
            self.stats.stale_events_skipped += 1;
            log::trace!("skipping cancelled circle event {:?}", id.index());
            return;
        }
        self.advance_to(event.sweep_y);
        self.stats.circle_events_processed += 1;

        let arc = event.arc;
        self.beachline.set_circle(arc, None);
        let pred = self
            .beachline
            .predecessor_leaf(arc)
            .expect("squeezed arc has a left neighbour");
        let succ = self
            .beachline
            .successor_leaf(arc)
            .expect("squeezed arc has a right neighbour");
        let left_bp = self
            .beachline
            .left_breakpoint(arc)
            .expect("squeezed arc has a left breakpoint");
        let right_bp = self
            .beachline
            .right_breakpoint(arc)
            .expect("squeezed arc has a right breakpoint");
        let e_ab = self.beachline.edge(left_bp);
        let e_bc = self.beachline.edge(right_bp);

        let a = self.beachline.site(pred);
        let b = self.beachline.site(arc);
        let c = self.beachline.site(succ);

        // Coincident events each get a vertex here; the clipper merges them
        let vertex = self.dcel.add_vertex(event.center);
        self.dcel.set_destination(e_ab, vertex);
        self.dcel.set_destination(e_bc, vertex);

        // New edge between the faces of the surviving neighbours, leaving the vertex
        let e_ac = self.dcel.create_edge_from(vertex, FaceId(a), FaceId(c));

        self.beachline.remove_arc(arc, e_ac);
        log::trace!(
            "circle event at {:?} (sweep {:.6}) removes an arc of site {}",
            event.center,
            event.sweep_y,
            b
        );

        for neighbour in [pred, succ] {
            if let Some(stale) = self.beachline.set_circle(neighbour, None) {
                self.queue.invalidate(stale);
            }
        }

        if let Some(pp) = self.beachline.predecessor_leaf(pred) {
            self.detect_circle_event(pp, pred, succ);
        }
        if let Some(ss) = self.beachline.successor_leaf(succ) {
            self.detect_circle_event(pred, succ, ss);
        }
    }

    /// Schedule the circle event of `mid` if its neighbours' breakpoints converge
    fn detect_circle_event(&mut self, left: NodeId, mid: NodeId, right: NodeId) {
        let (sa, sb, sc) = (
            self.beachline.site(left),
            self.beachline.site(mid),
            self.beachline.site(right),
        );
        if sa == sc {
            return;
        }
        let (a, b, c) = (self.sites[sa], self.sites[sb], self.sites[sc]);
        let Some(center) = kernel::circumcenter(a, b, c) else {
            log::trace!("sites {}, {}, {} are collinear; no circle event", sa, sb, sc);
            return;
        };
        if !kernel::converges(center, a, b, c, self.sweep_y) {
            return;
        }

        let sweep_y = center.y - center.distance(b);
        if let Some(stale) = self.beachline.set_circle(mid, None) {
            self.queue.invalidate(stale);
        }
        let id = self.queue.push_circle(center, sweep_y, mid);
        self.beachline.set_circle(mid, Some(id));
        log::trace!(
            "scheduled circle event for sites {}, {}, {} at {:?} (sweep {:.6})",
            sa,
            sb,
            sc,
            center,
            sweep_y
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sweep(sites: &[DVec2]) -> SweepOutput {
        Sweep::new(sites).run()
    }

    #[test]
    fn test_single_site() {
        let out = sweep(&[DVec2::new(1.0, 1.0)]);
        assert_eq!(out.beachline.arc_sites(), vec![0]);
        assert_eq!(out.dcel.edge_count(), 0);
        assert_eq!(out.stats.site_events, 1);
    }

    #[test]
    fn test_two_sites_one_edge() {
        let out = sweep(&[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]);
        assert_eq!(out.dcel.edge_count(), 1);
        assert_eq!(out.stats.circle_events_scheduled, 0);
        assert_eq!(out.top_row_ends.len(), 1);
        // The untracked end points up, the breakpoint's end points down
        assert!(out.top_row_ends[0].direction.y > 0.0);
        assert_eq!(out.beachline.breakpoints().len(), 1);
    }

    #[test]
    fn test_triangle_one_vertex() {
        let out = sweep(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(5.0, 10.0),
        ]);
        assert_eq!(out.stats.circle_events_processed, 1);
        assert_eq!(out.dcel.vertices().len(), 1);
        let v = out.dcel.vertices()[0];
        assert_abs_diff_eq!(v.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 3.75, epsilon = 1e-9);
        assert_eq!(out.dcel.edge_count(), 3);
        assert_abs_diff_eq!(out.lowest_event_y, -2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_square_cocircular_events_share_a_point() {
        let out = sweep(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 10.0),
        ]);
        // Both events fire at the centre, joined by a zero-length edge
        assert_eq!(out.stats.circle_events_processed, 2);
        assert_eq!(out.dcel.vertices().len(), 2);
        assert_eq!(out.dcel.edge_count(), 5);
        for v in out.dcel.vertices() {
            assert_abs_diff_eq!(v.x, 5.0, epsilon = 1e-9);
            assert_abs_diff_eq!(v.y, 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_site_below_converging_breakpoint() {
        // The rotated square: the last site sits exactly under the point
        // where the first three sites' circle closes.
        let sites = [
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(-10.0, 0.0),
            DVec2::new(0.0, -10.0),
        ];
        let out = sweep(&sites);
        assert_eq!(out.stats.site_events, 4);
        assert!(out.stats.circle_events_processed >= 2);
        assert!(!out.dcel.vertices().is_empty());
        for v in out.dcel.vertices() {
            assert!(v.length() < 1e-9, "vertex {} away from the centre", v);
        }
        assert_eq!(out.beachline.breakpoints().len(), 4);
    }

    #[test]
    fn test_collinear_schedules_nothing() {
        let sites: Vec<DVec2> = (0..4).map(|i| DVec2::new(i as f64, 0.0)).collect();
        let out = sweep(&sites);
        assert_eq!(out.stats.circle_events_scheduled, 0);
        assert_eq!(out.dcel.edge_count(), 3);
        assert_eq!(out.top_row_ends.len(), 3);
    }

    #[test]
    fn test_vertical_collinear_sites() {
        let sites: Vec<DVec2> = (0..4).map(|i| DVec2::new(0.0, i as f64)).collect();
        let out = sweep(&sites);
        assert_eq!(out.stats.circle_events_processed, 0);
        assert_eq!(out.dcel.edge_count(), 3);
        assert!(out.dcel.vertices().is_empty());
    }
}
