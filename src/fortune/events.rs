//! Event queue for the sweep
//!
//! Site events are known up front; circle events are scheduled and cancelled
//! while the sweep runs. Every circle event has one authoritative entry in a
//! table owned by the queue. Arcs refer to that entry by [`CircleId`], and
//! cancelling an event only flips its `active` flag: the heap entry stays
//! behind and is recognised as stale when it is popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::DVec2;

use super::beachline::NodeId;

/// Index of a circle event in the queue's event table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CircleId(usize);

impl CircleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A scheduled convergence of three consecutive arcs
#[derive(Debug, Clone, Copy)]
pub struct CircleEvent {
    /// Circumcenter of the three sites; becomes a Voronoi vertex
    pub center: DVec2,
    /// Sweep coordinate at which the event fires (bottom of the circle)
    pub sweep_y: f64,
    /// The arc that disappears
    pub arc: NodeId,
    /// Cleared when the event is cancelled
    pub active: bool,
}

/// Event popped from the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Index of the site whose coordinate the sweep has reached
    Site(usize),
    /// Circle event handle; may refer to a cancelled entry
    Circle(CircleId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    y: f64,
    x: f64,
    event: Event,
    seq: u64,
}

impl Entry {
    /// Site events before circle events at the same position
    fn kind_rank(&self) -> u8 {
        match self.event {
            Event::Site(_) => 0,
            Event::Circle(_) => 1,
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// Max-heap order: larger `y` first, then smaller `x`, then site before
    /// circle, then insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| other.x.total_cmp(&self.x))
            .then_with(|| other.kind_rank().cmp(&self.kind_rank()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of site and circle events ordered along the sweep
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    circles: Vec<CircleEvent>,
    seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue primed with one site event per site
    pub fn with_sites(sites: &[DVec2]) -> Self {
        let mut queue = Self {
            heap: BinaryHeap::with_capacity(sites.len() * 2),
            circles: Vec::new(),
            seq: 0,
        };
        for (index, site) in sites.iter().enumerate() {
            queue.push_site(index, *site);
        }
        queue
    }

    pub fn push_site(&mut self, index: usize, position: DVec2) {
        self.push_entry(position, Event::Site(index));
    }

    /// Schedule a circle event and return its handle
    pub fn push_circle(&mut self, center: DVec2, sweep_y: f64, arc: NodeId) -> CircleId {
        let id = CircleId(self.circles.len());
        self.circles.push(CircleEvent {
            center,
            sweep_y,
            arc,
            active: true,
        });
        self.push_entry(DVec2::new(center.x, sweep_y), Event::Circle(id));
        id
    }

    fn push_entry(&mut self, position: DVec2, event: Event) {
        self.heap.push(Entry {
            y: position.y,
            x: position.x,
            event,
            seq: self.seq,
        });
        self.seq += 1;
    }

    /// Remove the next event along the sweep
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|entry| entry.event)
    }

    #[cfg(test)]
    pub fn peek(&self) -> Option<Event> {
        self.heap.peek().map(|entry| entry.event)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Cancel a circle event; the queued entry is skipped when popped
    pub fn invalidate(&mut self, id: CircleId) {
        if let Some(event) = self.circles.get_mut(id.0) {
            event.active = false;
        }
    }

    #[cfg(test)]
    pub fn is_active(&self, id: CircleId) -> bool {
        self.circles.get(id.0).is_some_and(|event| event.active)
    }

    pub fn circle(&self, id: CircleId) -> &CircleEvent {
        &self.circles[id.0]
    }

    /// Number of circle events ever scheduled
    pub fn circles_scheduled(&self) -> usize {
        self.circles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(i: usize) -> NodeId {
        NodeId::from_index(i)
    }

    #[test]
    fn test_sites_pop_top_down() {
        let sites = [
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 10.0),
            DVec2::new(10.0, 0.0),
        ];
        let mut queue = EventQueue::with_sites(&sites);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Event::Site(1)));
        assert_eq!(queue.pop(), Some(Event::Site(0)));
        assert_eq!(queue.pop(), Some(Event::Site(2)));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_break_by_x_then_kind() {
        let mut queue = EventQueue::new();
        let circle = queue.push_circle(DVec2::new(1.0, 7.0), 2.0, arc(0));
        queue.push_site(0, DVec2::new(3.0, 2.0));
        queue.push_site(1, DVec2::new(1.0, 2.0));
        queue.push_site(2, DVec2::new(1.0, 5.0));

        assert_eq!(queue.pop(), Some(Event::Site(2)));
        assert_eq!(queue.pop(), Some(Event::Site(1)));
        assert_eq!(queue.pop(), Some(Event::Circle(circle)));
        assert_eq!(queue.pop(), Some(Event::Site(0)));
    }

    #[test]
    fn test_equal_positions_keep_insertion_order() {
        let mut queue = EventQueue::new();
        let first = queue.push_circle(DVec2::new(0.0, 3.0), 1.0, arc(0));
        let second = queue.push_circle(DVec2::new(0.0, 4.0), 1.0, arc(1));
        assert_eq!(queue.pop(), Some(Event::Circle(first)));
        assert_eq!(queue.pop(), Some(Event::Circle(second)));
    }

    #[test]
    fn test_invalidate_marks_entry_stale() {
        let mut queue = EventQueue::new();
        let id = queue.push_circle(DVec2::new(0.0, 0.0), -1.0, arc(4));
        assert!(queue.is_active(id));
        queue.invalidate(id);
        assert!(!queue.is_active(id));

        // The entry is still delivered; the consumer checks `active`
        assert_eq!(queue.pop(), Some(Event::Circle(id)));
        assert!(!queue.circle(id).active);
        assert_eq!(queue.circle(id).arc, arc(4));
        assert_eq!(queue.circles_scheduled(), 1);
    }

    #[test]
    fn test_circle_fires_at_circle_bottom() {
        let mut queue = EventQueue::new();
        queue.push_site(0, DVec2::new(0.0, -3.0));
        let id = queue.push_circle(DVec2::new(5.0, 3.75), -2.5, arc(2));
        assert_eq!(queue.peek(), Some(Event::Circle(id)));
    }
}
