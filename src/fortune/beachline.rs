//! The beachline: the sequence of parabolic arcs closest to the sweep line
//!
//! Stored as a leaf-oriented, height-balanced (AVL) binary tree in an arena.
//! Leaves are arcs in left-to-right order; every internal node is the
//! breakpoint between the rightmost arc of its left subtree and the leftmost
//! arc of its right subtree. Breakpoint positions are never stored: they are
//! recomputed from the two sites and the current sweep coordinate whenever
//! the tree is searched.

use glam::DVec2;

use super::dcel::DcelBuilder;
use super::events::{CircleId, EventQueue};
use super::kernel;
use crate::diagram::{FaceId, HalfEdgeId};

/// Handle of a beachline node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// A parabolic arc of `site`, with its pending circle event if any
    Arc {
        site: usize,
        circle: Option<CircleId>,
    },
    /// Boundary between the arc of `left` and the arc of `right`
    ///
    /// `edge` is the half-edge bordering `left`'s face whose open destination
    /// this breakpoint traces.
    Breakpoint {
        left: usize,
        right: usize,
        edge: HalfEdgeId,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u32,
}

/// Arcs produced by splitting an arc with a new site
#[derive(Debug, Clone, Copy)]
pub struct SplitArcs {
    /// The new site's arc
    pub arc: NodeId,
    /// Left remainder of the split arc
    pub left: NodeId,
    /// Right remainder, absent when the split arc's site lies on the sweep line
    pub right: Option<NodeId>,
    /// Half-edge bordering the split site's face, traced by the left breakpoint
    pub edge: HalfEdgeId,
}

#[derive(Debug, Clone, Default)]
pub struct Beachline {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Beachline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Start the beachline with the arc of the first site
    pub fn insert_root(&mut self, site: usize) -> NodeId {
        debug_assert!(self.root.is_none());
        let id = self.alloc(NodeKind::Arc { site, circle: None });
        self.root = Some(id);
        id
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Arc { .. })
    }

    #[cfg(test)]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    /// Site of an arc
    ///
    /// # Panics
    ///
    /// Panics if `arc` is a breakpoint.
    pub fn site(&self, arc: NodeId) -> usize {
        match self.nodes[arc.0].kind {
            NodeKind::Arc { site, .. } => site,
            NodeKind::Breakpoint { .. } => panic!("node {:?} is a breakpoint, not an arc", arc),
        }
    }

    pub fn circle(&self, arc: NodeId) -> Option<CircleId> {
        match self.nodes[arc.0].kind {
            NodeKind::Arc { circle, .. } => circle,
            NodeKind::Breakpoint { .. } => None,
        }
    }

    /// Attach or clear the pending circle event of an arc, returning the previous one
    pub fn set_circle(&mut self, arc: NodeId, event: Option<CircleId>) -> Option<CircleId> {
        match &mut self.nodes[arc.0].kind {
            NodeKind::Arc { circle, .. } => std::mem::replace(circle, event),
            NodeKind::Breakpoint { .. } => panic!("node {:?} is a breakpoint, not an arc", arc),
        }
    }

    /// Half-edge traced by a breakpoint
    pub fn edge(&self, breakpoint: NodeId) -> HalfEdgeId {
        match self.nodes[breakpoint.0].kind {
            NodeKind::Breakpoint { edge, .. } => edge,
            NodeKind::Arc { .. } => panic!("node {:?} is an arc, not a breakpoint", breakpoint),
        }
    }

    /// Locate the arc vertically above `x` at the given sweep coordinate
    ///
    /// At each breakpoint the search goes left when `x` is strictly less than
    /// the breakpoint's current x, and right otherwise.
    ///
    /// # Panics
    ///
    /// Panics if the beachline is empty.
    pub fn find_arc_above(&self, sites: &[DVec2], x: f64, sweep_y: f64) -> NodeId {
        let mut current = self.root.expect("find_arc_above on an empty beachline");
        loop {
            let node = &self.nodes[current.0];
            match node.kind {
                NodeKind::Arc { .. } => return current,
                NodeKind::Breakpoint { left, right, .. } => {
                    let bx = kernel::breakpoint_x(sites[left], sites[right], sweep_y);
                    current = if x < bx { node.left } else { node.right }
                        .expect("breakpoint with a missing child");
                }
            }
        }
    }

    /// Split the arc `target` with the arc of the newly swept `site`
    ///
    /// Cancels the circle event pending on `target` and creates the twin pair
    /// traced by the two new breakpoints, with both ends open and the midpoint
    /// of the two sites as anchor. The sequence `.. p ..` becomes `.. p q p ..`.
    ///
    /// When `target`'s site has exactly the new site's coordinate (only
    /// possible while every swept site shares the top-most coordinate) no
    /// parabola exists yet and `.. p ..` becomes `.. p q ..` with a single
    /// breakpoint whose edge is the vertical bisector of the two sites. A site
    /// any amount above the sweep line still has an arc, however narrow, and
    /// is split normally.
    pub fn insert_split(
        &mut self,
        target: NodeId,
        site: usize,
        sites: &[DVec2],
        dcel: &mut DcelBuilder,
        events: &mut EventQueue,
    ) -> SplitArcs {
        let p = self.site(target);
        if let Some(stale) = self.set_circle(target, None) {
            events.invalidate(stale);
        }

        let focus = sites[p];
        let q = sites[site];
        let midpoint = (focus + q) * 0.5;

        if focus.y == q.y {
            let edge = dcel.create_edge(FaceId(p), FaceId(site), midpoint);
            let left = self.alloc(NodeKind::Arc { site: p, circle: None });
            let arc = self.alloc(NodeKind::Arc { site, circle: None });
            self.nodes[target.0].kind = NodeKind::Breakpoint { left: p, right: site, edge };
            self.attach(target, left, arc);
            self.rebalance_from(target);
            return SplitArcs {
                arc,
                left,
                right: None,
                edge,
            };
        }

        let edge = dcel.create_edge(FaceId(p), FaceId(site), midpoint);
        let twin = dcel.twin(edge);

        let left = self.alloc(NodeKind::Arc { site: p, circle: None });
        let arc = self.alloc(NodeKind::Arc { site, circle: None });
        let right = self.alloc(NodeKind::Arc { site: p, circle: None });
        let inner = self.alloc(NodeKind::Breakpoint {
            left: site,
            right: p,
            edge: twin,
        });
        self.attach(inner, arc, right);
        self.nodes[target.0].kind = NodeKind::Breakpoint { left: p, right: site, edge };
        self.attach(target, left, inner);
        self.rebalance_from(target);

        SplitArcs {
            arc,
            left,
            right: Some(right),
            edge,
        }
    }

    /// Remove a squeezed arc and merge its two breakpoints into one
    ///
    /// The surviving breakpoint now separates the former neighbours and traces
    /// `edge`. Returns the neighbours `(predecessor, successor)`.
    ///
    /// # Panics
    ///
    /// Panics if `arc` is not a leaf or lacks a neighbour on either side.
    pub fn remove_arc(&mut self, arc: NodeId, edge: HalfEdgeId) -> (NodeId, NodeId) {
        assert!(self.is_leaf(arc), "remove_arc called on breakpoint {:?}", arc);
        let pred = self
            .predecessor_leaf(arc)
            .expect("removed arc has no left neighbour");
        let succ = self
            .successor_leaf(arc)
            .expect("removed arc has no right neighbour");
        let parent = self.nodes[arc.0].parent.expect("removed arc has no parent");

        let (sibling, surviving) = if self.nodes[parent.0].left == Some(arc) {
            (self.nodes[parent.0].right, self.left_breakpoint(arc))
        } else {
            (self.nodes[parent.0].left, self.right_breakpoint(arc))
        };
        let sibling = sibling.expect("breakpoint with a missing child");
        let surviving = surviving.expect("removed arc is missing a breakpoint");

        self.nodes[surviving.0].kind = NodeKind::Breakpoint {
            left: self.site(pred),
            right: self.site(succ),
            edge,
        };

        let grandparent = self.nodes[parent.0].parent;
        self.replace_child(grandparent, parent, sibling);
        self.release(arc);
        self.release(parent);
        if let Some(g) = grandparent {
            self.rebalance_from(g);
        }
        (pred, succ)
    }

    /// Nearest ancestor separating `leaf` from the arc on its left
    pub fn left_breakpoint(&self, leaf: NodeId) -> Option<NodeId> {
        let mut node = leaf;
        while let Some(parent) = self.nodes[node.0].parent {
            if self.nodes[parent.0].right == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    /// Nearest ancestor separating `leaf` from the arc on its right
    pub fn right_breakpoint(&self, leaf: NodeId) -> Option<NodeId> {
        let mut node = leaf;
        while let Some(parent) = self.nodes[node.0].parent {
            if self.nodes[parent.0].left == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    /// Arc immediately to the left of `leaf`
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is a breakpoint.
    pub fn predecessor_leaf(&self, leaf: NodeId) -> Option<NodeId> {
        assert!(self.is_leaf(leaf), "predecessor_leaf of breakpoint {:?}", leaf);
        let bp = self.left_breakpoint(leaf)?;
        let mut node = self.nodes[bp.0].left?;
        while let Some(right) = self.nodes[node.0].right {
            node = right;
        }
        Some(node)
    }

    /// Arc immediately to the right of `leaf`
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is a breakpoint.
    pub fn successor_leaf(&self, leaf: NodeId) -> Option<NodeId> {
        assert!(self.is_leaf(leaf), "successor_leaf of breakpoint {:?}", leaf);
        let bp = self.right_breakpoint(leaf)?;
        let mut node = self.nodes[bp.0].right?;
        while let Some(left) = self.nodes[node.0].left {
            node = left;
        }
        Some(node)
    }

    /// Breakpoints from left to right as `(left site, right site, half-edge)`
    pub fn breakpoints(&self) -> Vec<(usize, usize, HalfEdgeId)> {
        self.in_order()
            .into_iter()
            .filter_map(|id| match self.nodes[id.0].kind {
                NodeKind::Breakpoint { left, right, edge } => Some((left, right, edge)),
                NodeKind::Arc { .. } => None,
            })
            .collect()
    }

    /// Sites of the arcs from left to right
    #[cfg(test)]
    pub fn arc_sites(&self) -> Vec<usize> {
        self.in_order()
            .into_iter()
            .filter_map(|id| match self.nodes[id.0].kind {
                NodeKind::Arc { site, .. } => Some(site),
                NodeKind::Breakpoint { .. } => None,
            })
            .collect()
    }

    fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id.0].left;
            }
            if let Some(id) = stack.pop() {
                out.push(id);
                current = self.nodes[id.0].right;
            }
        }
        out
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            left: None,
            right: None,
            height: 1,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.left = None;
        node.right = None;
        self.free.push(id);
    }

    fn attach(&mut self, parent: NodeId, left: NodeId, right: NodeId) {
        self.nodes[parent.0].left = Some(left);
        self.nodes[parent.0].right = Some(right);
        self.nodes[left.0].parent = Some(parent);
        self.nodes[right.0].parent = Some(parent);
        self.update_height(parent);
    }

    /// Point `parent`'s link to `old` at `new` instead (or the root if `parent` is `None`)
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if self.nodes[p.0].left == Some(old) {
                    self.nodes[p.0].left = Some(new);
                } else {
                    self.nodes[p.0].right = Some(new);
                }
            }
        }
        self.nodes[new.0].parent = parent;
    }

    #[inline]
    fn height(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.nodes[id.0].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        let h = 1 + self.height(node.left).max(self.height(node.right));
        self.nodes[id.0].height = h;
    }

    fn balance(&self, id: NodeId) -> i64 {
        let node = &self.nodes[id.0];
        self.height(node.left) as i64 - self.height(node.right) as i64
    }

    /// Restore heights and balance from `id` up to the root
    fn rebalance_from(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            self.update_height(id);
            let balance = self.balance(id);
            let top = if balance > 1 {
                let left = self.nodes[id.0].left.expect("left-heavy node without left child");
                if self.balance(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(id)
            } else if balance < -1 {
                let right = self.nodes[id.0].right.expect("right-heavy node without right child");
                if self.balance(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(id)
            } else {
                id
            };
            current = self.nodes[top.0].parent;
        }
    }

    /// Rotate `x` down to the left; returns the node that took its place
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x.0].right.expect("rotate_left without right child");
        let inner = self.nodes[y.0].left;
        let parent = self.nodes[x.0].parent;

        self.nodes[x.0].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner.0].parent = Some(x);
        }
        self.replace_child(parent, x, y);
        self.nodes[y.0].left = Some(x);
        self.nodes[x.0].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Rotate `x` down to the right; returns the node that took its place
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x.0].left.expect("rotate_right without left child");
        let inner = self.nodes[y.0].right;
        let parent = self.nodes[x.0].parent;

        self.nodes[x.0].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner.0].parent = Some(x);
        }
        self.replace_child(parent, x, y);
        self.nodes[y.0].right = Some(x);
        self.nodes[x.0].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Check structural invariants; returns a description of the first violation
    #[cfg(test)]
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if self.nodes[root.0].parent.is_some() {
            return Err("root has a parent".into());
        }
        self.validate_node(root).map(|_| ())
    }

    /// Returns `(height, leftmost site, rightmost site)` of the subtree
    #[cfg(test)]
    fn validate_node(&self, id: NodeId) -> std::result::Result<(u32, usize, usize), String> {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Arc { site, .. } => {
                if node.left.is_some() || node.right.is_some() {
                    return Err(format!("arc {:?} has children", id));
                }
                Ok((1, site, site))
            }
            NodeKind::Breakpoint { left, right, .. } => {
                let (Some(l), Some(r)) = (node.left, node.right) else {
                    return Err(format!("breakpoint {:?} is missing a child", id));
                };
                for child in [l, r] {
                    if self.nodes[child.0].parent != Some(id) {
                        return Err(format!("child {:?} does not point back to {:?}", child, id));
                    }
                }
                let (lh, lmin, lmax) = self.validate_node(l)?;
                let (rh, rmin, rmax) = self.validate_node(r)?;
                if (lmax, rmin) != (left, right) {
                    return Err(format!(
                        "breakpoint {:?} labelled ({}, {}) separates ({}, {})",
                        id, left, right, lmax, rmin
                    ));
                }
                if (lh as i64 - rh as i64).abs() > 1 {
                    return Err(format!("breakpoint {:?} is unbalanced", id));
                }
                let h = 1 + lh.max(rh);
                if h != node.height {
                    return Err(format!("breakpoint {:?} has stale height", id));
                }
                Ok((h, lmin, rmax))
            }
        }
    }
}
