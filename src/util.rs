//! Timing helpers for construction diagnostics, and a union-find lookup.

use std::time::Instant;

/// RAII timer that logs elapsed time on drop.
///
/// # Example
/// ```ignore
/// let _t = Timed::info("Voronoi construction");
/// // ... sweep and clip ...
/// // logs "Voronoi construction: 1.234ms" when _t is dropped
/// ```
pub(crate) struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Create a new timer that logs at INFO level.
    pub(crate) fn info(name: &'static str) -> Self {
        log::debug!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Info,
        }
    }

    /// Create a new timer that logs at DEBUG level.
    pub(crate) fn debug(name: &'static str) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Debug,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}

/// Union-find root of `v`, halving the path on the way.
///
/// Callers always attach the larger root under the smaller one, so the root
/// is the smallest index of its set.
pub(crate) fn find_root(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

/// Join the sets of `a` and `b`; returns whether they were separate.
pub(crate) fn union(parent: &mut [usize], a: usize, b: usize) -> bool {
    let (ra, rb) = (find_root(parent, a), find_root(parent, b));
    if ra == rb {
        return false;
    }
    parent[ra.max(rb)] = ra.min(rb);
    true
}
