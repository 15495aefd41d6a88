//! Geometry kernel for the sweepline
//!
//! Pure functions over sites and the sweep coordinate. The sweep moves from
//! larger `y` towards smaller `y`; every site above the sweep line is the
//! focus of a parabola whose points are equidistant from the site and the line.
//!
//! All predicates share the tolerances defined here.

use glam::DVec2;

/// Relative tolerance for near-zero tests (determinants, degenerate quadratics)
pub const EPSILON: f64 = 1e-9;

/// Relative tolerance for distance comparisons (equidistance, coincident vertices)
pub const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Tolerance scaled to the magnitude of the values being compared
#[inline]
pub fn scaled(tolerance: f64, magnitude: f64) -> f64 {
    tolerance * magnitude.abs().max(1.0)
}

/// Whether two points coincide within the distance tolerance
pub fn points_coincide(a: DVec2, b: DVec2) -> bool {
    let scale = a.abs().max_element().max(b.abs().max_element());
    a.distance(b) <= scaled(DISTANCE_TOLERANCE, scale)
}

/// Height of the parabola with the given focus and horizontal directrix at `x`
///
/// The directrix is the sweep line `y = sweep_y`, which lies at or below the
/// focus. When the focus sits exactly on the directrix the parabola
/// degenerates into a vertical ray and the focus height is returned; a focus
/// any distance above it still has a (possibly very narrow) parabola.
pub fn parabola_y(focus: DVec2, sweep_y: f64, x: f64) -> f64 {
    let d = focus.y - sweep_y;
    if d == 0.0 {
        return focus.y;
    }
    let dx = x - focus.x;
    dx * dx / (2.0 * d) + (focus.y + sweep_y) * 0.5
}

/// X coordinate of the breakpoint between the arc of `left` and the arc of `right`
///
/// "Left" and "right" refer to the order of the two arcs along the beachline.
/// The two parabolas intersect in up to two points; the one that separates the
/// arcs in this order is the larger root when `left` lies below `right` and
/// the smaller root otherwise. A negative discriminant caused by rounding is
/// clamped to zero.
///
/// Degenerate cases are decided exactly, matching how the beachline splits
/// arcs: two sites a single ulp apart in height still have two intersections,
/// one of them far away, and the arc between them is not empty.
pub fn breakpoint_x(left: DVec2, right: DVec2, sweep_y: f64) -> f64 {
    let d1 = left.y - sweep_y;
    let d2 = right.y - sweep_y;

    // Both foci on the sweep line: the breakpoint is the bisector of the two rays
    if d1 == 0.0 && d2 == 0.0 {
        return (left.x + right.x) * 0.5;
    }
    // One focus on the sweep line: its arc is a vertical ray at its x
    if d1 == 0.0 {
        return left.x;
    }
    if d2 == 0.0 {
        return right.x;
    }

    let a = d2 - d1;
    let b = 2.0 * (right.x * d1 - left.x * d2);
    let c = left.x * left.x * d2 - right.x * right.x * d1 + (left.y - right.y) * d1 * d2;

    if a == 0.0 {
        // Equal heights: a single intersection on the vertical bisector
        if b == 0.0 {
            return (left.x + right.x) * 0.5;
        }
        return -c / b;
    }

    // Roots without cancellation, so a tiny `a` yields one huge root and one exact one
    let sqrt_disc = (b * b - 4.0 * a * c).max(0.0).sqrt();
    let q = -0.5 * (b + sqrt_disc.copysign(b));
    let r1 = q / a;
    let r2 = if q == 0.0 { r1 } else { c / q };
    let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
    if left.y < right.y {
        hi
    } else {
        lo
    }
}

/// Position of the breakpoint between two arcs at the given sweep coordinate
pub fn breakpoint_position(left: DVec2, right: DVec2, sweep_y: f64) -> DVec2 {
    let x = breakpoint_x(left, right, sweep_y);
    // Evaluate on the parabola whose focus is further from the sweep line
    let focus = if left.y - sweep_y >= right.y - sweep_y { left } else { right };
    DVec2::new(x, parabola_y(focus, sweep_y, x))
}

/// Direction in which the breakpoint between `left` and `right` travels as the sweep advances
///
/// The breakpoint lies on the perpendicular bisector of the two sites and keeps
/// `left` on its right-hand side, so it moves along `right - left` rotated
/// clockwise by 90 degrees.
#[inline]
pub fn breakpoint_direction(left: DVec2, right: DVec2) -> DVec2 {
    let d = right - left;
    DVec2::new(d.y, -d.x)
}

/// Center of the circle through three points
///
/// Returns `None` when the points are collinear or two of them coincide,
/// measured relative to the lengths of the triangle's sides.
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    let scale = ab.length() * ac.length();
    if scale == 0.0 || d.abs() <= EPSILON * scale {
        return None;
    }
    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let center = a + DVec2::new(ux, uy);
    center.is_finite().then_some(center)
}

/// Whether the arcs of `a`, `b`, `c` (left to right) converge at `center`
///
/// All three conditions must hold:
/// 1. `center` is equidistant from the three sites.
/// 2. The bottom of the circle is at or below the sweep line, so the event
///    still lies ahead of the sweep.
/// 3. Both breakpoints of the middle arc move towards `center`. This is
///    checked by projecting each breakpoint's offset to `center` onto its
///    direction of travel; when that is inconclusive the sweep is advanced by
///    a small step and both breakpoints must end up closer to `center`.
///
/// When both breakpoints already sit on `center` (another event or a site
/// event just happened there) neither test can tell a closing arc from one
/// that is about to open. The arc closes exactly when, a step later, its
/// breakpoints would have crossed.
pub fn converges(center: DVec2, a: DVec2, b: DVec2, c: DVec2, sweep_y: f64) -> bool {
    let ra = center.distance(a);
    let rb = center.distance(b);
    let rc = center.distance(c);
    let radius = rb;
    let dist_tol = scaled(DISTANCE_TOLERANCE, radius.max(center.abs().max_element()));

    if (ra - rb).abs() > dist_tol || (rc - rb).abs() > dist_tol {
        return false;
    }
    if center.y - radius > sweep_y + dist_tol {
        return false;
    }

    let left_bp = breakpoint_position(a, b, sweep_y);
    let right_bp = breakpoint_position(b, c, sweep_y);
    if left_bp.distance(center) <= dist_tol && right_bp.distance(center) <= dist_tol {
        return crossed_in_future(a, b, c, sweep_y, radius);
    }

    let heading = |bp: DVec2, dir: DVec2| (center - bp).dot(dir.normalize_or_zero());
    if heading(left_bp, breakpoint_direction(a, b)) >= -dist_tol
        && heading(right_bp, breakpoint_direction(b, c)) >= -dist_tol
    {
        return true;
    }

    closer_in_future(center, a, b, c, sweep_y, radius)
}

/// Advance the sweep by a small step and check both breakpoints approach `center`
fn closer_in_future(center: DVec2, a: DVec2, b: DVec2, c: DVec2, sweep_y: f64, radius: f64) -> bool {
    let step = (radius * 0.1).max(scaled(DISTANCE_TOLERANCE, radius));
    let future = sweep_y - step;

    let now_left = breakpoint_position(a, b, sweep_y).distance(center);
    let now_right = breakpoint_position(b, c, sweep_y).distance(center);
    let later_left = breakpoint_position(a, b, future).distance(center);
    let later_right = breakpoint_position(b, c, future).distance(center);

    later_left < now_left && later_right < now_right
}

/// Advance the sweep by a small step and check the middle arc would have negative width
fn crossed_in_future(a: DVec2, b: DVec2, c: DVec2, sweep_y: f64, radius: f64) -> bool {
    let step = (radius * 0.1).max(scaled(DISTANCE_TOLERANCE, radius));
    let future = sweep_y - step;
    breakpoint_x(a, b, future) > breakpoint_x(b, c, future)
}
