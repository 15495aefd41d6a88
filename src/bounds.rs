//! Axis-aligned clip rectangle
//!
//! The rectangle every finished diagram is clipped to, plus the ray, line and
//! segment intersection helpers the clipper and the display view need.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fortune::kernel::{DISTANCE_TOLERANCE, EPSILON};

/// Axis-aligned rectangle with `min` at the bottom-left and `max` at the top-right
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// let bounds = BoundingBox::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 5.0));
/// assert_eq!(bounds.width(), 10.0);
/// assert!(bounds.contains(DVec2::new(3.0, 4.0)));
///
/// // Rays leave through the first side they hit
/// let exit = bounds.ray_exit(DVec2::new(5.0, 2.0), DVec2::new(0.0, 1.0)).unwrap();
/// assert_eq!(exit, DVec2::new(5.0, 5.0));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Bottom-left corner
    pub min: DVec2,
    /// Top-right corner
    pub max: DVec2,
}

impl BoundingBox {
    /// Create a rectangle from two corners
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing every point, or `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.including(p)))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Length of the rectangle's diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }

    /// Distance below which two points on or near this rectangle are treated as equal
    pub fn tolerance(&self) -> f64 {
        DISTANCE_TOLERANCE * self.diagonal().max(1.0)
    }

    /// Whether the point lies inside or on the rectangle
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether the point lies inside the rectangle and further than `tol` from every side
    pub fn contains_strictly(&self, p: DVec2, tol: f64) -> bool {
        p.x > self.min.x + tol
            && p.x < self.max.x - tol
            && p.y > self.min.y + tol
            && p.y < self.max.y - tol
    }

    /// Whether the point lies on one of the four sides, within tolerance
    pub fn on_boundary(&self, p: DVec2) -> bool {
        let tol = self.tolerance();
        self.contains_strictly(p, -tol) && !self.contains_strictly(p, tol)
    }

    /// Rectangle grown by `margin` on every side
    pub fn grow(&self, margin: f64) -> Self {
        Self::new(self.min - DVec2::splat(margin), self.max + DVec2::splat(margin))
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Smallest rectangle containing this one and the point
    pub fn including(&self, p: DVec2) -> Self {
        Self::new(self.min.min(p), self.max.max(p))
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.min.x, self.max.y),
            self.max,
            DVec2::new(self.max.x, self.min.y),
            self.min,
        ]
    }

    /// First point where a ray from `origin` along `direction` leaves the rectangle
    ///
    /// The origin must lie inside the rectangle (within tolerance). Returns `None`
    /// for a zero direction or an origin outside the rectangle.
    pub fn ray_exit(&self, origin: DVec2, direction: DVec2) -> Option<DVec2> {
        let dir = direction.try_normalize()?;
        let tol = self.tolerance();
        let (t0, t1) = self.clip_parametric(origin, dir, -tol, f64::INFINITY, tol)?;
        if t0 > tol {
            return None;
        }
        Some(self.snap_to_boundary(origin + dir * t1))
    }

    /// Entry and exit points of the infinite line through `point` along `direction`
    ///
    /// The pair is ordered along `direction`. Returns `None` when the line misses.
    pub fn clip_line(&self, point: DVec2, direction: DVec2) -> Option<(DVec2, DVec2)> {
        let dir = direction.try_normalize()?;
        let tol = self.tolerance();
        let (t0, t1) =
            self.clip_parametric(point, dir, f64::NEG_INFINITY, f64::INFINITY, tol)?;
        Some((
            self.snap_to_boundary(point + dir * t0),
            self.snap_to_boundary(point + dir * t1),
        ))
    }

    /// Portion of the segment `a`-`b` inside the rectangle
    pub fn clip_segment(&self, a: DVec2, b: DVec2) -> Option<(DVec2, DVec2)> {
        let dir = b - a;
        let (t0, t1) = self.clip_parametric(a, dir, 0.0, 1.0, 0.0)?;
        if t1 - t0 <= EPSILON {
            return None;
        }
        Some((a + dir * t0, a + dir * t1))
    }

    /// Liang-Barsky slab clipping of `origin + t * dir` for `t` in `[t0, t1]`
    fn clip_parametric(
        &self,
        origin: DVec2,
        dir: DVec2,
        mut t0: f64,
        mut t1: f64,
        tol: f64,
    ) -> Option<(f64, f64)> {
        let slabs = [
            (-dir.x, origin.x - self.min.x),
            (dir.x, self.max.x - origin.x),
            (-dir.y, origin.y - self.min.y),
            (dir.y, self.max.y - origin.y),
        ];
        for (p, q) in slabs {
            if p.abs() <= EPSILON {
                if q < -tol {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 + tol {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 - tol {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        if t0 > t1 {
            // Grazing hit within tolerance
            let mid = (t0 + t1) * 0.5;
            return Some((mid, mid));
        }
        Some((t0, t1))
    }

    /// Move a point lying near the boundary exactly onto its closest side
    pub fn snap_to_boundary(&self, p: DVec2) -> DVec2 {
        let mut q = p.clamp(self.min, self.max);
        match self.closest_side(q) {
            Side::Top => q.y = self.max.y,
            Side::Right => q.x = self.max.x,
            Side::Bottom => q.y = self.min.y,
            Side::Left => q.x = self.min.x,
        }
        q
    }

    /// Clockwise position of a boundary point, measured from the top-left corner
    ///
    /// Keys run `[0, w)` along the top, `[w, w + h)` down the right side,
    /// `[w + h, 2w + h)` leftwards along the bottom and `[2w + h, 2w + 2h)` up the
    /// left side.
    pub fn perimeter_key(&self, p: DVec2) -> f64 {
        let (w, h) = (self.width(), self.height());
        match self.closest_side(p) {
            Side::Top => p.x - self.min.x,
            Side::Right => w + (self.max.y - p.y),
            Side::Bottom => w + h + (self.max.x - p.x),
            Side::Left => 2.0 * w + h + (p.y - self.min.y),
        }
    }

    /// Part of a polygon inside the rectangle
    ///
    /// Clips against each side in turn, keeping the vertex order of the
    /// input. Returns an empty polygon when nothing is inside.
    pub fn clip_polygon(&self, polygon: &[DVec2]) -> Vec<DVec2> {
        // Signed distance inside each side; non-negative means kept
        let sides: [fn(&Self, DVec2) -> f64; 4] = [
            |b, p| p.x - b.min.x,
            |b, p| b.max.x - p.x,
            |b, p| p.y - b.min.y,
            |b, p| b.max.y - p.y,
        ];

        let mut output = polygon.to_vec();
        for inside in sides {
            let Some(&last) = output.last() else {
                break;
            };
            let input = std::mem::take(&mut output);
            let mut prev = last;
            let mut prev_d = inside(self, prev);
            for &current in &input {
                let d = inside(self, current);
                if (d >= 0.0) != (prev_d >= 0.0) {
                    let t = prev_d / (prev_d - d);
                    output.push(prev.lerp(current, t));
                }
                if d >= 0.0 {
                    output.push(current);
                }
                prev = current;
                prev_d = d;
            }
        }
        output
    }

    /// Side nearest to the point; ties resolve in clockwise order from the top
    fn closest_side(&self, p: DVec2) -> Side {
        let candidates = [
            (Side::Top, (p.y - self.max.y).abs()),
            (Side::Right, (p.x - self.max.x).abs()),
            (Side::Bottom, (p.y - self.min.y).abs()),
            (Side::Left, (p.x - self.min.x).abs()),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 10.0))
    }

    #[test]
    fn test_from_points() {
        let b = BoundingBox::from_points([
            DVec2::new(1.0, 5.0),
            DVec2::new(-2.0, 3.0),
            DVec2::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!(b.min, DVec2::new(-2.0, -1.0));
        assert_eq!(b.max, DVec2::new(4.0, 5.0));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_contains_strictly() {
        let b = unit_box();
        assert!(b.contains_strictly(DVec2::new(5.0, 5.0), 1e-9));
        assert!(!b.contains_strictly(DVec2::new(0.0, 5.0), 1e-9));
        assert!(b.contains(DVec2::new(0.0, 5.0)));
        assert!(b.on_boundary(DVec2::new(0.0, 5.0)));
        assert!(!b.on_boundary(DVec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_ray_exit() {
        let b = unit_box();
        let exit = b.ray_exit(DVec2::new(5.0, 5.0), DVec2::new(1.0, 1.0)).unwrap();
        assert_abs_diff_eq!(exit.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(exit.y, 10.0, epsilon = 1e-12);

        let exit = b.ray_exit(DVec2::new(2.0, 5.0), DVec2::new(-3.0, 1.0)).unwrap();
        assert_eq!(exit.x, 0.0);
        assert_abs_diff_eq!(exit.y, 5.0 + 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ray_from_boundary_point() {
        let b = unit_box();
        let exit = b.ray_exit(DVec2::new(0.0, 5.0), DVec2::new(1.0, 0.0)).unwrap();
        assert_eq!(exit, DVec2::new(10.0, 5.0));
    }

    #[test]
    fn test_ray_from_outside_misses() {
        let b = unit_box();
        assert!(b.ray_exit(DVec2::new(20.0, 5.0), DVec2::new(1.0, 0.0)).is_none());
        assert!(b.ray_exit(DVec2::new(5.0, 5.0), DVec2::ZERO).is_none());
    }

    #[test]
    fn test_clip_line() {
        let b = unit_box();
        let (a, c) = b.clip_line(DVec2::new(3.0, 100.0), DVec2::new(0.0, -1.0)).unwrap();
        assert_eq!(a, DVec2::new(3.0, 10.0));
        assert_eq!(c, DVec2::new(3.0, 0.0));
        assert!(b.clip_line(DVec2::new(-1.0, 0.0), DVec2::new(0.0, 1.0)).is_none());
    }

    #[test]
    fn test_clip_segment() {
        let b = unit_box();
        let (a, c) = b
            .clip_segment(DVec2::new(-5.0, 5.0), DVec2::new(5.0, 5.0))
            .unwrap();
        assert_abs_diff_eq!(a.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.x, 5.0, epsilon = 1e-12);
        assert!(b
            .clip_segment(DVec2::new(-5.0, -5.0), DVec2::new(-1.0, 20.0))
            .is_none());
    }

    #[test]
    fn test_perimeter_key_is_clockwise() {
        let b = unit_box();
        let keys: Vec<f64> = [
            DVec2::new(0.0, 10.0),
            DVec2::new(4.0, 10.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(10.0, 3.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 7.0),
        ]
        .iter()
        .map(|p| b.perimeter_key(*p))
        .collect();
        assert_eq!(keys, vec![0.0, 4.0, 10.0, 17.0, 20.0, 28.0, 30.0, 37.0]);
    }

    #[test]
    fn test_corners_clockwise() {
        let corners = unit_box().corners();
        assert_eq!(corners[0], DVec2::new(0.0, 10.0));
        assert_eq!(corners[1], DVec2::new(10.0, 10.0));
        assert_eq!(corners[2], DVec2::new(10.0, 0.0));
        assert_eq!(corners[3], DVec2::new(0.0, 0.0));
    }

    #[test]
    fn test_clip_polygon() {
        let b = unit_box();
        // Clockwise square overhanging the right side
        let square = [
            DVec2::new(5.0, 8.0),
            DVec2::new(15.0, 8.0),
            DVec2::new(15.0, 2.0),
            DVec2::new(5.0, 2.0),
        ];
        let clipped = b.clip_polygon(&square);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|&p| b.contains(p)));
        assert!(clipped.contains(&DVec2::new(10.0, 8.0)));
        assert!(clipped.contains(&DVec2::new(10.0, 2.0)));

        let outside = [
            DVec2::new(20.0, 1.0),
            DVec2::new(25.0, 1.0),
            DVec2::new(22.0, -3.0),
        ];
        assert!(b.clip_polygon(&outside).is_empty());
        assert_eq!(b.clip_polygon(&b.corners()), b.corners().to_vec());
    }
}
