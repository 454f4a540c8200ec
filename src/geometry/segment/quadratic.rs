use crate::geometry::{Bounds, EdgeColor, SignedDistance};
use crate::math::{cross, is_zero, mix, non_zero_sign, normalize, solve_cubic, solve_quadratic, Point2, Vector2};

use super::{CubicSegment, ScanlineIntersections, Segment};

/// A quadratic Bezier edge with control points `p[0..3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticSegment {
    pub p: [Point2; 3],
    pub color: EdgeColor,
}

impl QuadraticSegment {
    /// Creates a new quadratic segment.
    ///
    /// A control point coinciding with either endpoint is moved to the chord
    /// midpoint so the end tangents stay defined.
    #[must_use]
    pub fn new(p0: Point2, mut p1: Point2, p2: Point2, color: EdgeColor) -> Self {
        if p1 == p0 || p1 == p2 {
            p1 = (p0 + p2) * 0.5;
        }
        Self {
            p: [p0, p1, p2],
            color,
        }
    }

    /// Returns the exact cubic elevation of this curve.
    #[must_use]
    pub fn to_cubic(&self) -> CubicSegment {
        let [p0, p1, p2] = self.p;
        CubicSegment::new(p0, mix(p0, p1, 2.0 / 3.0), mix(p1, p2, 1.0 / 3.0), p2, self.color)
    }
}

impl Segment for QuadraticSegment {
    fn point(&self, t: f64) -> Point2 {
        let [p0, p1, p2] = self.p;
        mix(mix(p0, p1, t), mix(p1, p2, t), t)
    }

    fn direction(&self, t: f64) -> Vector2 {
        let [p0, p1, p2] = self.p;
        let tangent = mix(p1 - p0, p2 - p1, t);
        if is_zero(&tangent) {
            return p2 - p0;
        }
        tangent
    }

    fn direction_change(&self, _t: f64) -> Vector2 {
        let [p0, p1, p2] = self.p;
        (p2 - p1) - (p1 - p0)
    }

    fn signed_distance(&self, origin: Point2) -> (SignedDistance, f64) {
        let [p0, p1, p2] = self.p;
        let qa = p0 - origin;
        let ab = p1 - p0;
        let br = p2 - p1 - ab;
        let a = br.dot(&br);
        let b = 3.0 * ab.dot(&br);
        let c = 2.0 * ab.dot(&ab) + qa.dot(&br);
        let d = qa.dot(&ab);
        let roots = solve_cubic(a, b, c, d);

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(cross(&ep_dir, &qa)) * qa.norm();
        let mut param = -qa.dot(&ep_dir) / ep_dir.dot(&ep_dir);
        let distance = (p2 - origin).norm();
        if distance < min_distance.abs() {
            ep_dir = self.direction(1.0);
            min_distance = non_zero_sign(cross(&ep_dir, &(p2 - origin))) * distance;
            param = (origin - p1).dot(&ep_dir) / ep_dir.dot(&ep_dir);
        }
        for &t in roots.as_slice() {
            if t > 0.0 && t < 1.0 {
                let qe = qa + ab * (2.0 * t) + br * (t * t);
                let distance = qe.norm();
                if distance <= min_distance.abs() {
                    min_distance = non_zero_sign(cross(&(ab + br * t), &qe)) * distance;
                    param = t;
                }
            }
        }

        if (0.0..=1.0).contains(&param) {
            return (SignedDistance::new(min_distance, 0.0), param);
        }
        let dot = if param < 0.5 {
            normalize(&self.direction(0.0), false)
                .dot(&normalize(&qa, false))
                .abs()
        } else {
            normalize(&self.direction(1.0), false)
                .dot(&normalize(&(p2 - origin), false))
                .abs()
        };
        (SignedDistance::new(min_distance, dot), param)
    }

    #[allow(clippy::float_cmp)]
    fn scanline_intersections(&self, y: f64) -> ScanlineIntersections {
        let [p0, p1, p2] = self.p;
        let mut x = [0.0; 3];
        let mut dy = [0; 3];
        let mut total = 0;
        let mut next_dy = if y > p0.y { 1 } else { -1 };
        x[total] = p0.x;
        if p0.y == y {
            if p0.y < p1.y || (p0.y == p1.y && p0.y < p2.y) {
                dy[total] = 1;
                total += 1;
            } else {
                next_dy = 1;
            }
        }
        {
            let ab = p1 - p0;
            let br = p2 - p1 - ab;
            let roots = solve_quadratic(br.y, 2.0 * ab.y, p0.y - y).sorted();
            for &t in roots.as_slice() {
                if total >= 2 {
                    break;
                }
                if (0.0..=1.0).contains(&t) {
                    x[total] = p0.x + 2.0 * t * ab.x + t * t * br.x;
                    if f64::from(next_dy) * (ab.y + t * br.y) >= 0.0 {
                        dy[total] = next_dy;
                        total += 1;
                        next_dy = -next_dy;
                    }
                }
            }
        }
        if p2.y == y {
            if next_dy > 0 && total > 0 {
                total -= 1;
                next_dy = -1;
            }
            if (p2.y < p1.y || (p2.y == p1.y && p2.y < p0.y)) && total < 2 {
                x[total] = p2.x;
                if next_dy < 0 {
                    dy[total] = -1;
                    total += 1;
                    next_dy = 1;
                }
            }
        }
        if next_dy != if y >= p2.y { 1 } else { -1 } {
            if total > 0 {
                total -= 1;
            } else {
                if (p2.y - y).abs() < (p0.y - y).abs() {
                    x[total] = p2.x;
                }
                dy[total] = next_dy;
                total += 1;
            }
        }
        ScanlineIntersections::from_parts(x, dy, total)
    }

    fn bound(&self, bounds: &mut Bounds) {
        let [p0, p1, p2] = self.p;
        bounds.include(p0);
        bounds.include(p2);
        let bot = (p1 - p0) - (p2 - p1);
        if bot.x != 0.0 {
            let param = (p1.x - p0.x) / bot.x;
            if param > 0.0 && param < 1.0 {
                bounds.include(self.point(param));
            }
        }
        if bot.y != 0.0 {
            let param = (p1.y - p0.y) / bot.y;
            if param > 0.0 && param < 1.0 {
                bounds.include(self.point(param));
            }
        }
    }

    fn reverse(&mut self) {
        self.p.swap(0, 2);
    }

    fn move_start_point(&mut self, to: Point2) {
        let [p0, p1, p2] = self.p;
        let orig_start_dir = p0 - p1;
        let denominator = cross(&(p0 - p1), &(p2 - p1));
        if denominator != 0.0 {
            self.p[1] += (p2 - p1) * (cross(&(p0 - p1), &(to - p0)) / denominator);
        }
        self.p[0] = to;
        if orig_start_dir.dot(&(self.p[0] - self.p[1])) < 0.0 {
            self.p[1] = p1;
        }
    }

    fn move_end_point(&mut self, to: Point2) {
        let [p0, p1, p2] = self.p;
        let orig_end_dir = p2 - p1;
        let denominator = cross(&(p2 - p1), &(p0 - p1));
        if denominator != 0.0 {
            self.p[1] += (p0 - p1) * (cross(&(p2 - p1), &(to - p2)) / denominator);
        }
        self.p[2] = to;
        if orig_end_dir.dot(&(self.p[2] - self.p[1])) < 0.0 {
            self.p[1] = p1;
        }
    }

    fn split_in_thirds(&self) -> [Self; 3] {
        let [p0, p1, p2] = self.p;
        let a = self.point(1.0 / 3.0);
        let b = self.point(2.0 / 3.0);
        let color = self.color;
        [
            Self { p: [p0, mix(p0, p1, 1.0 / 3.0), a], color },
            Self {
                p: [a, mix(mix(p0, p1, 5.0 / 9.0), mix(p1, p2, 4.0 / 9.0), 0.5), b],
                color,
            },
            Self { p: [b, mix(p1, p2, 2.0 / 3.0), p2], color },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn arch() -> QuadraticSegment {
        QuadraticSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, 0.0),
            EdgeColor::WHITE,
        )
    }

    fn brute_force_distance(edge: &QuadraticSegment, origin: Point2) -> f64 {
        (0..=20_000)
            .map(|i| (edge.point(f64::from(i) / 20_000.0) - origin).norm())
            .fold(f64::MAX, f64::min)
    }

    #[test]
    fn coincident_control_point_is_moved_to_midpoint() {
        let q = QuadraticSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            EdgeColor::WHITE,
        );
        assert_eq!(q.p[1], Point2::new(1.0, 1.0));
    }

    #[test]
    fn interior_distance_matches_nearest_point() {
        let edge = arch();
        for origin in [Point2::new(1.0, 3.0), Point2::new(0.3, 0.2), Point2::new(1.7, -0.5)] {
            let (d, param) = edge.signed_distance(origin);
            let expected = brute_force_distance(&edge, origin);
            assert_abs_diff_eq!(d.distance.abs(), expected, epsilon = 1e-6);
            if (0.0..=1.0).contains(&param) {
                assert_abs_diff_eq!((edge.point(param) - origin).norm(), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn exterior_distance_uses_endpoint() {
        let edge = arch();
        let origin = Point2::new(-2.0, -1.0);
        let (d, param) = edge.signed_distance(origin);
        assert!(param < 0.0);
        assert_abs_diff_eq!(d.distance.abs(), (edge.p[0] - origin).norm(), epsilon = 1e-9);
    }

    #[test]
    fn split_reproduces_curve() {
        let edge = arch();
        let parts = edge.split_in_thirds();
        for (i, part) in parts.iter().enumerate() {
            for k in 0..=4 {
                let s = f64::from(k) / 4.0;
                #[allow(clippy::cast_precision_loss)]
                let t = (i as f64 + s) / 3.0;
                let a = part.point(s);
                let b = edge.point(t);
                assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
                assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cubic_elevation_is_exact() {
        let edge = arch();
        let cubic = edge.to_cubic();
        for k in 0..=8 {
            let t = f64::from(k) / 8.0;
            let a = cubic.point(t);
            let b = edge.point(t);
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn bounds_include_extremum() {
        let mut bounds = Bounds::empty();
        arch().bound(&mut bounds);
        assert_abs_diff_eq!(bounds.t, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.r, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn scanline_crosses_arch_twice() {
        let hits = arch().scanline_intersections(0.5);
        assert_eq!(hits.len(), 2);
        let dirs: Vec<i32> = hits.iter().map(|(_, dy)| dy).collect();
        assert_eq!(dirs, vec![1, -1]);
    }
}
