use crate::geometry::{Bounds, EdgeColor, SignedDistance};
use crate::math::{cross, is_zero, mix, non_zero_sign, normalize, solve_cubic, solve_quadratic, Point2, Vector2};

use super::{ScanlineIntersections, Segment};

/// Number of evenly spaced intervals whose boundaries seed the closest-point search.
const SEARCH_STARTS: u32 = 4;

/// Maximum Newton steps per seed.
const SEARCH_STEPS: u32 = 4;

/// A cubic Bezier edge with control points `p[0..4]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub p: [Point2; 4],
    pub color: EdgeColor,
}

impl CubicSegment {
    /// Creates a new cubic segment.
    ///
    /// If both inner control points coincide with endpoints, they are moved to
    /// the chord thirds so the curve keeps a defined direction.
    #[must_use]
    pub fn new(p0: Point2, mut p1: Point2, mut p2: Point2, p3: Point2, color: EdgeColor) -> Self {
        if (p1 == p0 || p1 == p3) && (p2 == p0 || p2 == p3) {
            p1 = mix(p0, p3, 1.0 / 3.0);
            p2 = mix(p0, p3, 2.0 / 3.0);
        }
        Self {
            p: [p0, p1, p2, p3],
            color,
        }
    }
}

impl Segment for CubicSegment {
    fn point(&self, t: f64) -> Point2 {
        let [p0, p1, p2, p3] = self.p;
        let p12 = mix(p1, p2, t);
        mix(
            mix(mix(p0, p1, t), p12, t),
            mix(p12, mix(p2, p3, t), t),
            t,
        )
    }

    #[allow(clippy::float_cmp)]
    fn direction(&self, t: f64) -> Vector2 {
        let [p0, p1, p2, p3] = self.p;
        let tangent = mix(mix(p1 - p0, p2 - p1, t), mix(p2 - p1, p3 - p2, t), t);
        if is_zero(&tangent) {
            if t == 0.0 {
                return p2 - p0;
            }
            if t == 1.0 {
                return p3 - p1;
            }
        }
        tangent
    }

    fn direction_change(&self, t: f64) -> Vector2 {
        let [p0, p1, p2, p3] = self.p;
        mix((p2 - p1) - (p1 - p0), (p3 - p2) - (p2 - p1), t)
    }

    fn signed_distance(&self, origin: Point2) -> (SignedDistance, f64) {
        let [p0, p1, p2, p3] = self.p;
        let qa = p0 - origin;
        let ab = p1 - p0;
        let br = p2 - p1 - ab;
        let as_ = (p3 - p2) - (p2 - p1) - br;

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(cross(&ep_dir, &qa)) * qa.norm();
        let mut param = -qa.dot(&ep_dir) / ep_dir.dot(&ep_dir);
        let distance = (p3 - origin).norm();
        if distance < min_distance.abs() {
            ep_dir = self.direction(1.0);
            min_distance = non_zero_sign(cross(&ep_dir, &(p3 - origin))) * distance;
            param = (ep_dir - (p3 - origin)).dot(&ep_dir) / ep_dir.dot(&ep_dir);
        }

        let offset = |t: f64| qa + ab * (3.0 * t) + br * (3.0 * t * t) + as_ * (t * t * t);
        let first_derivative = |t: f64| ab * 3.0 + br * (6.0 * t) + as_ * (3.0 * t * t);
        let second_derivative = |t: f64| br * 6.0 + as_ * (6.0 * t);
        let newton_step = |t: f64, qe: &Vector2, d1: &Vector2| {
            t - qe.dot(d1) / (d1.dot(d1) + qe.dot(&second_derivative(t)))
        };

        for i in 0..=SEARCH_STARTS {
            let mut t = f64::from(i) / f64::from(SEARCH_STARTS);
            let mut qe = offset(t);
            let mut d1 = first_derivative(t);
            let mut improved_t = newton_step(t, &qe, &d1);
            if improved_t > 0.0 && improved_t < 1.0 {
                let mut remaining_steps = SEARCH_STEPS;
                loop {
                    t = improved_t;
                    qe = offset(t);
                    d1 = first_derivative(t);
                    remaining_steps -= 1;
                    if remaining_steps == 0 {
                        break;
                    }
                    improved_t = newton_step(t, &qe, &d1);
                    if !(improved_t > 0.0 && improved_t < 1.0) {
                        break;
                    }
                }
                let distance = qe.norm();
                if distance < min_distance.abs() {
                    min_distance = non_zero_sign(cross(&d1, &qe)) * distance;
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
                .dot(&normalize(&(p3 - origin), false))
                .abs()
        };
        (SignedDistance::new(min_distance, dot), param)
    }

    #[allow(clippy::float_cmp)]
    fn scanline_intersections(&self, y: f64) -> ScanlineIntersections {
        let [p0, p1, p2, p3] = self.p;
        let mut x = [0.0; 3];
        let mut dy = [0; 3];
        let mut total = 0;
        let mut next_dy = if y > p0.y { 1 } else { -1 };
        x[total] = p0.x;
        if p0.y == y {
            if p0.y < p1.y
                || (p0.y == p1.y && (p0.y < p2.y || (p0.y == p2.y && p0.y < p3.y)))
            {
                dy[total] = 1;
                total += 1;
            } else {
                next_dy = 1;
            }
        }
        {
            let ab = p1 - p0;
            let br = p2 - p1 - ab;
            let as_ = (p3 - p2) - (p2 - p1) - br;
            let roots = solve_cubic(as_.y, 3.0 * br.y, 3.0 * ab.y, p0.y - y).sorted();
            for &t in roots.as_slice() {
                if total >= 3 {
                    break;
                }
                if (0.0..=1.0).contains(&t) {
                    x[total] = p0.x + 3.0 * t * ab.x + 3.0 * t * t * br.x + t * t * t * as_.x;
                    if f64::from(next_dy) * (ab.y + 2.0 * t * br.y + t * t * as_.y) >= 0.0 {
                        dy[total] = next_dy;
                        total += 1;
                        next_dy = -next_dy;
                    }
                }
            }
        }
        if p3.y == y {
            if next_dy > 0 && total > 0 {
                total -= 1;
                next_dy = -1;
            }
            if (p3.y < p2.y
                || (p3.y == p2.y && (p3.y < p1.y || (p3.y == p1.y && p3.y < p0.y))))
                && total < 3
            {
                x[total] = p3.x;
                if next_dy < 0 {
                    dy[total] = -1;
                    total += 1;
                    next_dy = 1;
                }
            }
        }
        if next_dy != if y >= p3.y { 1 } else { -1 } {
            if total > 0 {
                total -= 1;
            } else {
                if (p3.y - y).abs() < (p0.y - y).abs() {
                    x[total] = p3.x;
                }
                dy[total] = next_dy;
                total += 1;
            }
        }
        ScanlineIntersections::from_parts(x, dy, total)
    }

    fn bound(&self, bounds: &mut Bounds) {
        let [p0, p1, p2, p3] = self.p;
        bounds.include(p0);
        bounds.include(p3);
        let a0 = p1 - p0;
        let a1 = (p2 - p1 - a0) * 2.0;
        let a2 = p3 - p2 * 3.0 + p1 * 3.0 - p0;
        for &t in solve_quadratic(a2.x, a1.x, a0.x).as_slice() {
            if t > 0.0 && t < 1.0 {
                bounds.include(self.point(t));
            }
        }
        for &t in solve_quadratic(a2.y, a1.y, a0.y).as_slice() {
            if t > 0.0 && t < 1.0 {
                bounds.include(self.point(t));
            }
        }
    }

    fn reverse(&mut self) {
        self.p.swap(0, 3);
        self.p.swap(1, 2);
    }

    fn move_start_point(&mut self, to: Point2) {
        self.p[1] += to - self.p[0];
        self.p[0] = to;
    }

    fn move_end_point(&mut self, to: Point2) {
        self.p[2] += to - self.p[3];
        self.p[3] = to;
    }

    fn split_in_thirds(&self) -> [Self; 3] {
        let [p0, p1, p2, p3] = self.p;
        let third = 1.0 / 3.0;
        let two_thirds = 2.0 / 3.0;
        let a = self.point(third);
        let b = self.point(two_thirds);
        let color = self.color;
        [
            Self {
                p: [
                    p0,
                    if p0 == p1 { p0 } else { mix(p0, p1, third) },
                    mix(mix(p0, p1, third), mix(p1, p2, third), third),
                    a,
                ],
                color,
            },
            Self {
                p: [
                    a,
                    mix(
                        mix(mix(p0, p1, third), mix(p1, p2, third), third),
                        mix(mix(p1, p2, third), mix(p2, p3, third), third),
                        two_thirds,
                    ),
                    mix(
                        mix(mix(p0, p1, two_thirds), mix(p1, p2, two_thirds), two_thirds),
                        mix(mix(p1, p2, two_thirds), mix(p2, p3, two_thirds), two_thirds),
                        third,
                    ),
                    b,
                ],
                color,
            },
            Self {
                p: [
                    b,
                    mix(mix(p1, p2, two_thirds), mix(p2, p3, two_thirds), two_thirds),
                    if p2 == p3 { p3 } else { mix(p2, p3, two_thirds) },
                    p3,
                ],
                color,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn s_curve() -> CubicSegment {
        CubicSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, -2.0),
            Point2::new(3.0, 0.0),
            EdgeColor::WHITE,
        )
    }

    fn brute_force_distance(edge: &CubicSegment, origin: Point2) -> f64 {
        (0..=20_000)
            .map(|i| (edge.point(f64::from(i) / 20_000.0) - origin).norm())
            .fold(f64::MAX, f64::min)
    }

    #[test]
    fn closest_point_matches_brute_force() {
        let edge = s_curve();
        for origin in [
            Point2::new(0.5, 1.5),
            Point2::new(1.5, 0.0),
            Point2::new(2.5, -1.0),
            Point2::new(1.0, -3.0),
        ] {
            let (d, param) = edge.signed_distance(origin);
            let expected = brute_force_distance(&edge, origin);
            assert_abs_diff_eq!(d.distance.abs(), expected, epsilon = 1e-6);
            if (0.0..=1.0).contains(&param) {
                assert_abs_diff_eq!((edge.point(param) - origin).norm(), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn beyond_end_reports_endpoint_distance() {
        let edge = s_curve();
        let origin = Point2::new(5.0, 0.5);
        let (d, param) = edge.signed_distance(origin);
        assert!(param > 1.0);
        assert_abs_diff_eq!(d.distance.abs(), (edge.p[3] - origin).norm(), epsilon = 1e-9);
        assert!(d.dot > 0.0);
    }

    #[test]
    fn degenerate_tangent_falls_back_to_chord() {
        let edge = CubicSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
            EdgeColor::WHITE,
        );
        assert_eq!(edge.direction(0.0), Vector2::new(1.0, 1.0));
    }

    #[test]
    fn split_reproduces_curve() {
        let edge = s_curve();
        let parts = edge.split_in_thirds();
        assert_eq!(parts[0].p[0], edge.p[0]);
        assert_eq!(parts[2].p[3], edge.p[3]);
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
    fn reverse_swaps_control_points() {
        let mut edge = s_curve();
        edge.reverse();
        assert_eq!(edge.p[0], Point2::new(3.0, 0.0));
        assert_eq!(edge.p[1], Point2::new(2.0, -2.0));
        let a = edge.point(0.25);
        let b = s_curve().point(0.75);
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
    }

    #[test]
    fn scanline_of_s_curve() {
        let hits = s_curve().scanline_intersections(0.1);
        let dy: Vec<i32> = hits.iter().map(|(_, dy)| dy).collect();
        assert_eq!(dy, vec![1, -1]);
        let hits = s_curve().scanline_intersections(-0.1);
        let dy: Vec<i32> = hits.iter().map(|(_, dy)| dy).collect();
        assert_eq!(dy, vec![-1, 1]);
    }
}
