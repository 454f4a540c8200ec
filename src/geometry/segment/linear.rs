use crate::geometry::{Bounds, EdgeColor, SignedDistance};
use crate::math::{cross, mix, non_zero_sign, normalize, orthonormal, sign, Point2, Vector2};

use super::{ScanlineIntersections, Segment};

/// A straight edge from `p[0]` to `p[1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSegment {
    pub p: [Point2; 2],
    pub color: EdgeColor,
}

impl LinearSegment {
    /// Creates a new linear segment.
    #[must_use]
    pub fn new(p0: Point2, p1: Point2, color: EdgeColor) -> Self {
        Self {
            p: [p0, p1],
            color,
        }
    }
}

impl Segment for LinearSegment {
    fn point(&self, t: f64) -> Point2 {
        mix(self.p[0], self.p[1], t)
    }

    fn direction(&self, _t: f64) -> Vector2 {
        self.p[1] - self.p[0]
    }

    fn direction_change(&self, _t: f64) -> Vector2 {
        Vector2::zeros()
    }

    fn signed_distance(&self, origin: Point2) -> (SignedDistance, f64) {
        let aq = origin - self.p[0];
        let ab = self.p[1] - self.p[0];
        let ab_len_sq = ab.dot(&ab);
        let param = if ab_len_sq == 0.0 {
            0.0
        } else {
            aq.dot(&ab) / ab_len_sq
        };
        let eq = self.p[usize::from(param > 0.5)] - origin;
        let endpoint_distance = eq.norm();
        if param > 0.0 && param < 1.0 {
            let ortho_distance = orthonormal(&ab, false, false).dot(&aq);
            if ortho_distance.abs() < endpoint_distance {
                return (SignedDistance::new(ortho_distance, 0.0), param);
            }
        }
        let dot = normalize(&ab, false).dot(&normalize(&eq, false)).abs();
        (
            SignedDistance::new(non_zero_sign(cross(&aq, &ab)) * endpoint_distance, dot),
            param,
        )
    }

    fn scanline_intersections(&self, y: f64) -> ScanlineIntersections {
        let [p0, p1] = self.p;
        if (y >= p0.y && y < p1.y) || (y >= p1.y && y < p0.y) {
            let param = (y - p0.y) / (p1.y - p0.y);
            return ScanlineIntersections::from_parts(
                [mix(p0.x, p1.x, param), 0.0, 0.0],
                [sign(p1.y - p0.y), 0, 0],
                1,
            );
        }
        ScanlineIntersections::default()
    }

    fn bound(&self, bounds: &mut Bounds) {
        bounds.include(self.p[0]);
        bounds.include(self.p[1]);
    }

    fn reverse(&mut self) {
        self.p.swap(0, 1);
    }

    fn move_start_point(&mut self, to: Point2) {
        self.p[0] = to;
    }

    fn move_end_point(&mut self, to: Point2) {
        self.p[1] = to;
    }

    fn split_in_thirds(&self) -> [Self; 3] {
        let a = self.point(1.0 / 3.0);
        let b = self.point(2.0 / 3.0);
        [
            Self::new(self.p[0], a, self.color),
            Self::new(a, b, self.color),
            Self::new(b, self.p[1], self.color),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn segment() -> LinearSegment {
        LinearSegment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), EdgeColor::WHITE)
    }

    #[test]
    fn interior_distance_is_perpendicular() {
        let (d, param) = segment().signed_distance(Point2::new(1.0, 1.0));
        assert_abs_diff_eq!(d.distance, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.dot, 0.0);
        assert_abs_diff_eq!(param, 0.5, epsilon = 1e-12);

        let (below, _) = segment().signed_distance(Point2::new(1.0, -1.0));
        assert_abs_diff_eq!(below.distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn outside_range_uses_endpoint_distance() {
        let (d, param) = segment().signed_distance(Point2::new(-3.0, 4.0));
        assert!(param < 0.0);
        assert_abs_diff_eq!(d.distance.abs(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.dot, 0.6, epsilon = 1e-12);

        let (d, param) = segment().signed_distance(Point2::new(5.0, 0.0));
        assert!(param > 1.0);
        assert_abs_diff_eq!(d.distance.abs(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_cross_product_still_has_sign() {
        let (d, _) = segment().signed_distance(Point2::new(-1.0, 0.0));
        assert_abs_diff_eq!(d.distance.abs(), 1.0, epsilon = 1e-12);
        assert!(d.distance != 0.0);
    }

    #[test]
    fn degenerate_segment_has_finite_param() {
        let p = Point2::new(1.0, 1.0);
        let (d, param) = LinearSegment::new(p, p, EdgeColor::WHITE).signed_distance(Point2::new(4.0, 5.0));
        assert!(param.is_finite());
        assert_abs_diff_eq!(d.distance.abs(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn scanline_half_open() {
        let edge = LinearSegment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0), EdgeColor::WHITE);
        let hits = edge.scanline_intersections(1.0);
        assert_eq!(hits.len(), 1);
        let (x, dy) = hits.iter().next().unwrap_or_default();
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-12);
        assert_eq!(dy, 1);
        assert!(edge.scanline_intersections(2.0).is_empty());
        assert_eq!(edge.scanline_intersections(0.0).len(), 1);
    }
}
