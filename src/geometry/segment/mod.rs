mod cubic;
mod linear;
mod quadratic;

pub use cubic::CubicSegment;
pub use linear::LinearSegment;
pub use quadratic::QuadraticSegment;

use crate::geometry::{Bounds, EdgeColor, SignedDistance};
use crate::math::{cross, normalize, Point2, Vector2};

/// Common interface for Bezier edge segments of any order.
pub trait Segment: Sized {
    /// Evaluates the curve at parameter `t`.
    fn point(&self, t: f64) -> Point2;

    /// Returns the (unnormalized) tangent at parameter `t`.
    ///
    /// At the endpoints, a zero tangent is replaced by the chord to the next
    /// distinct control point.
    fn direction(&self, t: f64) -> Vector2;

    /// Returns the change of direction (second derivative, up to scale) at `t`.
    fn direction_change(&self, t: f64) -> Vector2;

    /// Returns the signed distance from `origin` to the curve and the curve
    /// parameter of the closest point, which may lie outside `[0, 1]` when an
    /// endpoint is closest.
    fn signed_distance(&self, origin: Point2) -> (SignedDistance, f64);

    /// Intersects the curve with the horizontal line at `y`.
    fn scanline_intersections(&self, y: f64) -> ScanlineIntersections;

    /// Expands `bounds` to the curve's extent.
    fn bound(&self, bounds: &mut Bounds);

    /// Reverses the curve's direction.
    fn reverse(&mut self);

    /// Moves the start point, dragging the adjacent control point along.
    fn move_start_point(&mut self, to: Point2);

    /// Moves the end point, dragging the adjacent control point along.
    fn move_end_point(&mut self, to: Point2);

    /// Splits the curve into three parts at `t = 1/3` and `t = 2/3`.
    fn split_in_thirds(&self) -> [Self; 3];
}

/// Up to three crossings of an edge with a horizontal line.
///
/// Each crossing carries its x coordinate and the vertical direction of the
/// edge there (`1` upward, `-1` downward).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanlineIntersections {
    x: [f64; 3],
    dy: [i32; 3],
    len: usize,
}

impl ScanlineIntersections {
    pub(crate) fn from_parts(x: [f64; 3], dy: [i32; 3], len: usize) -> Self {
        Self {
            x,
            dy,
            len: len.min(3),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates `(x, dy)` pairs in the order the curve crosses the line.
    pub fn iter(&self) -> impl Iterator<Item = (f64, i32)> + '_ {
        self.x[..self.len]
            .iter()
            .copied()
            .zip(self.dy[..self.len].iter().copied())
    }
}

/// An edge of a contour: a linear, quadratic or cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeSegment {
    Linear(LinearSegment),
    Quadratic(QuadraticSegment),
    Cubic(CubicSegment),
}

macro_rules! dispatch {
    ($self:expr, $edge:ident => $body:expr) => {
        match $self {
            EdgeSegment::Linear($edge) => $body,
            EdgeSegment::Quadratic($edge) => $body,
            EdgeSegment::Cubic($edge) => $body,
        }
    };
}

impl EdgeSegment {
    #[must_use]
    pub fn linear(p0: Point2, p1: Point2, color: EdgeColor) -> Self {
        Self::Linear(LinearSegment::new(p0, p1, color))
    }

    #[must_use]
    pub fn quadratic(p0: Point2, p1: Point2, p2: Point2, color: EdgeColor) -> Self {
        Self::Quadratic(QuadraticSegment::new(p0, p1, p2, color))
    }

    #[must_use]
    pub fn cubic(p0: Point2, p1: Point2, p2: Point2, p3: Point2, color: EdgeColor) -> Self {
        Self::Cubic(CubicSegment::new(p0, p1, p2, p3, color))
    }

    #[must_use]
    pub fn color(&self) -> EdgeColor {
        dispatch!(self, e => e.color)
    }

    pub fn set_color(&mut self, color: EdgeColor) {
        dispatch!(self, e => e.color = color);
    }

    /// Returns a copy with a different color.
    #[must_use]
    pub fn with_color(mut self, color: EdgeColor) -> Self {
        self.set_color(color);
        self
    }

    /// Returns the Bezier order: 1 for linear, 2 for quadratic, 3 for cubic.
    #[must_use]
    pub fn order(&self) -> usize {
        match self {
            Self::Linear(_) => 1,
            Self::Quadratic(_) => 2,
            Self::Cubic(_) => 3,
        }
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point2] {
        dispatch!(self, e => &e.p[..])
    }

    pub fn control_points_mut(&mut self) -> &mut [Point2] {
        dispatch!(self, e => &mut e.p[..])
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.control_points()[0]
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.control_points()[self.order()]
    }

    #[must_use]
    pub fn point(&self, t: f64) -> Point2 {
        dispatch!(self, e => e.point(t))
    }

    #[must_use]
    pub fn direction(&self, t: f64) -> Vector2 {
        dispatch!(self, e => e.direction(t))
    }

    #[must_use]
    pub fn direction_change(&self, t: f64) -> Vector2 {
        dispatch!(self, e => e.direction_change(t))
    }

    #[must_use]
    pub fn signed_distance(&self, origin: Point2) -> (SignedDistance, f64) {
        dispatch!(self, e => e.signed_distance(origin))
    }

    #[must_use]
    pub fn scanline_intersections(&self, y: f64) -> ScanlineIntersections {
        dispatch!(self, e => e.scanline_intersections(y))
    }

    pub fn bound(&self, bounds: &mut Bounds) {
        dispatch!(self, e => e.bound(bounds));
    }

    pub fn reverse(&mut self) {
        dispatch!(self, e => e.reverse());
    }

    pub fn move_start_point(&mut self, to: Point2) {
        dispatch!(self, e => e.move_start_point(to));
    }

    pub fn move_end_point(&mut self, to: Point2) {
        dispatch!(self, e => e.move_end_point(to));
    }

    #[must_use]
    pub fn split_in_thirds(&self) -> [EdgeSegment; 3] {
        match self {
            Self::Linear(e) => e.split_in_thirds().map(Self::Linear),
            Self::Quadratic(e) => e.split_in_thirds().map(Self::Quadratic),
            Self::Cubic(e) => e.split_in_thirds().map(Self::Cubic),
        }
    }

    /// Elevates a quadratic edge to an equivalent cubic. Other orders are
    /// returned unchanged.
    #[must_use]
    pub fn convert_to_cubic(&self) -> Self {
        match self {
            Self::Quadratic(e) => Self::Cubic(e.to_cubic()),
            other => *other,
        }
    }

    /// Replaces an endpoint distance by the perpendicular distance to the
    /// edge's tangent line extended beyond that endpoint, if it is not larger.
    pub fn distance_to_perpendicular_distance(
        &self,
        distance: &mut SignedDistance,
        origin: Point2,
        param: f64,
    ) {
        if param < 0.0 {
            let dir = normalize(&self.direction(0.0), false);
            let aq = origin - self.point(0.0);
            if aq.dot(&dir) < 0.0 {
                let perpendicular_distance = cross(&aq, &dir);
                if perpendicular_distance.abs() <= distance.distance.abs() {
                    *distance = SignedDistance::new(perpendicular_distance, 0.0);
                }
            }
        } else if param > 1.0 {
            let dir = normalize(&self.direction(1.0), false);
            let bq = origin - self.point(1.0);
            if bq.dot(&dir) > 0.0 {
                let perpendicular_distance = cross(&bq, &dir);
                if perpendicular_distance.abs() <= distance.distance.abs() {
                    *distance = SignedDistance::new(perpendicular_distance, 0.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dispatch_reaches_variants() {
        let edge = EdgeSegment::quadratic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
            EdgeColor::CYAN,
        );
        assert_eq!(edge.order(), 2);
        assert_eq!(edge.color(), EdgeColor::CYAN);
        assert_eq!(edge.end_point(), Point2::new(2.0, 0.0));
        assert_eq!(edge.with_color(EdgeColor::RED).color(), EdgeColor::RED);
    }

    #[test]
    fn cubic_conversion_preserves_shape() {
        let edge = EdgeSegment::quadratic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, 0.0),
            EdgeColor::WHITE,
        );
        let cubic = edge.convert_to_cubic();
        assert_eq!(cubic.order(), 3);
        for i in 0..=8 {
            let t = f64::from(i) / 8.0;
            assert_abs_diff_eq!((cubic.point(t) - edge.point(t)).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn perpendicular_extension_past_end() {
        let edge = EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), EdgeColor::WHITE);
        let origin = Point2::new(3.0, 1.0);
        let (mut d, param) = edge.signed_distance(origin);
        assert!(param > 1.0);
        edge.distance_to_perpendicular_distance(&mut d, origin, param);
        assert_abs_diff_eq!(d.distance, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.dot, 0.0);
    }

    #[test]
    fn perpendicular_extension_before_start() {
        let edge = EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), EdgeColor::WHITE);
        let origin = Point2::new(-2.0, -0.5);
        let (mut d, param) = edge.signed_distance(origin);
        assert!(param < 0.0);
        edge.distance_to_perpendicular_distance(&mut d, origin, param);
        assert_abs_diff_eq!(d.distance, 0.5, epsilon = 1e-12);
    }
}
