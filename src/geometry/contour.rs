use crate::geometry::{Bounds, EdgeColor, EdgeSegment};
use crate::math::{cross, normalize, sign, Point2};

/// A closed loop of edges, where each edge ends where the next one starts.
///
/// Continuity is checked by [`Shape::validate`](crate::geometry::Shape::validate),
/// not enforced on construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub edges: Vec<EdgeSegment>,
}

impl Contour {
    /// Creates an empty contour.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a contour from a list of edges.
    #[must_use]
    pub fn from_edges(edges: Vec<EdgeSegment>) -> Self {
        Self { edges }
    }

    /// Creates a closed polygon of linear edges through `points`.
    #[must_use]
    pub fn polygon(points: &[Point2]) -> Self {
        let n = points.len();
        let edges = (0..n)
            .map(|i| EdgeSegment::linear(points[i], points[(i + 1) % n], EdgeColor::WHITE))
            .collect();
        Self { edges }
    }

    /// Appends an edge.
    pub fn add_edge(&mut self, edge: EdgeSegment) {
        self.edges.push(edge);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Expands `bounds` to include every edge.
    pub fn bound(&self, bounds: &mut Bounds) {
        for edge in &self.edges {
            edge.bound(bounds);
        }
    }

    /// Expands `bounds` to include the miter points of corners that bulge
    /// outward on the side given by `polarity`, for a stroke of half-width
    /// `border`.
    pub fn bound_miters(&self, bounds: &mut Bounds, border: f64, miter_limit: f64, polarity: i32) {
        let Some(last) = self.edges.last() else {
            return;
        };
        let mut prev_dir = normalize(&last.direction(1.0), true);
        for edge in &self.edges {
            let dir = -normalize(&edge.direction(0.0), true);
            if f64::from(polarity) * cross(&prev_dir, &dir) >= 0.0 {
                let mut miter_length = miter_limit;
                let q = 0.5 * (1.0 - prev_dir.dot(&dir));
                if q > 0.0 {
                    miter_length = (1.0 / q.sqrt()).min(miter_limit);
                }
                let miter = edge.point(0.0) + normalize(&(prev_dir + dir), true) * (border * miter_length);
                bounds.include(miter);
            }
            prev_dir = normalize(&edge.direction(1.0), true);
        }
    }

    /// Returns the orientation of the contour: `1` for counter-clockwise,
    /// `-1` for clockwise and `0` for an empty or zero-area loop.
    ///
    /// Contours with one or two edges are sampled at interior points, as their
    /// endpoints alone do not enclose an area.
    #[must_use]
    pub fn winding(&self) -> i32 {
        let area_sign = |points: &[Point2]| {
            let n = points.len();
            let total: f64 = (0..n)
                .map(|i| cross(&points[i], &points[(i + 1) % n]))
                .sum();
            sign(total)
        };
        match self.edges.as_slice() {
            [] => 0,
            [edge] => area_sign(&[edge.point(0.0), edge.point(1.0 / 3.0), edge.point(2.0 / 3.0)]),
            [a, b] => area_sign(&[a.point(0.0), a.point(0.5), b.point(0.0), b.point(0.5)]),
            edges => {
                let points: Vec<Point2> = edges.iter().map(|e| e.point(0.0)).collect();
                area_sign(&points)
            }
        }
    }

    /// Reverses the traversal direction of the contour.
    pub fn reverse(&mut self) {
        self.edges.reverse();
        for edge in &mut self.edges {
            edge.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Contour {
        Contour::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn counter_clockwise_square_is_positive() {
        let mut square = unit_square();
        assert_eq!(square.winding(), 1);
        square.reverse();
        assert_eq!(square.winding(), -1);
        assert_eq!(square.edges[0].start_point(), Point2::new(0.0, 1.0));
        assert_eq!(square.edges[0].end_point(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn winding_of_two_edge_lens() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        let lens = Contour::from_edges(vec![
            EdgeSegment::quadratic(a, Point2::new(1.0, -1.0), b, EdgeColor::WHITE),
            EdgeSegment::quadratic(b, Point2::new(1.0, 1.0), a, EdgeColor::WHITE),
        ]);
        assert_eq!(lens.winding(), 1);
    }

    #[test]
    fn winding_of_single_cubic_loop() {
        let p = Point2::new(0.0, 0.0);
        let teardrop = Contour::from_edges(vec![EdgeSegment::cubic(
            p,
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            p,
            EdgeColor::WHITE,
        )]);
        assert_eq!(teardrop.winding(), 1);
    }

    #[test]
    fn empty_contour_has_no_winding() {
        assert_eq!(Contour::new().winding(), 0);
    }

    #[test]
    fn miters_extend_convex_corners() {
        let square = unit_square();
        let mut bounds = Bounds::empty();
        square.bound(&mut bounds);
        square.bound_miters(&mut bounds, 1.0, 2.0, -1);
        assert!(bounds.l < -0.9 && bounds.r > 1.9);
        assert!(bounds.b < -0.9 && bounds.t > 1.9);
    }
}
