use crate::distance::{ContourCombiner, EdgeSelector};
use crate::geometry::{Contour, Shape};
use crate::math::Point2;

type Cache<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::Cache;
type Distance<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::Distance;

/// Computes shape distances for a sequence of query points.
///
/// The finder keeps one cache slot per edge for its whole lifetime. Slots
/// are only useful when consecutive queries are close to each other, and a
/// finder must not be reused after the shape changes.
pub struct ShapeDistanceFinder<'a, C: ContourCombiner> {
    shape: &'a Shape,
    combiner: C,
    edge_cache: Vec<Cache<C>>,
}

impl<'a, C: ContourCombiner> ShapeDistanceFinder<'a, C> {
    #[must_use]
    pub fn new(shape: &'a Shape) -> Self {
        Self {
            shape,
            combiner: C::new(shape),
            edge_cache: vec![<Cache<C>>::default(); shape.edge_count()],
        }
    }

    #[must_use]
    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    /// Returns the distance from `origin` to the shape.
    pub fn distance(&mut self, origin: Point2) -> Distance<C> {
        let shape = self.shape;
        self.combiner.reset(origin);
        let mut offset = 0;
        for (index, contour) in shape.contours.iter().enumerate() {
            let selector = self.combiner.edge_selector(index);
            let caches = &mut self.edge_cache[offset..offset + contour.len()];
            for (slot, [prev, edge, next]) in edge_triples(contour).enumerate() {
                selector.add_edge(&mut caches[slot], &contour.edges[prev], &contour.edges[edge], &contour.edges[next]);
            }
            offset += contour.len();
        }
        self.combiner.distance()
    }

    /// Computes a single distance without keeping caches around.
    #[must_use]
    pub fn one_shot_distance(shape: &Shape, origin: Point2) -> Distance<C> {
        let mut combiner = C::new(shape);
        combiner.reset(origin);
        for (index, contour) in shape.contours.iter().enumerate() {
            let selector = combiner.edge_selector(index);
            for [prev, edge, next] in edge_triples(contour) {
                let mut dummy = <Cache<C>>::default();
                selector.add_edge(&mut dummy, &contour.edges[prev], &contour.edges[edge], &contour.edges[next]);
            }
        }
        combiner.distance()
    }
}

/// Yields `[prev, edge, next]` index triples for every edge of a contour,
/// starting with the last edge.
fn edge_triples(contour: &Contour) -> impl Iterator<Item = [usize; 3]> {
    let n = contour.len();
    (0..n).map(move |i| {
        let edge = (i + n - 1) % n;
        [(edge + n - 1) % n, edge, i]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{
        MultiDistanceSelector, OverlappingContourCombiner, PerpendicularDistanceSelector, SimpleContourCombiner,
    };
    use crate::geometry::{EdgeColor, EdgeSegment};
    use crate::math::Vector2;
    use approx::assert_abs_diff_eq;

    fn rounded_shape() -> Shape {
        let mut contour = Contour::new();
        contour.add_edge(EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), EdgeColor::YELLOW));
        contour.add_edge(EdgeSegment::quadratic(
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(2.0, 2.0),
            EdgeColor::CYAN,
        ));
        contour.add_edge(EdgeSegment::cubic(
            Point2::new(2.0, 2.0),
            Point2::new(1.5, 2.5),
            Point2::new(0.5, 2.5),
            Point2::new(0.0, 2.0),
            EdgeColor::MAGENTA,
        ));
        contour.add_edge(EdgeSegment::linear(Point2::new(0.0, 2.0), Point2::new(0.0, 0.0), EdgeColor::YELLOW));
        Shape::from_contours(vec![contour])
    }

    #[test]
    fn edge_triples_are_cyclic() {
        let shape = rounded_shape();
        let triples: Vec<[usize; 3]> = edge_triples(&shape.contours[0]).collect();
        assert_eq!(triples, vec![[2, 3, 0], [3, 0, 1], [0, 1, 2], [1, 2, 3]]);
        let single = Contour::from_edges(vec![shape.contours[0].edges[0]]);
        assert_eq!(edge_triples(&single).collect::<Vec<_>>(), vec![[0, 0, 0]]);
    }

    #[test]
    fn boustrophedon_scan_matches_one_shot() {
        let shape = rounded_shape();
        let mut finder = ShapeDistanceFinder::<OverlappingContourCombiner<MultiDistanceSelector>>::new(&shape);
        for y in 0..12 {
            for col in 0..12 {
                let x = if y % 2 == 1 { 11 - col } else { col };
                let p = Point2::new(-0.5, -0.5) + Vector2::new(f64::from(x), f64::from(y)) * 0.3;
                let cached = finder.distance(p);
                let fresh = ShapeDistanceFinder::<OverlappingContourCombiner<MultiDistanceSelector>>::one_shot_distance(&shape, p);
                assert_abs_diff_eq!(cached.r, fresh.r, epsilon = 1e-9);
                assert_abs_diff_eq!(cached.g, fresh.g, epsilon = 1e-9);
                assert_abs_diff_eq!(cached.b, fresh.b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn sign_follows_inside() {
        let shape = rounded_shape();
        let mut finder = ShapeDistanceFinder::<SimpleContourCombiner<PerpendicularDistanceSelector>>::new(&shape);
        assert!(finder.distance(Point2::new(1.0, 1.0)) < 0.0);
        assert!(finder.distance(Point2::new(4.0, 1.0)) > 0.0);
        assert!(finder.distance(Point2::new(1.0, 3.0)) > 0.0);
    }
}
