//! Combination of per-contour edge selection into one shape distance.

use crate::distance::{DistanceValue, EdgeSelector};
use crate::geometry::Shape;
use crate::math::Point2;

/// Drives one or more edge selectors and combines them into a shape distance.
pub trait ContourCombiner {
    type Selector: EdgeSelector;

    fn new(shape: &Shape) -> Self;

    /// Prepares all selectors for a query at `p`.
    fn reset(&mut self, p: Point2);

    /// Returns the selector that accumulates the edges of contour `index`.
    fn edge_selector(&mut self, index: usize) -> &mut Self::Selector;

    fn distance(&self) -> <Self::Selector as EdgeSelector>::Distance;
}

/// Uses a single selector for the whole shape. Correct only for shapes whose
/// contours neither overlap nor intersect.
#[derive(Debug, Clone)]
pub struct SimpleContourCombiner<S> {
    selector: S,
}

impl<S: EdgeSelector> ContourCombiner for SimpleContourCombiner<S> {
    type Selector = S;

    fn new(_shape: &Shape) -> Self {
        Self {
            selector: S::default(),
        }
    }

    fn reset(&mut self, p: Point2) {
        self.selector.reset(p);
    }

    fn edge_selector(&mut self, _index: usize) -> &mut S {
        &mut self.selector
    }

    fn distance(&self) -> S::Distance {
        self.selector.distance()
    }
}

/// Keeps a selector per contour and resolves overlapping or
/// self-intersecting contours using their orientation.
#[derive(Debug, Clone)]
pub struct OverlappingContourCombiner<S> {
    p: Point2,
    /// Sign of the distances inside each contour: the negated winding.
    inside_signs: Vec<i32>,
    selectors: Vec<S>,
}

impl<S: EdgeSelector> ContourCombiner for OverlappingContourCombiner<S> {
    type Selector = S;

    fn new(shape: &Shape) -> Self {
        Self {
            p: Point2::zeros(),
            inside_signs: shape.contours.iter().map(|c| -c.winding()).collect(),
            selectors: vec![S::default(); shape.contours.len()],
        }
    }

    fn reset(&mut self, p: Point2) {
        self.p = p;
        for selector in &mut self.selectors {
            selector.reset(p);
        }
    }

    fn edge_selector(&mut self, index: usize) -> &mut S {
        &mut self.selectors[index]
    }

    #[allow(clippy::float_cmp)]
    fn distance(&self) -> S::Distance {
        // "Inner" contours hold the query point on their positive side,
        // "outer" ones on their negative side.
        let mut shape_selector = S::default();
        let mut inner_selector = S::default();
        let mut outer_selector = S::default();
        shape_selector.reset(self.p);
        inner_selector.reset(self.p);
        outer_selector.reset(self.p);
        for (selector, &sign) in self.selectors.iter().zip(&self.inside_signs) {
            let edge_distance = selector.distance().resolve();
            shape_selector.merge(selector);
            if sign > 0 && edge_distance >= 0.0 {
                inner_selector.merge(selector);
            }
            if sign < 0 && edge_distance <= 0.0 {
                outer_selector.merge(selector);
            }
        }

        let shape_distance = shape_selector.distance();
        let inner_distance = inner_selector.distance();
        let outer_distance = outer_selector.distance();
        let inner_scalar = inner_distance.resolve();
        let outer_scalar = outer_distance.resolve();

        let mut distance;
        let winding;
        if inner_scalar >= 0.0 && inner_scalar.abs() <= outer_scalar.abs() {
            distance = inner_distance;
            winding = 1;
            for (selector, &sign) in self.selectors.iter().zip(&self.inside_signs) {
                if sign > 0 {
                    let contour_distance = selector.distance();
                    let scalar = contour_distance.resolve();
                    if scalar.abs() < outer_scalar.abs() && scalar > distance.resolve() {
                        distance = contour_distance;
                    }
                }
            }
        } else if outer_scalar <= 0.0 && outer_scalar.abs() < inner_scalar.abs() {
            distance = outer_distance;
            winding = -1;
            for (selector, &sign) in self.selectors.iter().zip(&self.inside_signs) {
                if sign < 0 {
                    let contour_distance = selector.distance();
                    let scalar = contour_distance.resolve();
                    if scalar.abs() < inner_scalar.abs() && scalar < distance.resolve() {
                        distance = contour_distance;
                    }
                }
            }
        } else {
            return shape_distance;
        }

        for (selector, &sign) in self.selectors.iter().zip(&self.inside_signs) {
            if sign != winding {
                let contour_distance = selector.distance();
                let scalar = contour_distance.resolve();
                let current = distance.resolve();
                if scalar * current >= 0.0 && scalar.abs() < current.abs() {
                    distance = contour_distance;
                }
            }
        }
        if distance.resolve() == shape_distance.resolve() {
            distance = shape_distance;
        }
        distance
    }
}
