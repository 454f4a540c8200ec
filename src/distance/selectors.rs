//! Incremental nearest-edge accumulators, one per output mode.
//!
//! A selector is fed the edges of a contour for one query point at a time.
//! Each edge owns a cache slot recording the last point it was evaluated at;
//! an edge that cannot possibly beat the current best, even after moving by
//! the distance between the two query points, is skipped.

use crate::geometry::{EdgeColor, EdgeSegment, SignedDistance};
use crate::math::{cross, median, non_zero_sign, normalize, DistanceMapping, Point2, Vector2};

/// Safety margin applied to the displacement between consecutive queries.
const DISTANCE_DELTA_FACTOR: f64 = 1.001;

/// Result type of a selector: one or more signed distances.
pub trait DistanceValue: Copy + Send {
    /// Number of raster channels the value occupies.
    const CHANNELS: usize;

    /// A value that every real distance beats.
    fn uninitialized() -> Self;

    /// Collapses the value to a single signed distance (median for
    /// multi-channel values).
    fn resolve(&self) -> f64;

    /// Writes the mapped value into the first [`Self::CHANNELS`] entries of `out`.
    fn write_pixel(&self, mapping: &DistanceMapping, out: &mut [f32]);
}

#[allow(clippy::cast_possible_truncation)]
fn sample(mapping: &DistanceMapping, distance: f64) -> f32 {
    mapping.map(distance) as f32
}

impl DistanceValue for f64 {
    const CHANNELS: usize = 1;

    fn uninitialized() -> Self {
        -f64::MAX
    }

    fn resolve(&self) -> f64 {
        *self
    }

    fn write_pixel(&self, mapping: &DistanceMapping, out: &mut [f32]) {
        out[0] = sample(mapping, *self);
    }
}

/// Per-channel distances of a multi-channel field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl DistanceValue for MultiDistance {
    const CHANNELS: usize = 3;

    fn uninitialized() -> Self {
        Self {
            r: -f64::MAX,
            g: -f64::MAX,
            b: -f64::MAX,
        }
    }

    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }

    fn write_pixel(&self, mapping: &DistanceMapping, out: &mut [f32]) {
        out[0] = sample(mapping, self.r);
        out[1] = sample(mapping, self.g);
        out[2] = sample(mapping, self.b);
    }
}

/// Per-channel distances plus the true distance in a fourth channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiAndTrueDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl DistanceValue for MultiAndTrueDistance {
    const CHANNELS: usize = 4;

    fn uninitialized() -> Self {
        Self {
            r: -f64::MAX,
            g: -f64::MAX,
            b: -f64::MAX,
            a: -f64::MAX,
        }
    }

    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }

    fn write_pixel(&self, mapping: &DistanceMapping, out: &mut [f32]) {
        out[0] = sample(mapping, self.r);
        out[1] = sample(mapping, self.g);
        out[2] = sample(mapping, self.b);
        out[3] = sample(mapping, self.a);
    }
}

/// Accumulates the nearest distance from one query point to a set of edges.
pub trait EdgeSelector: Default + Clone {
    type Distance: DistanceValue;
    type Cache: Default + Clone + Send;

    /// Moves the selector to a new query point, loosening the current best
    /// by the displacement so it stays a valid bound.
    fn reset(&mut self, p: Point2);

    /// Considers `edge`, whose neighbours in the contour are `prev` and `next`.
    fn add_edge(&mut self, cache: &mut Self::Cache, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment);

    /// Takes the better of `self` and `other`.
    fn merge(&mut self, other: &Self);

    fn distance(&self) -> Self::Distance;
}

/// Cache slot of [`TrueDistanceSelector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueDistanceCache {
    point: Point2,
    abs_distance: f64,
}

/// Selects the nearest true (Euclidean) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueDistanceSelector {
    p: Point2,
    min_distance: SignedDistance,
}

impl EdgeSelector for TrueDistanceSelector {
    type Distance = f64;
    type Cache = TrueDistanceCache;

    fn reset(&mut self, p: Point2) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).norm();
        self.min_distance.distance += non_zero_sign(self.min_distance.distance) * delta;
        self.p = p;
    }

    fn add_edge(&mut self, cache: &mut TrueDistanceCache, _prev: &EdgeSegment, edge: &EdgeSegment, _next: &EdgeSegment) {
        let delta = DISTANCE_DELTA_FACTOR * (self.p - cache.point).norm();
        if cache.abs_distance - delta <= self.min_distance.distance.abs() {
            let (distance, _) = edge.signed_distance(self.p);
            if distance.is_closer_than(&self.min_distance) {
                self.min_distance = distance;
            }
            cache.point = self.p;
            cache.abs_distance = distance.distance.abs();
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.min_distance.is_closer_than(&self.min_distance) {
            self.min_distance = other.min_distance;
        }
    }

    fn distance(&self) -> f64 {
        self.min_distance.distance
    }
}

/// Cache slot of the perpendicular-distance selectors.
///
/// Besides the last absolute distance, it keeps how far the last query point
/// was inside each endpoint's extension domain and the perpendicular distance
/// to that extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerpendicularDistanceCache {
    point: Point2,
    abs_distance: f64,
    a_domain_distance: f64,
    b_domain_distance: f64,
    a_perpendicular_distance: f64,
    b_perpendicular_distance: f64,
}

/// Shared state of perpendicular-distance selection for one channel.
///
/// Tracks the nearest true distance and the nearest positive and negative
/// distances to the tangent lines extended past edge endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PerpendicularDistanceSelectorBase {
    min_true_distance: SignedDistance,
    min_negative_perpendicular_distance: f64,
    min_positive_perpendicular_distance: f64,
    near_edge: Option<EdgeSegment>,
    near_edge_param: f64,
}

impl Default for PerpendicularDistanceSelectorBase {
    fn default() -> Self {
        let min_true_distance = SignedDistance::default();
        Self {
            min_true_distance,
            min_negative_perpendicular_distance: -min_true_distance.distance.abs(),
            min_positive_perpendicular_distance: min_true_distance.distance.abs(),
            near_edge: None,
            near_edge_param: 0.0,
        }
    }
}

impl PerpendicularDistanceSelectorBase {
    /// Replaces `distance` by the perpendicular distance from the extension
    /// of an edge through `ep` along `edge_dir`, if the point lies beyond the
    /// endpoint and the perpendicular distance is smaller.
    pub fn perpendicular_distance(distance: &mut f64, ep: &Vector2, edge_dir: &Vector2) -> bool {
        let ts = ep.dot(edge_dir);
        if ts > 0.0 {
            let perpendicular_distance = cross(ep, edge_dir);
            if perpendicular_distance.abs() < distance.abs() {
                *distance = perpendicular_distance;
                return true;
            }
        }
        false
    }

    fn reset(&mut self, delta: f64) {
        self.min_true_distance.distance += non_zero_sign(self.min_true_distance.distance) * delta;
        self.min_negative_perpendicular_distance = -self.min_true_distance.distance.abs();
        self.min_positive_perpendicular_distance = self.min_true_distance.distance.abs();
        self.near_edge = None;
        self.near_edge_param = 0.0;
    }

    /// Returns `true` if `edge` may improve the current result at `p`, given
    /// what its cache slot recorded at the previous query.
    fn is_edge_relevant(&self, cache: &PerpendicularDistanceCache, p: Point2) -> bool {
        let delta = DISTANCE_DELTA_FACTOR * (p - cache.point).norm();
        let side_relevant = |domain_distance: f64, perpendicular_distance: f64| {
            domain_distance > 0.0
                && if perpendicular_distance < 0.0 {
                    perpendicular_distance + delta >= self.min_negative_perpendicular_distance
                } else {
                    perpendicular_distance - delta <= self.min_positive_perpendicular_distance
                }
        };
        cache.abs_distance - delta <= self.min_true_distance.distance.abs()
            || cache.a_domain_distance.abs() < delta
            || cache.b_domain_distance.abs() < delta
            || side_relevant(cache.a_domain_distance, cache.a_perpendicular_distance)
            || side_relevant(cache.b_domain_distance, cache.b_perpendicular_distance)
    }

    fn add_edge_true_distance(&mut self, edge: &EdgeSegment, distance: SignedDistance, param: f64) {
        if distance.is_closer_than(&self.min_true_distance) {
            self.min_true_distance = distance;
            self.near_edge = Some(*edge);
            self.near_edge_param = param;
        }
    }

    fn add_edge_perpendicular_distance(&mut self, distance: f64) {
        if distance <= 0.0 && distance > self.min_negative_perpendicular_distance {
            self.min_negative_perpendicular_distance = distance;
        }
        if distance >= 0.0 && distance < self.min_positive_perpendicular_distance {
            self.min_positive_perpendicular_distance = distance;
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.min_true_distance.is_closer_than(&self.min_true_distance) {
            self.min_true_distance = other.min_true_distance;
            self.near_edge = other.near_edge;
            self.near_edge_param = other.near_edge_param;
        }
        if other.min_negative_perpendicular_distance > self.min_negative_perpendicular_distance {
            self.min_negative_perpendicular_distance = other.min_negative_perpendicular_distance;
        }
        if other.min_positive_perpendicular_distance < self.min_positive_perpendicular_distance {
            self.min_positive_perpendicular_distance = other.min_positive_perpendicular_distance;
        }
    }

    fn compute_distance(&self, p: Point2) -> f64 {
        let mut min_distance = if self.min_true_distance.distance < 0.0 {
            self.min_negative_perpendicular_distance
        } else {
            self.min_positive_perpendicular_distance
        };
        if let Some(edge) = &self.near_edge {
            let mut distance = self.min_true_distance;
            edge.distance_to_perpendicular_distance(&mut distance, p, self.near_edge_param);
            if distance.distance.abs() < min_distance.abs() {
                min_distance = distance.distance;
            }
        }
        min_distance
    }

    #[must_use]
    pub fn true_distance(&self) -> SignedDistance {
        self.min_true_distance
    }
}

/// Endpoint domain measurements of one edge at one query point.
struct EdgeDomains {
    a_domain_distance: f64,
    b_domain_distance: f64,
    /// Perpendicular distance beyond the start, if it improves on the edge distance.
    a_perpendicular: Option<f64>,
    /// Perpendicular distance beyond the end, if it improves on the edge distance.
    b_perpendicular: Option<f64>,
}

/// Evaluates `edge` at `p`, records it in `cache` and measures the
/// perpendicular distances past its endpoints.
///
/// Each endpoint domain is bounded by the bisector of the corner it forms
/// with the neighbouring edge.
fn measure_edge(
    cache: &mut PerpendicularDistanceCache,
    p: Point2,
    prev: &EdgeSegment,
    edge: &EdgeSegment,
    next: &EdgeSegment,
    distance: SignedDistance,
) -> EdgeDomains {
    cache.point = p;
    cache.abs_distance = distance.distance.abs();

    let ap = p - edge.point(0.0);
    let bp = p - edge.point(1.0);
    let a_dir = normalize(&edge.direction(0.0), true);
    let b_dir = normalize(&edge.direction(1.0), true);
    let prev_dir = normalize(&prev.direction(1.0), true);
    let next_dir = normalize(&next.direction(0.0), true);
    let add = ap.dot(&normalize(&(prev_dir + a_dir), true));
    let bdd = -bp.dot(&normalize(&(b_dir + next_dir), true));

    let mut a_perpendicular = None;
    let mut b_perpendicular = None;
    if add > 0.0 {
        let mut pd = distance.distance;
        if PerpendicularDistanceSelectorBase::perpendicular_distance(&mut pd, &ap, &-a_dir) {
            pd = -pd;
            a_perpendicular = Some(pd);
        }
        cache.a_perpendicular_distance = pd;
    }
    if bdd > 0.0 {
        let mut pd = distance.distance;
        if PerpendicularDistanceSelectorBase::perpendicular_distance(&mut pd, &bp, &b_dir) {
            b_perpendicular = Some(pd);
        }
        cache.b_perpendicular_distance = pd;
    }
    cache.a_domain_distance = add;
    cache.b_domain_distance = bdd;
    EdgeDomains {
        a_domain_distance: add,
        b_domain_distance: bdd,
        a_perpendicular,
        b_perpendicular,
    }
}

/// Selects the signed pseudo-distance: the true distance, refined near
/// corners by distances to the edges' extended tangent lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerpendicularDistanceSelector {
    p: Point2,
    base: PerpendicularDistanceSelectorBase,
}

impl PerpendicularDistanceSelector {
    #[must_use]
    pub fn true_distance(&self) -> SignedDistance {
        self.base.true_distance()
    }
}

impl EdgeSelector for PerpendicularDistanceSelector {
    type Distance = f64;
    type Cache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point2) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).norm();
        self.base.reset(delta);
        self.p = p;
    }

    fn add_edge(&mut self, cache: &mut PerpendicularDistanceCache, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment) {
        if !self.base.is_edge_relevant(cache, self.p) {
            return;
        }
        let (distance, param) = edge.signed_distance(self.p);
        self.base.add_edge_true_distance(edge, distance, param);
        let domains = measure_edge(cache, self.p, prev, edge, next, distance);
        for pd in [domains.a_perpendicular, domains.b_perpendicular].into_iter().flatten() {
            self.base.add_edge_perpendicular_distance(pd);
        }
    }

    fn merge(&mut self, other: &Self) {
        self.base.merge(&other.base);
    }

    fn distance(&self) -> f64 {
        self.base.compute_distance(self.p)
    }
}

/// Selects a pseudo-distance per color channel, each considering only the
/// edges whose color includes that channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiDistanceSelector {
    p: Point2,
    r: PerpendicularDistanceSelectorBase,
    g: PerpendicularDistanceSelectorBase,
    b: PerpendicularDistanceSelectorBase,
}

impl MultiDistanceSelector {
    fn channels_mut(&mut self, color: EdgeColor) -> impl Iterator<Item = &mut PerpendicularDistanceSelectorBase> {
        [
            (color.has_red(), &mut self.r),
            (color.has_green(), &mut self.g),
            (color.has_blue(), &mut self.b),
        ]
        .into_iter()
        .filter_map(|(active, channel)| active.then_some(channel))
    }

    /// Returns the nearest true distance over all channels.
    #[must_use]
    pub fn true_distance(&self) -> SignedDistance {
        let mut distance = self.r.true_distance();
        if self.g.true_distance().is_closer_than(&distance) {
            distance = self.g.true_distance();
        }
        if self.b.true_distance().is_closer_than(&distance) {
            distance = self.b.true_distance();
        }
        distance
    }

    fn multi_distance(&self) -> MultiDistance {
        MultiDistance {
            r: self.r.compute_distance(self.p),
            g: self.g.compute_distance(self.p),
            b: self.b.compute_distance(self.p),
        }
    }
}

impl EdgeSelector for MultiDistanceSelector {
    type Distance = MultiDistance;
    type Cache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point2) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).norm();
        self.r.reset(delta);
        self.g.reset(delta);
        self.b.reset(delta);
        self.p = p;
    }

    fn add_edge(&mut self, cache: &mut PerpendicularDistanceCache, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment) {
        let color = edge.color();
        let p = self.p;
        let relevant = self.channels_mut(color).any(|channel| channel.is_edge_relevant(cache, p));
        if !relevant {
            return;
        }
        let (distance, param) = edge.signed_distance(p);
        for channel in self.channels_mut(color) {
            channel.add_edge_true_distance(edge, distance, param);
        }
        let domains = measure_edge(cache, p, prev, edge, next, distance);
        for pd in [domains.a_perpendicular, domains.b_perpendicular].into_iter().flatten() {
            for channel in self.channels_mut(color) {
                channel.add_edge_perpendicular_distance(pd);
            }
        }
    }

    fn merge(&mut self, other: &Self) {
        self.r.merge(&other.r);
        self.g.merge(&other.g);
        self.b.merge(&other.b);
    }

    fn distance(&self) -> MultiDistance {
        self.multi_distance()
    }
}

/// [`MultiDistanceSelector`] plus the true distance in a fourth channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiAndTrueDistanceSelector {
    inner: MultiDistanceSelector,
}

impl EdgeSelector for MultiAndTrueDistanceSelector {
    type Distance = MultiAndTrueDistance;
    type Cache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point2) {
        self.inner.reset(p);
    }

    fn add_edge(&mut self, cache: &mut PerpendicularDistanceCache, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment) {
        self.inner.add_edge(cache, prev, edge, next);
    }

    fn merge(&mut self, other: &Self) {
        self.inner.merge(&other.inner);
    }

    fn distance(&self) -> MultiAndTrueDistance {
        let multi = self.inner.multi_distance();
        MultiAndTrueDistance {
            r: multi.r,
            g: multi.g,
            b: multi.b,
            a: self.inner.true_distance().distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square_edges(color: EdgeColor) -> Vec<EdgeSegment> {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        (0..4)
            .map(|i| EdgeSegment::linear(points[i], points[(i + 1) % 4], color))
            .collect()
    }

    fn run<S: EdgeSelector>(selector: &mut S, caches: &mut [S::Cache], edges: &[EdgeSegment], p: Point2) -> S::Distance {
        selector.reset(p);
        let n = edges.len();
        for i in 0..n {
            selector.add_edge(&mut caches[i], &edges[(i + n - 1) % n], &edges[i], &edges[(i + 1) % n]);
        }
        selector.distance()
    }

    #[test]
    fn true_distance_inside_and_outside() {
        let edges = square_edges(EdgeColor::WHITE);
        let mut selector = TrueDistanceSelector::default();
        let mut caches = vec![TrueDistanceCache::default(); 4];
        assert_abs_diff_eq!(run(&mut selector, &mut caches, &edges, Point2::new(0.5, 0.25)), -0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(run(&mut selector, &mut caches, &edges, Point2::new(0.5, 0.2)), -0.2, epsilon = 1e-12);
        // Diagonally off the corner the true distance reaches the vertex.
        let d = run(&mut selector, &mut caches, &edges, Point2::new(2.0, 2.0));
        assert_abs_diff_eq!(d, 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn cached_queries_match_fresh_queries() {
        let edges = square_edges(EdgeColor::WHITE);
        let mut cached = PerpendicularDistanceSelector::default();
        let mut caches = vec![PerpendicularDistanceCache::default(); 4];
        for i in 0..40 {
            let p = Point2::new(-0.5 + f64::from(i) * 0.05, 0.3);
            let with_cache = run(&mut cached, &mut caches, &edges, p);
            let mut fresh = PerpendicularDistanceSelector::default();
            let mut fresh_caches = vec![PerpendicularDistanceCache::default(); 4];
            let without_cache = run(&mut fresh, &mut fresh_caches, &edges, p);
            assert_abs_diff_eq!(with_cache, without_cache, epsilon = 1e-12);
        }
    }

    #[test]
    fn pseudo_distance_extends_edges_past_corner() {
        let edges = square_edges(EdgeColor::WHITE);
        let mut selector = PerpendicularDistanceSelector::default();
        let mut caches = vec![PerpendicularDistanceCache::default(); 4];
        // Beyond the corner at (1, 1) the pseudo-distance is the distance to
        // the nearer extended side, not to the vertex.
        let d = run(&mut selector, &mut caches, &edges, Point2::new(1.5, 1.2));
        assert_abs_diff_eq!(d, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn channels_only_see_their_edges() {
        let mut edges = square_edges(EdgeColor::WHITE);
        edges[0].set_color(EdgeColor::YELLOW);
        edges[1].set_color(EdgeColor::CYAN);
        edges[2].set_color(EdgeColor::MAGENTA);
        edges[3].set_color(EdgeColor::YELLOW);
        let mut selector = MultiDistanceSelector::default();
        let mut caches = vec![PerpendicularDistanceCache::default(); 4];
        let d = run(&mut selector, &mut caches, &edges, Point2::new(0.5, 0.1));
        // Red sees bottom, top and left edges; blue sees right and top.
        assert_abs_diff_eq!(d.r, -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(d.g, -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(d.b, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(d.resolve(), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn multi_and_true_carries_true_distance() {
        let edges = square_edges(EdgeColor::WHITE);
        let mut selector = MultiAndTrueDistanceSelector::default();
        let mut caches = vec![PerpendicularDistanceCache::default(); 4];
        let d = run(&mut selector, &mut caches, &edges, Point2::new(2.0, 2.0));
        assert_abs_diff_eq!(d.a, 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn merge_keeps_nearest() {
        let edges = square_edges(EdgeColor::WHITE);
        let mut near = TrueDistanceSelector::default();
        let mut far = TrueDistanceSelector::default();
        let p = Point2::new(0.5, -0.5);
        near.reset(p);
        far.reset(p);
        near.add_edge(&mut TrueDistanceCache::default(), &edges[3], &edges[0], &edges[1]);
        far.add_edge(&mut TrueDistanceCache::default(), &edges[1], &edges[2], &edges[3]);
        far.merge(&near);
        assert_abs_diff_eq!(far.distance(), 0.5, epsilon = 1e-12);
    }
}
