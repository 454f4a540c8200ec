//! Detection of interpolation artifacts between neighbouring texels.
//!
//! Bilinear filtering of a multi-channel field interpolates each channel
//! separately. Where two channels cross, the interpolated median can
//! deviate from what either texel suggests; such texels are candidates
//! for flattening to their median.

use crate::distance::{ContourCombiner, PerpendicularDistanceSelector, ShapeDistanceFinder};
use crate::math::{median, mix, solve_quadratic, DistanceMapping, Point2, Vector2};
use crate::raster::{interpolate, Bitmap};

/// Crossing points closer than this to either texel are ignored.
const ARTIFACT_T_EPSILON: f64 = 0.01;

/// The interpolated median lies outside the range its texels allow.
pub(super) const CANDIDATE: u8 = 0x01;
/// The deviation also exceeds the tolerance span.
pub(super) const ARTIFACT: u8 = 0x02;

pub(super) trait ArtifactClassifier {
    /// Classifies the interpolated median `xm` at `xt`, between boundary
    /// medians `am` at `at` and `bm` at `bt`.
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8;

    /// Decides whether the point at `t`, classified as `flags`, is an artifact.
    fn evaluate(&mut self, t: f64, m: f32, flags: u8) -> bool;
}

/// Creates the classifier for one neighbour direction of the current texel.
pub(super) trait ClassifierFactory {
    type Classifier<'c>: ArtifactClassifier
    where
        Self: 'c;

    fn classifier(&mut self, direction: Vector2, span: f64) -> Self::Classifier<'_>;
}

/// Classifies purely from texel values.
#[derive(Debug, Clone, Copy)]
pub(super) struct BaseArtifactClassifier {
    span: f64,
    inversion_only: bool,
}

impl BaseArtifactClassifier {
    pub(super) fn new(span: f64, inversion_only: bool) -> Self {
        Self { span, inversion_only }
    }
}

impl ArtifactClassifier for BaseArtifactClassifier {
    #[allow(clippy::float_cmp)]
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8 {
        let inverted = (am > 0.5 && bm > 0.5 && xm <= 0.5) || (am < 0.5 && bm < 0.5 && xm >= 0.5);
        if !(inverted || (!self.inversion_only && median(am, bm, xm) != xm)) {
            return 0;
        }
        let ax_span = (xt - at) * self.span;
        let bx_span = (bt - xt) * self.span;
        let (am, bm, xm) = (f64::from(am), f64::from(bm), f64::from(xm));
        let within = xm >= am - ax_span && xm <= am + ax_span && xm >= bm - bx_span && xm <= bm + bx_span;
        if within {
            CANDIDATE
        } else {
            CANDIDATE | ARTIFACT
        }
    }

    fn evaluate(&mut self, _t: f64, _m: f32, flags: u8) -> bool {
        flags & ARTIFACT != 0
    }
}

/// Factory of [`BaseArtifactClassifier`]s.
#[derive(Debug, Clone, Copy)]
pub(super) struct TexelClassifiers {
    pub(super) inversion_only: bool,
}

impl ClassifierFactory for TexelClassifiers {
    type Classifier<'c> = BaseArtifactClassifier;

    fn classifier(&mut self, _direction: Vector2, span: f64) -> BaseArtifactClassifier {
        BaseArtifactClassifier::new(span, self.inversion_only)
    }
}

/// Confirms candidates against the exact shape distance.
///
/// A candidate counts as an artifact if flattening the current texel would
/// bring the interpolated distance at the candidate point closer to the real
/// one by at least `min_improve_ratio`.
pub(super) struct ShapeDistanceChecker<'a, C: ContourCombiner, const N: usize> {
    finder: ShapeDistanceFinder<'a, C>,
    sdf: &'a Bitmap<N>,
    mapping: DistanceMapping,
    texel_size: Vector2,
    min_improve_ratio: f64,
    /// Shape-space position of the current texel centre.
    pub(super) shape_coord: Point2,
    /// Raster position of the current texel centre.
    pub(super) sdf_coord: Point2,
    /// Color channels of the current texel.
    pub(super) msd: [f32; 3],
    pub(super) inversion_only: bool,
}

impl<'a, C, const N: usize> ShapeDistanceChecker<'a, C, N>
where
    C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
{
    pub(super) fn new(
        sdf: &'a Bitmap<N>,
        finder: ShapeDistanceFinder<'a, C>,
        mapping: DistanceMapping,
        texel_size: Vector2,
        min_improve_ratio: f64,
    ) -> Self {
        Self {
            finder,
            sdf,
            mapping,
            texel_size,
            min_improve_ratio,
            shape_coord: Point2::zeros(),
            sdf_coord: Point2::zeros(),
            msd: [0.0; 3],
            inversion_only: false,
        }
    }
}

impl<'a, C, const N: usize> ClassifierFactory for ShapeDistanceChecker<'a, C, N>
where
    C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
{
    type Classifier<'c>
        = ShapeArtifactClassifier<'c, 'a, C, N>
    where
        Self: 'c;

    fn classifier(&mut self, direction: Vector2, span: f64) -> ShapeArtifactClassifier<'_, 'a, C, N> {
        ShapeArtifactClassifier {
            base: BaseArtifactClassifier::new(span, self.inversion_only),
            checker: self,
            direction,
        }
    }
}

pub(super) struct ShapeArtifactClassifier<'c, 'a, C: ContourCombiner, const N: usize> {
    base: BaseArtifactClassifier,
    checker: &'c mut ShapeDistanceChecker<'a, C, N>,
    direction: Vector2,
}

impl<C, const N: usize> ArtifactClassifier for ShapeArtifactClassifier<'_, '_, C, N>
where
    C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
{
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8 {
        self.base.range_test(at, bt, xt, am, bm, xm)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn evaluate(&mut self, t: f64, _m: f32, flags: u8) -> bool {
        if flags & CANDIDATE == 0 {
            return false;
        }
        if flags & ARTIFACT != 0 {
            return true;
        }
        let checker = &mut *self.checker;
        let t_vector = self.direction * t;
        let old = interpolate(checker.sdf, checker.sdf_coord + t_vector);
        // Value interpolated at the same point if the current texel were flattened.
        let a_weight = (1.0 - t_vector.x.abs()) * (1.0 - t_vector.y.abs());
        let [r, g, b] = checker.msd;
        let a_median = f64::from(median(r, g, b));
        let corrected = |i: usize| (f64::from(old[i]) + a_weight * (a_median - f64::from(checker.msd[i]))) as f32;
        let old_median = median(old[0], old[1], old[2]);
        let new_median = median(corrected(0), corrected(1), corrected(2));
        let shape_point = checker.shape_coord + t_vector.component_mul(&checker.texel_size);
        let reference = checker.mapping.map(checker.finder.distance(shape_point)) as f32;
        checker.min_improve_ratio * f64::from((new_median - reference).abs())
            < f64::from((old_median - reference).abs())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn lerp(a: f32, b: f32, t: f64) -> f32 {
    mix(f64::from(a), f64::from(b), t) as f32
}

/// Median of the linear interpolation of `a` and `b` at `t`.
fn interpolated_median(a: &[f32], b: &[f32], t: f64) -> f32 {
    median(lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t))
}

/// Median of the bilinear interpolation along a diagonal, given its
/// constant `a`, linear `l` and quadratic `q` terms.
#[allow(clippy::cast_possible_truncation)]
fn interpolated_median_quadratic(a: &[f32], l: &[f32; 3], q: &[f32; 3], t: f64) -> f32 {
    let channel = |i: usize| (t * (t * f64::from(q[i]) + f64::from(l[i])) + f64::from(a[i])) as f32;
    median(channel(0), channel(1), channel(2))
}

/// Checks the point between `a` and `b` where the channel difference,
/// `da` at `a` and `db` at `b`, crosses zero.
fn has_linear_artifact_inner(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    bm: f32,
    a: &[f32],
    b: &[f32],
    da: f32,
    db: f32,
) -> bool {
    let t = f64::from(da) / f64::from(da - db);
    if t > ARTIFACT_T_EPSILON && t < 1.0 - ARTIFACT_T_EPSILON {
        let xm = interpolated_median(a, b, t);
        let flags = classifier.range_test(0.0, 1.0, t, am, bm, xm);
        return classifier.evaluate(t, xm, flags);
    }
    false
}

/// Narrows the boundary of a range test to a local extreme of a channel at
/// `t_ex`, if it lies inside the diagonal. Both the parameter and the median
/// on that side are replaced by their values at the extreme.
fn extreme_range_test(
    classifier: &impl ArtifactClassifier,
    ends: (f32, f32),
    interp: impl Fn(f64) -> f32,
    t: f64,
    t_ex: f64,
    xm: f32,
) -> u8 {
    if !(t_ex > 0.0 && t_ex < 1.0) {
        return 0;
    }
    let mut t_end = [0.0, 1.0];
    let mut em = [ends.0, ends.1];
    let side = usize::from(t_ex > t);
    t_end[side] = t_ex;
    em[side] = interp(t_ex);
    classifier.range_test(t_end[0], t_end[1], t, em[0], em[1], xm)
}

#[allow(clippy::too_many_arguments)]
fn has_diagonal_artifact_inner(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    dm: f32,
    a: &[f32],
    l: &[f32; 3],
    q: &[f32; 3],
    da: f32,
    dbc: f32,
    dd: f32,
    t_ex0: f64,
    t_ex1: f64,
) -> bool {
    let (da, dbc, dd) = (f64::from(da), f64::from(dbc), f64::from(dd));
    let roots = solve_quadratic(dd - dbc + da, dbc - da - da, da);
    for &t in roots.as_slice() {
        // Channels are usually equal at the texels themselves.
        if t <= ARTIFACT_T_EPSILON || t >= 1.0 - ARTIFACT_T_EPSILON {
            continue;
        }
        let interp = |t: f64| interpolated_median_quadratic(a, l, q, t);
        let xm = interp(t);
        let mut flags = classifier.range_test(0.0, 1.0, t, am, dm, xm);
        flags |= extreme_range_test(&*classifier, (am, dm), interp, t, t_ex0, xm);
        flags |= extreme_range_test(&*classifier, (am, dm), interp, t, t_ex1, xm);
        if classifier.evaluate(t, xm, flags) {
            return true;
        }
    }
    false
}

/// Checks for an artifact between texel `a` (median `am`) and its
/// horizontal or vertical neighbour `b`. Only the texel further from the
/// edge is reported.
pub(super) fn has_linear_artifact(classifier: &mut impl ArtifactClassifier, am: f32, a: &[f32], b: &[f32]) -> bool {
    let bm = median(b[0], b[1], b[2]);
    (am - 0.5).abs() >= (bm - 0.5).abs()
        && (has_linear_artifact_inner(classifier, am, bm, a, b, a[1] - a[0], b[1] - b[0])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[2] - a[1], b[2] - b[1])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[0] - a[2], b[0] - b[2]))
}

/// Checks for an artifact between texel `a` (median `am`) and its diagonal
/// neighbour `d`, where `b` and `c` complete the 2x2 block.
pub(super) fn has_diagonal_artifact(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    a: &[f32],
    b: &[f32],
    c: &[f32],
    d: &[f32],
) -> bool {
    let dm = median(d[0], d[1], d[2]);
    if (am - 0.5).abs() < (dm - 0.5).abs() {
        return false;
    }
    let abc: [f32; 3] = std::array::from_fn(|i| a[i] - b[i] - c[i]);
    let l: [f32; 3] = std::array::from_fn(|i| -a[i] - abc[i]);
    let q: [f32; 3] = std::array::from_fn(|i| d[i] + abc[i]);
    // Local extremes of each channel along the diagonal.
    let t_ex: [f64; 3] = std::array::from_fn(|i| -0.5 * f64::from(l[i]) / f64::from(q[i]));
    [(0, 1), (1, 2), (2, 0)].into_iter().any(|(i, j)| {
        has_diagonal_artifact_inner(
            classifier,
            am,
            dm,
            a,
            &l,
            &q,
            a[j] - a[i],
            b[j] - b[i] + c[j] - c[i],
            d[j] - d[i],
            t_ex[i],
            t_ex[j],
        )
    })
}
