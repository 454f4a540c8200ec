//! Post-processing that removes interpolation artifacts from multi-channel
//! distance fields.
//!
//! Correction runs in phases over the whole raster: protection marks texels
//! that must keep their channels, classification flags texels whose
//! interpolation with a neighbour produces a false median, and `apply`
//! flattens flagged texels to their median. All classification reads the
//! unmodified raster; only `apply` writes to it.

mod classify;

use rayon::prelude::*;
use tracing::debug;

use crate::distance::{
    ContourCombiner, OverlappingContourCombiner, PerpendicularDistanceSelector, ShapeDistanceFinder,
    SimpleContourCombiner,
};
use crate::error::{GenerationError, Result};
use crate::geometry::{EdgeColor, SdfTransformation, Shape};
use crate::math::{median, Point2, Vector2};
use crate::raster::Bitmap;

use classify::{has_diagonal_artifact, has_linear_artifact, ClassifierFactory, ShapeDistanceChecker, TexelClassifiers};

/// Extra margin on the distance within which edge texels are protected.
const PROTECTION_RADIUS_TOLERANCE: f64 = 1.001;

/// Default for both [`ErrorCorrectionConfig::min_deviation_ratio`] and
/// [`ErrorCorrectionConfig::min_improve_ratio`].
pub const DEFAULT_RATIO: f64 = 1.111_111_111_111_111_1;

/// Which texels error correction may modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrectionMode {
    /// Skips error correction.
    Disabled,
    /// Corrects every artifact, including texels at corners and edges.
    Indiscriminate,
    /// Protects texels at corners and edges, and corrects the rest.
    #[default]
    EdgeOnly,
    /// Protects nothing, but only corrects artifacts that flip a point
    /// between inside and outside.
    InversionOnly,
}

/// Whether artifact candidates are confirmed against the exact shape distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceCheckMode {
    /// Classifies from texel values only.
    DoNotCheck,
    /// Classifies from texel values, then confirms remaining inversion
    /// candidates with the shape distance.
    #[default]
    CheckAtEdge,
    /// Confirms every candidate with the shape distance.
    AlwaysCheck,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorCorrectionConfig {
    pub mode: ErrorCorrectionMode,
    pub distance_check_mode: DistanceCheckMode,
    /// Minimum deviation of the interpolated median from the expected range,
    /// in units of one texel's distance, for it to count as an artifact.
    pub min_deviation_ratio: f64,
    /// Minimum factor by which a correction must improve the distance at a
    /// candidate point when checked against the shape.
    pub min_improve_ratio: f64,
}

impl Default for ErrorCorrectionConfig {
    fn default() -> Self {
        Self {
            mode: ErrorCorrectionMode::default(),
            distance_check_mode: DistanceCheckMode::default(),
            min_deviation_ratio: DEFAULT_RATIO,
            min_improve_ratio: DEFAULT_RATIO,
        }
    }
}

/// Per-texel correction flags, stored bottom-up like [`Bitmap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stencil {
    width: usize,
    height: usize,
    flags: Vec<u8>,
}

impl Stencil {
    /// The texel must not be modified.
    pub const PROTECTED: u8 = 1;
    /// The texel is an artifact and will be flattened.
    pub const ERROR: u8 = 2;

    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            flags: vec![0; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.flags[self.width * y + x]
    }

    /// Adds `flag` to the texel at `x`, `y`.
    pub fn insert(&mut self, x: usize, y: usize, flag: u8) {
        self.flags[self.width * y + x] |= flag;
    }

    /// Clears all flags.
    pub fn clear(&mut self) {
        self.flags.fill(0);
    }

    /// Number of texels carrying `flag`.
    #[must_use]
    pub fn count(&self, flag: u8) -> usize {
        self.flags.iter().filter(|&&f| f & flag != 0).count()
    }

    fn check_matches<const N: usize>(&self, sdf: &Bitmap<N>) -> Result<()> {
        if N < 3 {
            return Err(GenerationError::InvalidParameters(format!(
                "error correction needs at least 3 channels, got {N}"
            ))
            .into());
        }
        if self.width != sdf.width() || self.height != sdf.height() {
            return Err(GenerationError::StencilMismatch {
                stencil_width: self.width,
                stencil_height: self.height,
                width: sdf.width(),
                height: sdf.height(),
            }
            .into());
        }
        Ok(())
    }
}

/// Returns `true` if `channel` crosses the zero level between texels `a`
/// and `b`, and is the median there.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn edge_between_texels_channel(a: &[f32], b: &[f32], channel: usize) -> bool {
    let t = (f64::from(a[channel]) - 0.5) / f64::from(a[channel] - b[channel]);
    if t > 0.0 && t < 1.0 {
        let c: [f32; 3] = std::array::from_fn(|i| (f64::from(a[i]) * (1.0 - t) + f64::from(b[i]) * t) as f32);
        return median(c[0], c[1], c[2]) == c[channel];
    }
    false
}

/// Channels that carry an edge between texels `a` and `b`.
fn edge_between_texels(a: &[f32], b: &[f32]) -> EdgeColor {
    let mut mask = EdgeColor::BLACK;
    for (channel, color) in [EdgeColor::RED, EdgeColor::GREEN, EdgeColor::BLUE].into_iter().enumerate() {
        if edge_between_texels_channel(a, b, channel) {
            mask = mask | color;
        }
    }
    mask
}

/// Returns `true` if a channel in `mask` is not the median `m` of `msd`.
#[allow(clippy::float_cmp)]
fn has_extreme_channel(msd: &[f32], m: f32, mask: EdgeColor) -> bool {
    (mask.has_red() && msd[0] != m) || (mask.has_green() && msd[1] != m) || (mask.has_blue() && msd[2] != m)
}

/// The phases of multi-channel error correction over one stencil.
pub struct MsdfErrorCorrection<'s> {
    stencil: &'s mut Stencil,
    transformation: SdfTransformation,
    min_deviation_ratio: f64,
    min_improve_ratio: f64,
}

impl<'s> MsdfErrorCorrection<'s> {
    /// Starts a correction pass. Clears `stencil`.
    pub fn new(stencil: &'s mut Stencil, transformation: SdfTransformation) -> Self {
        stencil.clear();
        Self {
            stencil,
            transformation,
            min_deviation_ratio: DEFAULT_RATIO,
            min_improve_ratio: DEFAULT_RATIO,
        }
    }

    #[must_use]
    pub fn with_min_deviation_ratio(mut self, ratio: f64) -> Self {
        self.min_deviation_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_min_improve_ratio(mut self, ratio: f64) -> Self {
        self.min_improve_ratio = ratio;
        self
    }

    #[must_use]
    pub fn stencil(&self) -> &Stencil {
        self.stencil
    }

    /// Length, in sample units, of one texel step along `direction`.
    fn texel_span(&self, direction: Vector2) -> f64 {
        let delta = self.transformation.distance_mapping.map_delta(1.0);
        self.transformation
            .projection
            .unproject_vector(direction * delta)
            .norm()
    }

    /// Protects the 2x2 texels around every corner where the color of
    /// consecutive edges changes by more than one channel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn protect_corners(&mut self, shape: &Shape) {
        let width = self.stencil.width as i64;
        let height = self.stencil.height as i64;
        for contour in &shape.contours {
            let Some(last) = contour.edges.last() else {
                continue;
            };
            let mut prev_color = last.color();
            for edge in &contour.edges {
                let common = prev_color & edge.color();
                prev_color = edge.color();
                if !common.is_single_channel() {
                    continue;
                }
                let mut p = self.transformation.projection.project(edge.start_point());
                if shape.inverse_y_axis() {
                    p.y = self.stencil.height as f64 - p.y;
                }
                let l = (p.x - 0.5).floor() as i64;
                let b = (p.y - 0.5).floor() as i64;
                for (x, y) in [(l, b), (l + 1, b), (l, b + 1), (l + 1, b + 1)] {
                    if (0..width).contains(&x) && (0..height).contains(&y) {
                        self.stencil.insert(x as usize, y as usize, Stencil::PROTECTED);
                    }
                }
            }
        }
    }

    /// Protects texels of pairs straddling an edge, for the channels that
    /// carry that edge.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels or does not match
    /// the stencil size.
    #[allow(clippy::cast_possible_truncation)]
    pub fn protect_edges<const N: usize>(&mut self, sdf: &Bitmap<N>) -> Result<()> {
        self.stencil.check_matches(sdf)?;
        let (width, height) = (sdf.width(), sdf.height());
        let protect_pair = |stencil: &mut Stencil, radius: f32, a: (usize, usize), b: (usize, usize)| {
            let pa = sdf.pixel(a.0, a.1);
            let pb = sdf.pixel(b.0, b.1);
            let am = median(pa[0], pa[1], pa[2]);
            let bm = median(pb[0], pb[1], pb[2]);
            if (am - 0.5).abs() + (bm - 0.5).abs() < radius {
                let mask = edge_between_texels(pa, pb);
                if has_extreme_channel(pa, am, mask) {
                    stencil.insert(a.0, a.1, Stencil::PROTECTED);
                }
                if has_extreme_channel(pb, bm, mask) {
                    stencil.insert(b.0, b.1, Stencil::PROTECTED);
                }
            }
        };

        let radius = (PROTECTION_RADIUS_TOLERANCE * self.texel_span(Vector2::new(1.0, 0.0))) as f32;
        for y in 0..height {
            for x in 1..width {
                protect_pair(&mut *self.stencil, radius, (x - 1, y), (x, y));
            }
        }
        let radius = (PROTECTION_RADIUS_TOLERANCE * self.texel_span(Vector2::new(0.0, 1.0))) as f32;
        for y in 1..height {
            for x in 0..width {
                protect_pair(&mut *self.stencil, radius, (x, y - 1), (x, y));
            }
        }
        let radius = (PROTECTION_RADIUS_TOLERANCE * self.texel_span(Vector2::new(1.0, 1.0))) as f32;
        for y in 1..height {
            for x in 1..width {
                protect_pair(&mut *self.stencil, radius, (x - 1, y - 1), (x, y));
                protect_pair(&mut *self.stencil, radius, (x, y - 1), (x - 1, y));
            }
        }
        Ok(())
    }

    /// Protects every texel.
    pub fn protect_all(&mut self) {
        self.stencil.flags.iter_mut().for_each(|f| *f |= Stencil::PROTECTED);
    }

    fn spans(&self) -> [f64; 3] {
        [
            self.min_deviation_ratio * self.texel_span(Vector2::new(1.0, 0.0)),
            self.min_deviation_ratio * self.texel_span(Vector2::new(0.0, 1.0)),
            self.min_deviation_ratio * self.texel_span(Vector2::new(1.0, 1.0)),
        ]
    }

    /// Flags texels whose interpolation with any of their 8 neighbours
    /// produces an artifact, judging from texel values alone.
    ///
    /// With `inversion_only`, only artifacts that flip the inside/outside
    /// state are flagged. Protected texels are never flagged.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels or does not match
    /// the stencil size.
    pub fn find_errors<const N: usize>(&mut self, sdf: &Bitmap<N>, inversion_only: bool) -> Result<()> {
        self.stencil.check_matches(sdf)?;
        let spans = self.spans();
        let mut classifiers = TexelClassifiers { inversion_only };
        for y in 0..sdf.height() {
            for x in 0..sdf.width() {
                if self.stencil.get(x, y) & (Stencil::PROTECTED | Stencil::ERROR) != 0 {
                    continue;
                }
                if texel_has_artifact(sdf, x, y, spans, &mut classifiers) {
                    self.stencil.insert(x, y, Stencil::ERROR);
                }
            }
        }
        Ok(())
    }

    /// Like [`find_errors`](Self::find_errors), but a candidate is only
    /// flagged if correcting it brings the interpolated value closer to the
    /// exact distance of `shape`, computed with combiner `C`.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels or does not match
    /// the stencil size.
    #[allow(clippy::cast_precision_loss)]
    pub fn find_errors_with_shape<C, const N: usize>(
        &mut self,
        sdf: &Bitmap<N>,
        shape: &Shape,
        inversion_only: bool,
    ) -> Result<()>
    where
        C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
    {
        self.stencil.check_matches(sdf)?;
        let spans = self.spans();
        let (width, height) = (sdf.width(), sdf.height());
        if width == 0 || height == 0 {
            return Ok(());
        }
        let transformation = self.transformation;
        let mut texel_size = transformation.projection.unproject_vector(Vector2::new(1.0, 1.0));
        let flip = shape.inverse_y_axis();
        if flip {
            texel_size.y = -texel_size.y;
        }
        let min_improve_ratio = self.min_improve_ratio;

        self.stencil
            .flags
            .par_chunks_mut(width)
            .enumerate()
            .for_each_init(
                || {
                    ShapeDistanceChecker::<C, N>::new(
                        sdf,
                        ShapeDistanceFinder::new(shape),
                        transformation.distance_mapping,
                        texel_size,
                        min_improve_ratio,
                    )
                },
                |checker, (row, flags)| {
                    let y = if flip { height - 1 - row } else { row };
                    let right_to_left = y % 2 == 1;
                    for col in 0..width {
                        let x = if right_to_left { width - 1 - col } else { col };
                        if flags[x] & (Stencil::PROTECTED | Stencil::ERROR) != 0 {
                            continue;
                        }
                        let c = sdf.pixel(x, row);
                        checker.shape_coord = transformation
                            .projection
                            .unproject(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
                        checker.sdf_coord = Point2::new(x as f64 + 0.5, row as f64 + 0.5);
                        checker.msd = [c[0], c[1], c[2]];
                        checker.inversion_only = inversion_only;
                        if texel_has_artifact(sdf, x, row, spans, checker) {
                            flags[x] |= Stencil::ERROR;
                        }
                    }
                },
            );
        Ok(())
    }

    /// Replaces the color channels of every texel flagged as an error with
    /// their median. Channels beyond the third are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels or does not match
    /// the stencil size.
    pub fn apply<const N: usize>(&self, sdf: &mut Bitmap<N>) -> Result<()> {
        self.stencil.check_matches(sdf)?;
        for (texel, &flags) in sdf.as_mut_slice().chunks_exact_mut(N).zip(&self.stencil.flags) {
            if flags & Stencil::ERROR != 0 {
                let m = median(texel[0], texel[1], texel[2]);
                texel[..3].fill(m);
            }
        }
        Ok(())
    }
}

/// Runs every neighbour test for the texel at `x`, `y`. `spans` holds the
/// horizontal, vertical and diagonal tolerance spans.
fn texel_has_artifact<const N: usize>(
    sdf: &Bitmap<N>,
    x: usize,
    y: usize,
    spans: [f64; 3],
    classifiers: &mut impl ClassifierFactory,
) -> bool {
    let (width, height) = (sdf.width(), sdf.height());
    let c = sdf.pixel(x, y);
    let cm = median(c[0], c[1], c[2]);
    let left = (x > 0).then(|| sdf.pixel(x - 1, y));
    let right = (x + 1 < width).then(|| sdf.pixel(x + 1, y));
    let bottom = (y > 0).then(|| sdf.pixel(x, y - 1));
    let top = (y + 1 < height).then(|| sdf.pixel(x, y + 1));

    let linear = [(left, (-1, 0)), (bottom, (0, -1)), (right, (1, 0)), (top, (0, 1))];
    for (neighbour, direction) in linear {
        if let Some(n) = neighbour {
            let span = if direction.0 == 0 { spans[1] } else { spans[0] };
            let mut classifier = classifiers.classifier(direction_vector(direction), span);
            if has_linear_artifact(&mut classifier, cm, c, n) {
                return true;
            }
        }
    }

    let diagonal = [
        (left, bottom, (-1, -1)),
        (right, bottom, (1, -1)),
        (left, top, (-1, 1)),
        (right, top, (1, 1)),
    ];
    for (horizontal, vertical, direction) in diagonal {
        if let (Some(h), Some(v)) = (horizontal, vertical) {
            let dx = x.wrapping_add_signed(isize::from(direction.0));
            let dy = y.wrapping_add_signed(isize::from(direction.1));
            let d = sdf.pixel(dx, dy);
            let mut classifier = classifiers.classifier(direction_vector(direction), spans[2]);
            if has_diagonal_artifact(&mut classifier, cm, c, h, v, d) {
                return true;
            }
        }
    }
    false
}

fn direction_vector(direction: (i8, i8)) -> Vector2 {
    Vector2::new(f64::from(direction.0), f64::from(direction.1))
}

/// Runs error correction on a generated multi-channel field, as configured.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCorrection {
    config: ErrorCorrectionConfig,
    overlap_support: bool,
}

impl ErrorCorrection {
    /// Creates a new `ErrorCorrection` operation. Overlap support for the
    /// shape distance check is on by default.
    #[must_use]
    pub fn new(config: ErrorCorrectionConfig) -> Self {
        Self {
            config,
            overlap_support: true,
        }
    }

    #[must_use]
    pub fn with_overlap_support(mut self, overlap_support: bool) -> Self {
        self.overlap_support = overlap_support;
        self
    }

    /// Corrects `sdf`, which was generated from `shape` with `transformation`.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels.
    pub fn execute<const N: usize>(
        &self,
        sdf: &mut Bitmap<N>,
        shape: &Shape,
        transformation: &SdfTransformation,
    ) -> Result<()> {
        if self.config.mode == ErrorCorrectionMode::Disabled {
            return Ok(());
        }
        let mut stencil = Stencil::new(sdf.width(), sdf.height());
        self.execute_with_stencil(sdf, &mut stencil, shape, transformation)
    }

    /// Like [`execute`](Self::execute), but keeps the flags in a
    /// caller-provided `stencil`.
    ///
    /// # Errors
    ///
    /// Returns an error if `sdf` has fewer than 3 channels or does not match
    /// the stencil size.
    pub fn execute_with_stencil<const N: usize>(
        &self,
        sdf: &mut Bitmap<N>,
        stencil: &mut Stencil,
        shape: &Shape,
        transformation: &SdfTransformation,
    ) -> Result<()> {
        let config = &self.config;
        if config.mode == ErrorCorrectionMode::Disabled {
            return Ok(());
        }
        let mut correction = MsdfErrorCorrection::new(stencil, *transformation)
            .with_min_deviation_ratio(config.min_deviation_ratio)
            .with_min_improve_ratio(config.min_improve_ratio);
        correction.stencil.check_matches(sdf)?;

        if config.mode == ErrorCorrectionMode::EdgeOnly {
            correction.protect_corners(shape);
            correction.protect_edges(sdf)?;
        }
        let inversion_only = config.mode == ErrorCorrectionMode::InversionOnly;
        match config.distance_check_mode {
            DistanceCheckMode::DoNotCheck => correction.find_errors(sdf, inversion_only)?,
            DistanceCheckMode::CheckAtEdge => {
                if !inversion_only {
                    correction.find_errors(sdf, false)?;
                }
                self.find_errors_with_shape(&mut correction, sdf, shape, true)?;
            }
            DistanceCheckMode::AlwaysCheck => self.find_errors_with_shape(&mut correction, sdf, shape, inversion_only)?,
        }

        debug!(
            mode = ?config.mode,
            distance_check_mode = ?config.distance_check_mode,
            protected = correction.stencil.count(Stencil::PROTECTED),
            flagged = correction.stencil.count(Stencil::ERROR),
            "error correction"
        );
        correction.apply(sdf)
    }

    fn find_errors_with_shape<const N: usize>(
        &self,
        correction: &mut MsdfErrorCorrection<'_>,
        sdf: &Bitmap<N>,
        shape: &Shape,
        inversion_only: bool,
    ) -> Result<()> {
        if self.overlap_support {
            correction.find_errors_with_shape::<OverlappingContourCombiner<PerpendicularDistanceSelector>, N>(
                sdf,
                shape,
                inversion_only,
            )
        } else {
            correction.find_errors_with_shape::<SimpleContourCombiner<PerpendicularDistanceSelector>, N>(
                sdf,
                shape,
                inversion_only,
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Contour, EdgeSegment, Projection};
    use crate::math::{DistanceMapping, Range};
    use crate::operations::coloring::EdgeColoring;
    use crate::operations::generate::{generate_msdf, MsdfGeneratorConfig};

    fn transformation() -> SdfTransformation {
        SdfTransformation::new(
            Projection::new(Vector2::new(8.0, 8.0), Vector2::new(0.125, 0.125)).unwrap(),
            DistanceMapping::try_from(Range::symmetric(0.5)).unwrap(),
        )
    }

    fn noisy_bitmap() -> Bitmap<3> {
        let mut bitmap = Bitmap::<3>::new(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                let v = |k: usize| ((x * 7 + y * 13 + k * 5) % 11) as f32 / 10.0;
                bitmap.pixel_mut(x, y).copy_from_slice(&[v(0), v(1), v(2)]);
            }
        }
        bitmap
    }

    fn square_msdf(shape: &Shape) -> Bitmap<3> {
        let config = MsdfGeneratorConfig::new(
            true,
            ErrorCorrectionConfig {
                mode: ErrorCorrectionMode::Disabled,
                ..ErrorCorrectionConfig::default()
            },
        );
        let mut output = Bitmap::<3>::new(10, 10);
        generate_msdf(&mut output, shape, &transformation(), &config).unwrap();
        output
    }

    fn colored_square() -> Shape {
        let mut shape = Shape::from_contours(vec![Contour::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])]);
        EdgeColoring::default().execute(&mut shape);
        shape
    }

    #[test]
    fn fully_protected_bitmap_is_unchanged() {
        let mut bitmap = noisy_bitmap();
        let original = bitmap.clone();
        let mut stencil = Stencil::new(6, 6);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        correction.protect_all();
        correction.find_errors(&bitmap, false).unwrap();
        assert_eq!(correction.stencil().count(Stencil::ERROR), 0);
        correction.apply(&mut bitmap).unwrap();
        assert_eq!(bitmap, original);
    }

    #[test]
    fn noisy_bitmap_gets_flattened() {
        let mut bitmap = noisy_bitmap();
        let mut stencil = Stencil::new(6, 6);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation()).with_min_deviation_ratio(0.0);
        correction.find_errors(&bitmap, false).unwrap();
        let flagged = correction.stencil().count(Stencil::ERROR);
        assert!(flagged > 0);
        correction.apply(&mut bitmap).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                let p = bitmap.pixel(x, y);
                if stencil.get(x, y) & Stencil::ERROR != 0 {
                    assert_eq!(p[0], p[1]);
                    assert_eq!(p[1], p[2]);
                }
            }
        }
    }

    #[test]
    fn apply_leaves_true_distance_channel() {
        let mut bitmap = Bitmap::<4>::new(1, 1);
        bitmap.pixel_mut(0, 0).copy_from_slice(&[0.1, 0.9, 0.4, 0.7]);
        let mut stencil = Stencil::new(1, 1);
        let correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        correction.stencil.insert(0, 0, Stencil::ERROR);
        correction.apply(&mut bitmap).unwrap();
        assert_eq!(bitmap.pixel(0, 0), &[0.4, 0.4, 0.4, 0.7]);
    }

    #[test]
    fn corners_of_colored_square_are_protected() {
        let shape = colored_square();
        let mut stencil = Stencil::new(10, 10);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        correction.protect_corners(&shape);
        // The corner at shape (0, 0) sits on raster (1, 1).
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (8, 8), (9, 9)] {
            assert_ne!(stencil.get(x, y) & Stencil::PROTECTED, 0, "texel ({x}, {y})");
        }
        assert_eq!(stencil.get(5, 5), 0);
    }

    #[test]
    fn texels_straddling_an_edge_are_protected() {
        let mut sdf = Bitmap::<3>::new(2, 1);
        sdf.pixel_mut(0, 0).copy_from_slice(&[0.6, 0.45, 0.7]);
        sdf.pixel_mut(1, 0).copy_from_slice(&[0.4, 0.55, 0.3]);
        let mut stencil = Stencil::new(2, 1);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        correction.protect_edges(&sdf).unwrap();
        assert_eq!(stencil.count(Stencil::PROTECTED), 2);
    }

    #[test]
    fn interior_of_square_is_not_edge_protected() {
        let shape = colored_square();
        let sdf = square_msdf(&shape);
        let mut stencil = Stencil::new(10, 10);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        correction.protect_edges(&sdf).unwrap();
        assert_eq!(stencil.get(5, 5), 0);
    }

    #[test]
    fn correction_preserves_medians_of_square() {
        let shape = colored_square();
        let mut sdf = square_msdf(&shape);
        let before = sdf.clone();
        for distance_check_mode in [
            DistanceCheckMode::DoNotCheck,
            DistanceCheckMode::CheckAtEdge,
            DistanceCheckMode::AlwaysCheck,
        ] {
            let config = ErrorCorrectionConfig {
                distance_check_mode,
                ..ErrorCorrectionConfig::default()
            };
            ErrorCorrection::new(config)
                .execute(&mut sdf, &shape, &transformation())
                .unwrap();
            for y in 0..10 {
                for x in 0..10 {
                    let (a, b) = (before.pixel(x, y), sdf.pixel(x, y));
                    assert_eq!(median(a[0], a[1], a[2]), median(b[0], b[1], b[2]));
                }
            }
        }
    }

    #[test]
    fn mismatched_stencil_is_rejected() {
        let bitmap = Bitmap::<3>::new(4, 4);
        let mut stencil = Stencil::new(3, 4);
        let mut correction = MsdfErrorCorrection::new(&mut stencil, transformation());
        assert!(correction.find_errors(&bitmap, false).is_err());
        let single = Bitmap::<1>::new(3, 4);
        assert!(correction.protect_edges(&single).is_err());
    }

    #[test]
    fn corner_test_accepts_single_channel_overlap() {
        let a = EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), EdgeColor::CYAN);
        assert!((a.color() & EdgeColor::MAGENTA).is_single_channel());
        assert!(!(a.color() & EdgeColor::CYAN).is_single_channel());
    }
}
