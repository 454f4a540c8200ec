//! Rasterization of a shape into signed distance fields.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::distance::{
    ContourCombiner, DistanceValue, EdgeSelector, MultiAndTrueDistanceSelector, MultiDistanceSelector,
    OverlappingContourCombiner, PerpendicularDistanceSelector, ShapeDistanceFinder, SimpleContourCombiner,
    TrueDistanceSelector,
};
use crate::error::{GenerationError, Result};
use crate::geometry::{SdfTransformation, Shape};
use crate::math::Point2;
use crate::operations::correction::{ErrorCorrection, ErrorCorrectionConfig};
use crate::raster::Bitmap;

/// Kind of distance field to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceFieldMode {
    /// Single-channel true signed distance.
    Sdf,
    /// Single-channel perpendicular distance, sharper near corners.
    Psdf,
    /// Three-channel field; requires colored edges.
    #[default]
    Msdf,
    /// Three channels plus a true-distance channel.
    Mtsdf,
}

impl DistanceFieldMode {
    /// Number of channels of the generated raster.
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Sdf | Self::Psdf => 1,
            Self::Msdf => 3,
            Self::Mtsdf => 4,
        }
    }
}

/// Settings shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Resolve overlapping contours per contour instead of assuming a
    /// clean, non-overlapping outline.
    pub overlap_support: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { overlap_support: true }
    }
}

/// Settings of the multi-channel generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MsdfGeneratorConfig {
    pub overlap_support: bool,
    pub error_correction: ErrorCorrectionConfig,
}

impl MsdfGeneratorConfig {
    #[must_use]
    pub fn new(overlap_support: bool, error_correction: ErrorCorrectionConfig) -> Self {
        Self {
            overlap_support,
            error_correction,
        }
    }
}

impl Default for MsdfGeneratorConfig {
    fn default() -> Self {
        Self::new(true, ErrorCorrectionConfig::default())
    }
}

impl From<MsdfGeneratorConfig> for GeneratorConfig {
    fn from(config: MsdfGeneratorConfig) -> Self {
        Self {
            overlap_support: config.overlap_support,
        }
    }
}

/// Generated raster, tagged with the mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceField {
    Sdf(Bitmap<1>),
    Psdf(Bitmap<1>),
    Msdf(Bitmap<3>),
    Mtsdf(Bitmap<4>),
}

impl DistanceField {
    #[must_use]
    pub fn mode(&self) -> DistanceFieldMode {
        match self {
            Self::Sdf(_) => DistanceFieldMode::Sdf,
            Self::Psdf(_) => DistanceFieldMode::Psdf,
            Self::Msdf(_) => DistanceFieldMode::Msdf,
            Self::Mtsdf(_) => DistanceFieldMode::Mtsdf,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Sdf(b) | Self::Psdf(b) => b.width(),
            Self::Msdf(b) => b.width(),
            Self::Mtsdf(b) => b.width(),
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Sdf(b) | Self::Psdf(b) => b.height(),
            Self::Msdf(b) => b.height(),
            Self::Mtsdf(b) => b.height(),
        }
    }
}

/// Fills every pixel of `output` with the distance computed by a finder of
/// combiner type `C`.
///
/// Rows are distributed across threads; each worker owns its finder and
/// alternates the scan direction by row so consecutive queries stay close.
#[allow(clippy::cast_precision_loss)]
fn generate_distance_field<C, const N: usize>(output: &mut Bitmap<N>, shape: &Shape, transformation: &SdfTransformation)
where
    C: ContourCombiner,
{
    let width = output.width();
    let height = output.height();
    if width == 0 || height == 0 {
        return;
    }
    let flip = shape.inverse_y_axis();
    let row_len = output.row_len();
    output
        .as_mut_slice()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each_init(
            || ShapeDistanceFinder::<C>::new(shape),
            |finder, (row, pixels)| {
                let y = if flip { height - 1 - row } else { row };
                let right_to_left = y % 2 == 1;
                for col in 0..width {
                    let x = if right_to_left { width - 1 - col } else { col };
                    let p = transformation
                        .projection
                        .unproject(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
                    let distance = finder.distance(p);
                    distance.write_pixel(&transformation.distance_mapping, &mut pixels[x * N..(x + 1) * N]);
                }
            },
        );
}

fn generate_with<S, const N: usize>(
    output: &mut Bitmap<N>,
    shape: &Shape,
    transformation: &SdfTransformation,
    overlap_support: bool,
) where
    S: EdgeSelector,
{
    if overlap_support {
        generate_distance_field::<OverlappingContourCombiner<S>, N>(output, shape, transformation);
    } else {
        generate_distance_field::<SimpleContourCombiner<S>, N>(output, shape, transformation);
    }
}

/// Generates a conventional single-channel signed distance field.
pub fn generate_sdf(output: &mut Bitmap<1>, shape: &Shape, transformation: &SdfTransformation, config: &GeneratorConfig) {
    generate_with::<TrueDistanceSelector, 1>(output, shape, transformation, config.overlap_support);
}

/// Generates a single-channel perpendicular signed distance field.
pub fn generate_psdf(output: &mut Bitmap<1>, shape: &Shape, transformation: &SdfTransformation, config: &GeneratorConfig) {
    generate_with::<PerpendicularDistanceSelector, 1>(output, shape, transformation, config.overlap_support);
}

/// Generates a multi-channel signed distance field and runs the configured
/// error correction on it.
///
/// # Errors
///
/// Returns an error if error correction rejects the output.
pub fn generate_msdf(
    output: &mut Bitmap<3>,
    shape: &Shape,
    transformation: &SdfTransformation,
    config: &MsdfGeneratorConfig,
) -> Result<()> {
    generate_with::<MultiDistanceSelector, 3>(output, shape, transformation, config.overlap_support);
    ErrorCorrection::new(config.error_correction)
        .with_overlap_support(config.overlap_support)
        .execute(output, shape, transformation)
}

/// Generates a multi-channel signed distance field with the true distance
/// in the fourth channel, then runs the configured error correction.
///
/// # Errors
///
/// Returns an error if error correction rejects the output.
pub fn generate_mtsdf(
    output: &mut Bitmap<4>,
    shape: &Shape,
    transformation: &SdfTransformation,
    config: &MsdfGeneratorConfig,
) -> Result<()> {
    generate_with::<MultiAndTrueDistanceSelector, 4>(output, shape, transformation, config.overlap_support);
    ErrorCorrection::new(config.error_correction)
        .with_overlap_support(config.overlap_support)
        .execute(output, shape, transformation)
}

/// Generates a distance field of the requested mode and size.
#[derive(Debug, Clone, Copy)]
pub struct GenerateDistanceField {
    mode: DistanceFieldMode,
    width: usize,
    height: usize,
    transformation: SdfTransformation,
    config: MsdfGeneratorConfig,
}

impl GenerateDistanceField {
    /// Creates a new `GenerateDistanceField` operation with default settings.
    #[must_use]
    pub fn new(mode: DistanceFieldMode, width: usize, height: usize, transformation: SdfTransformation) -> Self {
        Self {
            mode,
            width,
            height,
            transformation,
            config: MsdfGeneratorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_overlap_support(mut self, overlap_support: bool) -> Self {
        self.config.overlap_support = overlap_support;
        self
    }

    /// Sets the error correction applied to multi-channel output. Ignored
    /// for single-channel modes.
    #[must_use]
    pub fn with_error_correction(mut self, error_correction: ErrorCorrectionConfig) -> Self {
        self.config.error_correction = error_correction;
        self
    }

    /// Executes the generation.
    ///
    /// Shapes that fail [`Shape::validate`] are still rasterized.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParameters`] if the output size is
    /// zero, or any error raised by error correction.
    pub fn execute(&self, shape: &Shape) -> Result<DistanceField> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationError::InvalidParameters(format!(
                "output size {}x{} is empty",
                self.width, self.height
            ))
            .into());
        }
        debug!(
            mode = ?self.mode,
            width = self.width,
            height = self.height,
            contours = shape.contours.len(),
            overlap_support = self.config.overlap_support,
            "generating distance field"
        );
        if !shape.validate() {
            warn!(contours = shape.contours.len(), "shape has open contours");
        }

        let config = GeneratorConfig::from(self.config);
        let field = match self.mode {
            DistanceFieldMode::Sdf => {
                let mut output = Bitmap::new(self.width, self.height);
                generate_sdf(&mut output, shape, &self.transformation, &config);
                DistanceField::Sdf(output)
            }
            DistanceFieldMode::Psdf => {
                let mut output = Bitmap::new(self.width, self.height);
                generate_psdf(&mut output, shape, &self.transformation, &config);
                DistanceField::Psdf(output)
            }
            DistanceFieldMode::Msdf => {
                let mut output = Bitmap::new(self.width, self.height);
                generate_msdf(&mut output, shape, &self.transformation, &self.config)?;
                DistanceField::Msdf(output)
            }
            DistanceFieldMode::Mtsdf => {
                let mut output = Bitmap::new(self.width, self.height);
                generate_mtsdf(&mut output, shape, &self.transformation, &self.config)?;
                DistanceField::Mtsdf(output)
            }
        };
        Ok(field)
    }
}
