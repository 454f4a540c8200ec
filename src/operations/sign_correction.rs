use tracing::debug;

use crate::geometry::{FillRule, SdfTransformation, Shape};
use crate::math::median;
use crate::raster::Bitmap;

/// Repairs the inside/outside sign of a distance field using scanlines.
///
/// Useful for shapes whose contours are not consistently oriented: each
/// texel's sign is compared with the fill state of its centre under
/// `fill_rule`, and mismatching texels are mirrored around the zero level.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceSignCorrection {
    fill_rule: FillRule,
}

impl DistanceSignCorrection {
    /// Creates a new `DistanceSignCorrection` operation.
    #[must_use]
    pub fn new(fill_rule: FillRule) -> Self {
        Self { fill_rule }
    }

    /// Corrects `sdf`, which was generated from `shape` with `transformation`.
    ///
    /// Rasters with at least 3 channels are treated as multi-channel: the
    /// median decides the sign, all three color channels are mirrored
    /// together, and texels whose median is exactly zero take the majority
    /// verdict of their neighbours. A fourth channel is corrected on its own.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn execute<const N: usize>(&self, sdf: &mut Bitmap<N>, shape: &Shape, transformation: &SdfTransformation) {
        let (width, height) = (sdf.width(), sdf.height());
        if width == 0 || height == 0 {
            return;
        }
        let mapping = &transformation.distance_mapping;
        let zero = mapping.map(0.0) as f32;
        let ascending = mapping.map_delta(1.0) > 0.0;
        let is_inside = |value: f32| if ascending { value < zero } else { value > zero };
        let mirror = |value: &mut f32| *value = 2.0 * zero - *value;

        // +1 for texels whose sign agreed, -1 for flipped ones, 0 if undecided.
        let mut matches = vec![0i8; width * height];
        let mut ambiguous = false;
        let mut flipped = 0usize;
        for y in 0..height {
            let row = if shape.inverse_y_axis() { height - 1 - y } else { y };
            let scanline = shape.scanline(transformation.projection.unproject_y(y as f64 + 0.5));
            for x in 0..width {
                let fill = scanline.filled(transformation.projection.unproject_x(x as f64 + 0.5), self.fill_rule);
                let texel = sdf.pixel_mut(x, row);
                let index = row * width + x;
                if N >= 3 {
                    let m = median(texel[0], texel[1], texel[2]);
                    if m == zero {
                        ambiguous = true;
                    } else if is_inside(m) == fill {
                        matches[index] = 1;
                    } else {
                        texel[..3].iter_mut().for_each(mirror);
                        matches[index] = -1;
                        flipped += 1;
                    }
                    if N >= 4 && is_inside(texel[3]) != fill {
                        mirror(&mut texel[3]);
                    }
                } else if is_inside(texel[0]) != fill {
                    mirror(&mut texel[0]);
                    flipped += 1;
                }
            }
        }

        if ambiguous {
            for row in 0..height {
                for x in 0..width {
                    let index = row * width + x;
                    if matches[index] != 0 {
                        continue;
                    }
                    let mut votes = 0i32;
                    if x > 0 {
                        votes += i32::from(matches[index - 1]);
                    }
                    if x + 1 < width {
                        votes += i32::from(matches[index + 1]);
                    }
                    if row > 0 {
                        votes += i32::from(matches[index - width]);
                    }
                    if row + 1 < height {
                        votes += i32::from(matches[index + width]);
                    }
                    if votes < 0 {
                        sdf.pixel_mut(x, row)[..3].iter_mut().for_each(mirror);
                        flipped += 1;
                    }
                }
            }
        }
        debug!(fill_rule = ?self.fill_rule, flipped, "corrected distance signs");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Contour, Projection};
    use crate::math::{DistanceMapping, Point2, Range, Vector2};
    use crate::operations::coloring::EdgeColoring;
    use crate::operations::correction::{ErrorCorrectionConfig, ErrorCorrectionMode};
    use crate::operations::generate::{generate_msdf, generate_sdf, GeneratorConfig, MsdfGeneratorConfig};
    use approx::assert_abs_diff_eq;

    fn square(reversed: bool) -> Shape {
        let mut contour = Contour::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]);
        if reversed {
            contour.reverse();
        }
        Shape::from_contours(vec![contour])
    }

    fn transformation() -> SdfTransformation {
        SdfTransformation::new(
            Projection::new(Vector2::new(8.0, 8.0), Vector2::new(0.125, 0.125)).unwrap(),
            DistanceMapping::try_from(Range::symmetric(0.5)).unwrap(),
        )
    }

    #[test]
    fn reversed_square_sdf_is_repaired() {
        let config = GeneratorConfig::default();
        let mut expected = Bitmap::<1>::new(10, 10);
        generate_sdf(&mut expected, &square(false), &transformation(), &config);

        let reversed = square(true);
        let mut sdf = Bitmap::<1>::new(10, 10);
        generate_sdf(&mut sdf, &reversed, &transformation(), &config);
        assert!(sdf.pixel(5, 5)[0] > 0.5);
        DistanceSignCorrection::default().execute(&mut sdf, &reversed, &transformation());
        for y in 0..10 {
            for x in 0..10 {
                assert_abs_diff_eq!(sdf.pixel(x, y)[0], expected.pixel(x, y)[0], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn correct_field_is_left_alone() {
        let shape = square(false);
        let mut sdf = Bitmap::<1>::new(10, 10);
        generate_sdf(&mut sdf, &shape, &transformation(), &GeneratorConfig::default());
        let before = sdf.clone();
        DistanceSignCorrection::new(FillRule::NonZero).execute(&mut sdf, &shape, &transformation());
        assert_eq!(sdf, before);
    }

    #[test]
    fn reversed_square_msdf_is_repaired() {
        let mut shape = square(true);
        EdgeColoring::default().execute(&mut shape);
        let config = MsdfGeneratorConfig::new(
            true,
            ErrorCorrectionConfig {
                mode: ErrorCorrectionMode::Disabled,
                ..ErrorCorrectionConfig::default()
            },
        );
        let mut msdf = Bitmap::<3>::new(10, 10);
        generate_msdf(&mut msdf, &shape, &transformation(), &config).unwrap();
        DistanceSignCorrection::default().execute(&mut msdf, &shape, &transformation());
        for y in 0..10 {
            for x in 0..10 {
                let inside = (1..9).contains(&x) && (1..9).contains(&y);
                let p = msdf.pixel(x, y);
                assert_eq!(median(p[0], p[1], p[2]) < 0.5, inside, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn ambiguous_texel_follows_neighbours() {
        let shape = Shape::from_contours(vec![Contour::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(0.0, 1.0),
        ])]);
        let transformation = SdfTransformation::new(
            Projection::default(),
            DistanceMapping::try_from(Range::symmetric(2.0)).unwrap(),
        );
        let mut msdf = Bitmap::<3>::new(3, 1);
        msdf.pixel_mut(0, 0).copy_from_slice(&[0.75, 0.75, 0.75]);
        msdf.pixel_mut(1, 0).copy_from_slice(&[0.5, 0.875, 0.125]);
        msdf.pixel_mut(2, 0).copy_from_slice(&[0.75, 0.75, 0.75]);
        DistanceSignCorrection::default().execute(&mut msdf, &shape, &transformation);
        assert_eq!(msdf.pixel(0, 0), &[0.25, 0.25, 0.25]);
        assert_eq!(msdf.pixel(1, 0), &[0.5, 0.125, 0.875]);
        assert_eq!(msdf.pixel(2, 0), &[0.25, 0.25, 0.25]);
    }
}
