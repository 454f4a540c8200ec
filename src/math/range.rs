use std::ops::{Div, Mul};

use crate::error::{GeometryError, Result};

/// A range of signed distances, in shape units, that the output samples span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Distance mapped to the sample value 0.
    pub lower: f64,
    /// Distance mapped to the sample value 1.
    pub upper: f64,
}

impl Range {
    /// Creates a range with explicit bounds.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Creates a range of total `width` centred on zero.
    #[must_use]
    pub fn symmetric(width: f64) -> Self {
        Self {
            lower: -0.5 * width,
            upper: 0.5 * width,
        }
    }

    /// Returns `upper - lower`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::symmetric(0.0)
    }
}

impl Mul<f64> for Range {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self::new(self.lower * factor, self.upper * factor)
    }
}

impl Div<f64> for Range {
    type Output = Self;

    fn div(self, divisor: f64) -> Self {
        Self::new(self.lower / divisor, self.upper / divisor)
    }
}

/// Linear mapping from signed distance to sample value: `scale * (d + translate)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceMapping {
    scale: f64,
    translate: f64,
}

impl DistanceMapping {
    /// Creates a mapping from explicit coefficients.
    #[must_use]
    pub fn new(scale: f64, translate: f64) -> Self {
        Self { scale, translate }
    }

    /// Returns the mapping that turns sample values back into distances within `range`.
    #[must_use]
    pub fn inverse_of_range(range: Range) -> Self {
        let width = range.width();
        Self::new(width, range.lower / if width == 0.0 { 1.0 } else { width })
    }

    /// Maps an absolute distance to a sample value.
    #[must_use]
    pub fn map(&self, distance: f64) -> f64 {
        self.scale * (distance + self.translate)
    }

    /// Maps a distance difference (no translation) to a sample value difference.
    #[must_use]
    pub fn map_delta(&self, delta: f64) -> f64 {
        self.scale * delta
    }

    /// Returns the inverse mapping.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(1.0 / self.scale, -self.scale * self.translate)
    }
}

impl Default for DistanceMapping {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl TryFrom<Range> for DistanceMapping {
    type Error = crate::error::DistfieldError;

    fn try_from(range: Range) -> Result<Self> {
        let width = range.width();
        if width == 0.0 || !width.is_finite() {
            return Err(GeometryError::DegenerateRange {
                lower: range.lower,
                upper: range.upper,
            }
            .into());
        }
        Ok(Self::new(1.0 / width, -range.lower))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symmetric_range_maps_to_unit_interval() {
        let mapping = DistanceMapping::try_from(Range::symmetric(4.0)).unwrap();
        assert_abs_diff_eq!(mapping.map(-2.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mapping.map(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mapping.map(2.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mapping.map_delta(1.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn mapping_is_invertible() {
        let mapping = DistanceMapping::try_from(Range::new(-1.0, 3.0)).unwrap();
        let inverse = mapping.inverse();
        for d in [-1.0, 0.0, 0.7, 3.0] {
            assert_abs_diff_eq!(inverse.map(mapping.map(d)), d, epsilon = 1e-12);
        }
        let from_range = DistanceMapping::inverse_of_range(Range::new(-1.0, 3.0));
        assert_abs_diff_eq!(from_range.map(0.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_width_range_is_rejected() {
        assert!(DistanceMapping::try_from(Range::symmetric(0.0)).is_err());
    }

    #[test]
    fn range_scaling() {
        let r = Range::symmetric(2.0) * 3.0;
        assert_abs_diff_eq!(r.width(), 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!((r / 2.0).upper, 1.5, epsilon = 1e-12);
    }
}
