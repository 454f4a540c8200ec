use crate::error::{GeometryError, Result};
use crate::math::{DistanceMapping, Point2, Vector2};

/// Affine map from shape coordinates to raster coordinates:
/// `scale * (coord + translate)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: Vector2,
    translate: Vector2,
}

impl Projection {
    /// Creates a projection.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateProjection`] if a scale component is
    /// zero or not finite.
    pub fn new(scale: Vector2, translate: Vector2) -> Result<Self> {
        if scale.x == 0.0 || scale.y == 0.0 || !scale.x.is_finite() || !scale.y.is_finite() {
            return Err(GeometryError::DegenerateProjection {
                x: scale.x,
                y: scale.y,
            }
            .into());
        }
        Ok(Self { scale, translate })
    }

    #[must_use]
    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    #[must_use]
    pub fn translate(&self) -> Vector2 {
        self.translate
    }

    #[must_use]
    pub fn project(&self, coord: Point2) -> Point2 {
        (coord + self.translate).component_mul(&self.scale)
    }

    #[must_use]
    pub fn unproject(&self, coord: Point2) -> Point2 {
        coord.component_div(&self.scale) - self.translate
    }

    #[must_use]
    pub fn project_vector(&self, vector: Vector2) -> Vector2 {
        vector.component_mul(&self.scale)
    }

    #[must_use]
    pub fn unproject_vector(&self, vector: Vector2) -> Vector2 {
        vector.component_div(&self.scale)
    }

    #[must_use]
    pub fn project_x(&self, x: f64) -> f64 {
        self.scale.x * (x + self.translate.x)
    }

    #[must_use]
    pub fn project_y(&self, y: f64) -> f64 {
        self.scale.y * (y + self.translate.y)
    }

    #[must_use]
    pub fn unproject_x(&self, x: f64) -> f64 {
        x / self.scale.x - self.translate.x
    }

    #[must_use]
    pub fn unproject_y(&self, y: f64) -> f64 {
        y / self.scale.y - self.translate.y
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: Vector2::new(1.0, 1.0),
            translate: Vector2::zeros(),
        }
    }
}

/// Full mapping applied during generation: raster placement plus the
/// distance-to-sample mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SdfTransformation {
    pub projection: Projection,
    pub distance_mapping: DistanceMapping,
}

impl SdfTransformation {
    #[must_use]
    pub fn new(projection: Projection, distance_mapping: DistanceMapping) -> Self {
        Self {
            projection,
            distance_mapping,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn project_then_unproject() {
        let projection = Projection::new(Vector2::new(4.0, 2.0), Vector2::new(0.5, -1.0)).unwrap();
        let p = Point2::new(1.0, 3.0);
        let projected = projection.project(p);
        assert_abs_diff_eq!(projected.x, 6.0);
        assert_abs_diff_eq!(projected.y, 4.0);
        let back = projection.unproject(projected);
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-12);
        assert_abs_diff_eq!(projection.unproject_x(6.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(projection.unproject_vector(Vector2::new(4.0, 2.0)).norm(), 2f64.sqrt());
    }

    #[test]
    fn rejects_degenerate_scale() {
        assert!(Projection::new(Vector2::new(0.0, 1.0), Vector2::zeros()).is_err());
        assert!(Projection::new(Vector2::new(1.0, f64::INFINITY), Vector2::zeros()).is_err());
    }
}
