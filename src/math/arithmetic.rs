use std::ops::{Add, Mul};

/// Linear interpolation between `a` and `b`: `(1 - weight) * a + weight * b`.
#[must_use]
pub fn mix<T>(a: T, b: T, weight: f64) -> T
where
    T: Mul<f64, Output = T> + Add<Output = T>,
{
    a * (1.0 - weight) + b * weight
}

/// Median of three values.
#[must_use]
pub fn median<T: PartialOrd + Copy>(a: T, b: T, c: T) -> T {
    max(min(a, b), min(max(a, b), c))
}

fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        b
    } else {
        a
    }
}

/// Returns 1 for positive values, -1 for negative values and 0 for zero.
#[must_use]
pub fn sign(n: f64) -> i32 {
    i32::from(n > 0.0) - i32::from(n < 0.0)
}

/// Returns 1 for positive values and -1 otherwise, including zero.
#[must_use]
pub fn non_zero_sign(n: f64) -> f64 {
    if n > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Clamps a signed raster index into `[0, max]`.
#[must_use]
pub fn clamp_index(n: i64, max: usize) -> usize {
    if n <= 0 {
        return 0;
    }
    usize::try_from(n).map_or(max, |n| n.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector2;

    #[test]
    fn mix_scalars_and_vectors() {
        assert!((mix(2.0, 4.0, 0.25) - 2.5).abs() < f64::EPSILON);
        let v = mix(Vector2::new(0.0, 0.0), Vector2::new(2.0, -2.0), 0.5);
        assert_eq!(v, Vector2::new(1.0, -1.0));
    }

    #[test]
    fn median_of_any_order() {
        assert_eq!(median(1, 2, 3), 2);
        assert_eq!(median(3, 1, 2), 2);
        assert_eq!(median(2, 3, 1), 2);
        assert!((median(0.5_f32, 0.1, 0.9) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn sign_variants() {
        assert_eq!(sign(3.0), 1);
        assert_eq!(sign(-0.1), -1);
        assert_eq!(sign(0.0), 0);
        assert!((non_zero_sign(0.0) + 1.0).abs() < f64::EPSILON);
        assert!((non_zero_sign(2.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_index_bounds() {
        assert_eq!(clamp_index(-3, 9), 0);
        assert_eq!(clamp_index(4, 9), 4);
        assert_eq!(clamp_index(12, 9), 9);
    }
}
