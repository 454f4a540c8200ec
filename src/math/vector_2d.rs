use super::Vector2;

/// Returns `true` if both components are exactly zero.
#[must_use]
pub fn is_zero(v: &Vector2) -> bool {
    v.x == 0.0 && v.y == 0.0
}

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Returns the unit vector in the direction of `v`.
///
/// A zero-length vector normalizes to `(0, 0)` when `allow_zero` is set and
/// to `(0, 1)` otherwise. Downstream sign tests depend on this exact fallback.
#[must_use]
pub fn normalize(v: &Vector2, allow_zero: bool) -> Vector2 {
    let len = v.norm();
    if len != 0.0 {
        return v / len;
    }
    Vector2::new(0.0, if allow_zero { 0.0 } else { 1.0 })
}

/// Returns a vector of the same length perpendicular to `v`,
/// rotated counter-clockwise if `polarity` is set and clockwise otherwise.
#[must_use]
pub fn orthogonal(v: &Vector2, polarity: bool) -> Vector2 {
    if polarity {
        Vector2::new(-v.y, v.x)
    } else {
        Vector2::new(v.y, -v.x)
    }
}

/// Returns a unit vector perpendicular to `v`, see [`orthogonal`].
///
/// The zero-length fallback is `(0, ±1)` following `polarity`, or `(0, 0)`
/// when `allow_zero` is set.
#[must_use]
pub fn orthonormal(v: &Vector2, polarity: bool, allow_zero: bool) -> Vector2 {
    let len = v.norm();
    if len != 0.0 {
        return orthogonal(v, polarity) / len;
    }
    let fallback = if allow_zero { 0.0 } else { 1.0 };
    Vector2::new(0.0, if polarity { fallback } else { -fallback })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_regular_vector() {
        let n = normalize(&Vector2::new(3.0, 4.0), false);
        assert_abs_diff_eq!(n.x, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(n.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn normalize_zero_fallbacks() {
        assert_eq!(normalize(&Vector2::zeros(), false), Vector2::new(0.0, 1.0));
        assert_eq!(normalize(&Vector2::zeros(), true), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn orthonormal_polarity() {
        let v = Vector2::new(2.0, 0.0);
        assert_eq!(orthonormal(&v, true, false), Vector2::new(0.0, 1.0));
        assert_eq!(orthonormal(&v, false, false), Vector2::new(0.0, -1.0));
        assert_eq!(orthonormal(&Vector2::zeros(), false, false), Vector2::new(0.0, -1.0));
        assert_eq!(orthonormal(&Vector2::zeros(), true, true), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn cross_sign() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 1.0);
        assert!(cross(&x, &y) > 0.0);
        assert!(cross(&y, &x) < 0.0);
    }
}
