use std::f64::consts::PI;

/// Real roots of a polynomial equation, at most `N` of them.
///
/// An equation that degenerates to `0 = 0` is reported as infinite and
/// yields no enumerable roots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roots<const N: usize> {
    values: [f64; N],
    count: usize,
    infinite: bool,
}

impl<const N: usize> Roots<N> {
    fn none() -> Self {
        Self {
            values: [0.0; N],
            count: 0,
            infinite: false,
        }
    }

    fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::none()
        }
    }

    fn from_slice(roots: &[f64]) -> Self {
        let mut result = Self::none();
        for &root in roots.iter().take(N) {
            result.values[result.count] = root;
            result.count += 1;
        }
        result
    }

    /// Returns the roots found.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.count]
    }

    /// Returns the number of roots found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no root was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if every value satisfies the equation.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    /// Returns the roots sorted in ascending order.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.values[..self.count].sort_by(f64::total_cmp);
        self
    }
}

/// Solves `a*x^2 + b*x + c = 0`.
///
/// Falls back to the linear equation when `a` is zero or negligible
/// relative to `b`.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots<2> {
    if a == 0.0 || b.abs() > 1e12 * a.abs() {
        if b == 0.0 {
            if c == 0.0 {
                return Roots::infinite();
            }
            return Roots::none();
        }
        return Roots::from_slice(&[-c / b]);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let root = discriminant.sqrt();
        Roots::from_slice(&[(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)])
    } else if discriminant == 0.0 {
        Roots::from_slice(&[-b / (2.0 * a)])
    } else {
        Roots::none()
    }
}

/// Solves the monic cubic `x^3 + a*x^2 + b*x + c = 0`.
fn solve_cubic_normed(a: f64, b: f64, c: f64) -> Roots<3> {
    let a2 = a * a;
    let mut q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let a = a / 3.0;
    if r2 < q3 {
        let t = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        q = -2.0 * q.sqrt();
        return Roots::from_slice(&[
            q * (t / 3.0).cos() - a,
            q * ((t + 2.0 * PI) / 3.0).cos() - a,
            q * ((t - 2.0 * PI) / 3.0).cos() - a,
        ]);
    }
    let u = if r < 0.0 { 1.0 } else { -1.0 } * (r.abs() + (r2 - q3).sqrt()).cbrt();
    let v = if u == 0.0 { 0.0 } else { q / u };
    let x0 = (u + v) - a;
    if u == v || (u - v).abs() < 1e-12 * (u + v).abs() {
        return Roots::from_slice(&[x0, -0.5 * (u + v) - a]);
    }
    Roots::from_slice(&[x0])
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Treats the equation as quadratic when `a` is zero or so small relative to
/// `b` that normalizing by it would lose more precision than dropping it.
#[must_use]
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots<3> {
    if a != 0.0 {
        let bn = b / a;
        if bn.abs() < 1e6 {
            return solve_cubic_normed(bn, c / a, d / a);
        }
    }
    let quadratic = solve_quadratic(b, c, d);
    if quadratic.is_infinite() {
        return Roots::infinite();
    }
    Roots::from_slice(quadratic.as_slice())
}
