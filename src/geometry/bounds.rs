use crate::math::Point2;

/// Axis-aligned bounds: left, bottom, right, top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub l: f64,
    pub b: f64,
    pub r: f64,
    pub t: f64,
}

impl Bounds {
    const LARGE_VALUE: f64 = 1e240;

    /// Creates inverted bounds that any point will expand.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            l: Self::LARGE_VALUE,
            b: Self::LARGE_VALUE,
            r: -Self::LARGE_VALUE,
            t: -Self::LARGE_VALUE,
        }
    }

    /// Expands the bounds to include `p`.
    pub fn include(&mut self, p: Point2) {
        self.l = self.l.min(p.x);
        self.b = self.b.min(p.y);
        self.r = self.r.max(p.x);
        self.t = self.t.max(p.y);
    }

    /// Returns `true` if no point has been included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.l > self.r || self.b > self.t
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}
