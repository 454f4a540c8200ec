use std::cmp::Ordering;

/// Rule deciding which winding numbers count as filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    Odd,
    Positive,
    Negative,
}

impl FillRule {
    /// Returns `true` if a point with the given winding number is filled.
    #[must_use]
    pub fn is_filled(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::Odd => winding & 1 != 0,
            Self::Positive => winding > 0,
            Self::Negative => winding < 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Crossing {
    x: f64,
    winding: i32,
}

/// The crossings of a shape with one horizontal line, sorted by x.
///
/// Each crossing stores the winding number of the span to its right, counted
/// so that a counter-clockwise contour encloses a winding of `+1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scanline {
    crossings: Vec<Crossing>,
}

impl Scanline {
    /// Builds a scanline from unsorted `(x, dy)` crossings, where `dy` is the
    /// vertical direction of the edge at the crossing.
    #[must_use]
    pub fn from_intersections(mut intersections: Vec<(f64, i32)>) -> Self {
        intersections.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let mut winding = 0;
        let crossings = intersections
            .into_iter()
            .map(|(x, dy)| {
                winding -= dy;
                Crossing { x, winding }
            })
            .collect();
        Self { crossings }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.crossings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }

    /// Returns the number of crossings at or left of `x`.
    #[must_use]
    pub fn count_intersections(&self, x: f64) -> usize {
        self.crossings.partition_point(|c| c.x <= x)
    }

    /// Returns the winding number at `x`.
    #[must_use]
    pub fn winding(&self, x: f64) -> i32 {
        match self.count_intersections(x) {
            0 => 0,
            n => self.crossings[n - 1].winding,
        }
    }

    /// Returns `true` if `x` lies inside the shape under `fill_rule`.
    #[must_use]
    pub fn filled(&self, x: f64, fill_rule: FillRule) -> bool {
        fill_rule.is_filled(self.winding(x))
    }
}
