//! Assignment of channel colors to edges for multi-channel generation.
//!
//! Corners of a contour split it into splines. Neighbouring splines must not
//! share all channels, or the corner between them rounds off in the field.

mod by_distance;
mod ink_trap;
mod simple;

use tracing::debug;

use crate::geometry::{Contour, EdgeColor, EdgeSegment, Shape};
use crate::math::{cross, normalize, Vector2};

/// Default maximum angle, in radians, between tangents that still counts as smooth.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 3.0;

/// Number of chords used to estimate the length of an edge.
const EDGE_LENGTH_PRECISION: u32 = 4;

/// Edge coloring algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColoringStrategy {
    /// Cycles colors at every corner.
    #[default]
    Simple,
    /// Like `Simple`, but short splines between longer neighbours take a
    /// color derived from their neighbours instead of a new one.
    InkTrap,
    /// Colors splines so that splines close to each other get different colors.
    ByDistance,
}

/// Assigns edge colors to every contour of a shape.
///
/// The shape should be normalized first. Contours with fewer than three
/// edges may be split so that three colors fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeColoring {
    strategy: ColoringStrategy,
    angle_threshold: f64,
    seed: u64,
}

impl Default for EdgeColoring {
    fn default() -> Self {
        Self::new(ColoringStrategy::Simple)
    }
}

impl EdgeColoring {
    /// Creates a new `EdgeColoring` operation with the default angle
    /// threshold and seed.
    #[must_use]
    pub fn new(strategy: ColoringStrategy) -> Self {
        Self {
            strategy,
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            seed: 0,
        }
    }

    /// Sets the corner angle threshold in radians.
    #[must_use]
    pub fn with_angle_threshold(mut self, angle_threshold: f64) -> Self {
        self.angle_threshold = angle_threshold;
        self
    }

    /// Sets the seed driving the pseudo-random color choices.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Colors the edges of `shape` in place.
    pub fn execute(&self, shape: &mut Shape) {
        debug!(
            strategy = ?self.strategy,
            contours = shape.contours.len(),
            "coloring edges"
        );
        let mut seed = Seed(self.seed);
        match self.strategy {
            ColoringStrategy::Simple => simple::color_shape(shape, self.angle_threshold, &mut seed),
            ColoringStrategy::InkTrap => ink_trap::color_shape(shape, self.angle_threshold, &mut seed),
            ColoringStrategy::ByDistance => by_distance::color_shape(shape, self.angle_threshold, seed),
        }
    }
}

/// Source of pseudo-random choices, consumed digit by digit.
#[derive(Debug, Clone, Copy)]
struct Seed(u64);

impl Seed {
    /// Takes a base-2 digit.
    fn extract2(&mut self) -> u8 {
        let v = (self.0 & 1) as u8;
        self.0 >>= 1;
        v
    }

    /// Takes a base-3 digit.
    #[allow(clippy::cast_possible_truncation)]
    fn extract3(&mut self) -> u8 {
        let v = (self.0 % 3) as u8;
        self.0 /= 3;
        v
    }
}

fn is_corner(a_dir: &Vector2, b_dir: &Vector2, cross_threshold: f64) -> bool {
    a_dir.dot(b_dir) <= 0.0 || cross(a_dir, b_dir).abs() > cross_threshold
}

/// Returns the indices of edges that start at a corner.
fn find_corners(contour: &Contour, cross_threshold: f64) -> Vec<usize> {
    let Some(last) = contour.edges.last() else {
        return Vec::new();
    };
    let mut prev_direction = last.direction(1.0);
    let mut corners = Vec::new();
    for (index, edge) in contour.edges.iter().enumerate() {
        if is_corner(
            &normalize(&prev_direction, false),
            &normalize(&edge.direction(0.0), false),
            cross_threshold,
        ) {
            corners.push(index);
        }
        prev_direction = edge.direction(1.0);
    }
    corners
}

fn estimate_edge_length(edge: &EdgeSegment) -> f64 {
    let mut length = 0.0;
    let mut prev = edge.point(0.0);
    for i in 1..=EDGE_LENGTH_PRECISION {
        let cur = edge.point(f64::from(i) / f64::from(EDGE_LENGTH_PRECISION));
        length += (cur - prev).norm();
        prev = cur;
    }
    length
}

fn init_color(seed: &mut Seed) -> EdgeColor {
    const COLORS: [EdgeColor; 3] = [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW];
    COLORS[usize::from(seed.extract3())]
}

/// Rotates a two-channel color to one of the other two.
fn switch_color(color: &mut EdgeColor, seed: &mut Seed) {
    let shifted = color.bits() << (1 + seed.extract2());
    *color = EdgeColor::from_bits(shifted | shifted >> 3);
}

/// Like [`switch_color`], but if `color` shares exactly one channel with
/// `banned`, switches to the color missing exactly that channel.
fn switch_color_banned(color: &mut EdgeColor, seed: &mut Seed, banned: EdgeColor) {
    let combined = *color & banned;
    if combined == EdgeColor::RED || combined == EdgeColor::GREEN || combined == EdgeColor::BLUE {
        *color = combined ^ EdgeColor::WHITE;
    } else {
        switch_color(color, seed);
    }
}

/// Maps `position` in `0..n` onto `-1`, `0` or `1` in three roughly equal,
/// symmetric parts.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn symmetrical_trichotomy(position: usize, n: usize) -> i32 {
    (3.0 + 2.875 * position as f64 / (n - 1) as f64 - 1.4375 + 0.5) as i32 - 3
}

/// Splits a one- or two-edge contour with a single corner into thirds, so
/// the parts start at the corner. Returns the parts in contour order.
fn split_teardrop(contour: &Contour, corner: usize) -> Vec<EdgeSegment> {
    let n = contour.edges.len();
    (0..n)
        .flat_map(|i| contour.edges[(corner + i) % n].split_in_thirds())
        .collect()
}

/// Colors a contour with exactly one corner: the spline around it is split
/// into three spans colored `colors[0]`, `colors[1]` and `colors[2]`.
fn color_teardrop(contour: &mut Contour, corner: usize, colors: [EdgeColor; 3]) {
    let m = contour.edges.len();
    if m >= 3 {
        for i in 0..m {
            let span = usize::try_from(1 + symmetrical_trichotomy(i, m)).unwrap_or(1);
            contour.edges[(corner + i) % m].set_color(colors[span]);
        }
    } else if m >= 1 {
        let mut parts = split_teardrop(contour, corner);
        let per_span = parts.len() / 3;
        for (i, part) in parts.iter_mut().enumerate() {
            part.set_color(colors[i / per_span]);
        }
        contour.edges = parts;
    }
}
