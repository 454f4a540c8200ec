use tracing::debug;

use crate::error::{Result, ShapeError};
use crate::geometry::{convergent_curve_ordering, Bounds, Contour, EdgeSegment, Scanline};
use crate::math::{mix, normalize, orthogonal, Vector2};

/// Threshold on the cosine between adjacent tangents, offset from -1, below
/// which a corner is treated as a cusp.
const CORNER_DOT_EPSILON: f64 = 0.000_001;

/// Relative displacement applied to the control points next to a cusp.
const DECONVERGE_OVERSHOOT: f64 = 1.111_111_111_111_111_1;

/// Which way the y axis of shape coordinates points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YAxisOrientation {
    /// Y grows upward, as in font outlines.
    #[default]
    Upward,
    /// Y grows downward, as in most image and SVG coordinates.
    Downward,
}

/// A vector shape: a set of closed contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub contours: Vec<Contour>,
    pub y_axis: YAxisOrientation,
}

impl Shape {
    /// Creates an empty shape with an upward y axis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shape from contours.
    #[must_use]
    pub fn from_contours(contours: Vec<Contour>) -> Self {
        Self {
            contours,
            y_axis: YAxisOrientation::Upward,
        }
    }

    /// Appends a contour.
    pub fn add_contour(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Returns `true` if raster rows must be flipped when sampling this shape.
    #[must_use]
    pub fn inverse_y_axis(&self) -> bool {
        self.y_axis == YAxisOrientation::Downward
    }

    /// Returns the total number of edges across all contours.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Checks that every contour is a closed loop.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::OpenContour`] naming the first edge that does not
    /// start where its predecessor ends.
    pub fn check_closed(&self) -> Result<()> {
        for (contour_index, contour) in self.contours.iter().enumerate() {
            let Some(last) = contour.edges.last() else {
                continue;
            };
            let mut corner = last.end_point();
            for (edge_index, edge) in contour.edges.iter().enumerate() {
                if edge.start_point() != corner {
                    return Err(ShapeError::OpenContour {
                        contour: contour_index,
                        edge: edge_index,
                    }
                    .into());
                }
                corner = edge.end_point();
            }
        }
        Ok(())
    }

    /// Returns `true` if every contour is closed. Advisory only: generation
    /// still runs on open shapes.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.check_closed().is_ok()
    }

    /// Prepares the shape for edge coloring and generation.
    ///
    /// Single-edge contours are split into thirds, and the control points next
    /// to cusps (adjacent tangents pointing in nearly opposite directions) are
    /// pushed apart so the two curves no longer converge. Quadratic edges at a
    /// cusp are elevated to cubics for this. Calling it again has no effect.
    pub fn normalize(&mut self) {
        let mut split = 0;
        let mut deconverged = 0;
        for contour in &mut self.contours {
            if let [edge] = contour.edges.as_slice() {
                contour.edges = edge.split_in_thirds().to_vec();
                split += 1;
            }
            deconverged += deconverge_contour(contour);
        }
        debug!(split, deconverged, "normalized shape");
    }

    /// Reverses contours whose orientation disagrees with their nesting, so
    /// outer contours run counter-clockwise and holes clockwise.
    ///
    /// Each contour is classified along a horizontal line through it by the
    /// parity of its crossings with the whole shape.
    #[allow(clippy::float_cmp)]
    pub fn orient_contours(&mut self) {
        let ratio = 0.5 * (5f64.sqrt() - 1.0);
        let mut orientations = vec![0i32; self.contours.len()];
        let mut crossings: Vec<(f64, i32, usize)> = Vec::new();
        for i in 0..self.contours.len() {
            let edges = &self.contours[i].edges;
            if orientations[i] != 0 || edges.is_empty() {
                continue;
            }
            let y = {
                let y0 = edges[0].point(0.0).y;
                let mut y1 = y0;
                for edge in edges {
                    if y0 != y1 {
                        break;
                    }
                    y1 = edge.point(1.0).y;
                }
                for edge in edges {
                    if y0 != y1 {
                        break;
                    }
                    y1 = edge.point(ratio).y;
                }
                mix(y0, y1, ratio)
            };

            for (j, contour) in self.contours.iter().enumerate() {
                for edge in &contour.edges {
                    crossings.extend(edge.scanline_intersections(y).iter().map(|(x, dy)| (x, dy, j)));
                }
            }
            if crossings.is_empty() {
                continue;
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
            for k in 1..crossings.len() {
                if crossings[k].0 == crossings[k - 1].0 {
                    crossings[k].1 = 0;
                    crossings[k - 1].1 = 0;
                }
            }
            for (k, &(_, dy, contour)) in crossings.iter().enumerate() {
                if dy != 0 {
                    // Entering the shape the edge goes down, leaving it goes up.
                    orientations[contour] += if (k % 2 == 0) == (dy < 0) { 1 } else { -1 };
                }
            }
            crossings.clear();
        }

        let mut reversed = 0;
        for (contour, orientation) in self.contours.iter_mut().zip(orientations) {
            if orientation < 0 {
                contour.reverse();
                reversed += 1;
            }
        }
        debug!(reversed, "oriented contours");
    }

    /// Returns the bounding box of all edges.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for contour in &self.contours {
            contour.bound(&mut bounds);
        }
        bounds
    }

    /// Returns the bounds of the shape stroked with half-width `border`,
    /// including miter points up to `miter_limit` at corners bulging towards
    /// `polarity`.
    #[must_use]
    pub fn bounds_with_border(&self, border: f64, miter_limit: f64, polarity: i32) -> Bounds {
        let mut bounds = self.bounds();
        if border > 0.0 {
            bounds.l -= border;
            bounds.b -= border;
            bounds.r += border;
            bounds.t += border;
            if miter_limit > 0.0 {
                for contour in &self.contours {
                    contour.bound_miters(&mut bounds, border, miter_limit, polarity);
                }
            }
        }
        bounds
    }

    /// Intersects the whole shape with the horizontal line at `y`.
    #[must_use]
    pub fn scanline(&self, y: f64) -> Scanline {
        let intersections = self
            .contours
            .iter()
            .flat_map(|contour| contour.edges.iter())
            .flat_map(|edge| edge.scanline_intersections(y).iter().collect::<Vec<_>>())
            .collect();
        Scanline::from_intersections(intersections)
    }
}

/// Pushes apart the edges meeting at each cusp of `contour`. Returns the
/// number of cusps treated.
fn deconverge_contour(contour: &mut Contour) -> usize {
    let n = contour.edges.len();
    if n == 0 {
        return 0;
    }
    let threshold = CORNER_DOT_EPSILON - 1.0;
    let factor = DECONVERGE_OVERSHOOT * (1.0 - threshold * threshold).sqrt() / threshold;
    let mut count = 0;
    for i in 0..n {
        let prev_index = (i + n - 1) % n;
        let prev_dir = normalize(&contour.edges[prev_index].direction(1.0), false);
        let cur_dir = normalize(&contour.edges[i].direction(0.0), false);
        if prev_dir.dot(&cur_dir) >= threshold {
            continue;
        }
        let mut axis = normalize(&(cur_dir - prev_dir), false) * factor;
        if convergent_curve_ordering(&contour.edges[prev_index], &contour.edges[i]) < 0 {
            axis = -axis;
        }
        deconverge_edge(&mut contour.edges[prev_index], 1, orthogonal(&axis, true));
        deconverge_edge(&mut contour.edges[i], 0, orthogonal(&axis, false));
        count += 1;
    }
    count
}

/// Moves the inner control point next to endpoint `param` of a curved edge
/// by `vector` scaled by its distance from the endpoint. Linear edges have no
/// inner control point and are left alone.
fn deconverge_edge(edge: &mut EdgeSegment, param: usize, vector: Vector2) {
    if matches!(edge, EdgeSegment::Linear(_)) {
        return;
    }
    *edge = edge.convert_to_cubic();
    let p = edge.control_points_mut();
    match param {
        0 => p[1] += vector * (p[1] - p[0]).norm(),
        _ => p[2] += vector * (p[2] - p[3]).norm(),
    }
}
