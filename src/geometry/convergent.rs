//! Ordering of two curves that meet at a corner with opposite tangents.
//!
//! Near such a corner both curves leave the corner point in the same
//! direction, so the side on which one lies relative to the other is decided
//! by their higher-order derivatives.

use crate::geometry::EdgeSegment;
use crate::math::{cross, is_zero, sign, Point2, Vector2};

/// Drops the order of curves whose inner control points coincide with the
/// endpoints. Returns the number of meaningful control-point steps, where `0`
/// means the curve has collapsed to a point.
fn simplify_degenerate_curve(points: &mut [Point2; 4], order: usize) -> usize {
    match order {
        3 if (points[1] == points[0] || points[1] == points[3])
            && (points[2] == points[0] || points[2] == points[3]) =>
        {
            points[1] = points[3];
            1
        }
        2 if points[1] == points[0] || points[1] == points[2] => {
            points[1] = points[2];
            1
        }
        1 if points[0] == points[1] => 0,
        _ => order,
    }
}

fn nonzero_sign_of(d: f64) -> Option<i32> {
    (d != 0.0).then(|| sign(d))
}

/// Decides the ordering of the curve with control points `before` (listed
/// walking away from the corner, excluding it) and the curve `after` (same,
/// walking away on the other side) around the shared `corner`.
fn ordering_at_corner(corner: Point2, before: &[Point2], after: &[Point2]) -> i32 {
    let before_count = before.len();
    let after_count = after.len();
    if before_count == 0 || after_count == 0 {
        return 0;
    }
    let zero = Vector2::zeros();
    let mut a1 = before[0] - corner;
    let mut b1 = after[0] - corner;
    let mut a2 = if before_count >= 2 { before[1] - before[0] - a1 } else { zero };
    let mut b2 = if after_count >= 2 { after[1] - after[0] - b1 } else { zero };
    let mut a3 = zero;
    let mut b3 = zero;
    if before_count >= 3 {
        a3 = before[2] - before[1] - (before[1] - before[0]) - a2;
        a2 *= 3.0;
    }
    if after_count >= 3 {
        b3 = after[2] - after[1] - (after[1] - after[0]) - b2;
        b2 *= 3.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        a1 *= before_count as f64;
        b1 *= after_count as f64;
    }

    if !is_zero(&a1) && !is_zero(&b1) {
        let a_speed = a1.norm();
        let b_speed = b1.norm();
        let candidates = [
            a_speed * cross(&a1, &b2) + b_speed * cross(&a2, &b1),
            a_speed * a_speed * cross(&a1, &b3)
                + a_speed * b_speed * cross(&a2, &b2)
                + b_speed * b_speed * cross(&a3, &b1),
            a_speed * cross(&a2, &b3) + b_speed * cross(&a3, &b2),
        ];
        return candidates
            .into_iter()
            .find_map(nonzero_sign_of)
            .unwrap_or_else(|| sign(cross(&a3, &b3)));
    }

    // One side starts with a repeated control point: that curve approaches
    // the corner along sqrt(t). Mirror the case so the degenerate curve is
    // always the one before the corner.
    let mut flip = 1;
    if !is_zero(&a1) {
        b1 = a1;
        std::mem::swap(&mut a2, &mut b2);
        std::mem::swap(&mut a3, &mut b3);
        flip = -1;
    }
    if !is_zero(&b1) {
        let candidates = [
            cross(&a3, &b1),
            cross(&a2, &b2),
            cross(&a3, &b2),
            cross(&a2, &b3),
        ];
        return flip
            * candidates
                .into_iter()
                .find_map(nonzero_sign_of)
                .unwrap_or_else(|| sign(cross(&a3, &b3)));
    }

    // Both sides degenerate.
    let d = a2.norm().sqrt() * cross(&a2, &b3) + b2.norm().sqrt() * cross(&a3, &b2);
    nonzero_sign_of(d).unwrap_or_else(|| sign(cross(&a3, &b3)))
}

/// Returns the side on which curve `a`, which ends at a corner, lies relative
/// to curve `b`, which starts there, in the limit towards the corner: `1` if
/// `a` is to the left of `b`, `-1` if to the right, `0` if undetermined or if
/// the curves do not share the corner point.
#[must_use]
pub fn convergent_curve_ordering(a: &EdgeSegment, b: &EdgeSegment) -> i32 {
    let mut a_points = [Point2::zeros(); 4];
    let mut b_points = [Point2::zeros(); 4];
    let mut a_order = a.order();
    let mut b_order = b.order();
    a_points[..=a_order].copy_from_slice(a.control_points());
    b_points[..=b_order].copy_from_slice(b.control_points());
    if a_points[a_order] != b_points[0] {
        return 0;
    }
    a_order = simplify_degenerate_curve(&mut a_points, a_order);
    b_order = simplify_degenerate_curve(&mut b_points, b_order);
    let corner = b_points[0];
    let before: Vec<Point2> = a_points[..a_order].iter().rev().copied().collect();
    ordering_at_corner(corner, &before, &b_points[1..=b_order])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EdgeColor;

    #[test]
    fn lines_meeting_head_on_are_undetermined() {
        let a = EdgeSegment::linear(Point2::new(1.0, 0.0), Point2::new(0.0, 0.0), EdgeColor::WHITE);
        let b = EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), EdgeColor::WHITE);
        assert_eq!(convergent_curve_ordering(&a, &b), 0);
    }

    #[test]
    fn curvature_decides_side() {
        // `a` arrives from above the x axis, `b` leaves bending below it.
        let a = EdgeSegment::quadratic(
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
            EdgeColor::WHITE,
        );
        let b = EdgeSegment::quadratic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, -1.0),
            EdgeColor::WHITE,
        );
        let forward = convergent_curve_ordering(&a, &b);
        assert_ne!(forward, 0);

        let mirrored_a = EdgeSegment::quadratic(
            Point2::new(2.0, -1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
            EdgeColor::WHITE,
        );
        let mirrored_b = EdgeSegment::quadratic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 1.0),
            EdgeColor::WHITE,
        );
        assert_eq!(convergent_curve_ordering(&mirrored_a, &mirrored_b), -forward);
    }

    #[test]
    fn degenerate_curves_drop_to_a_line() {
        let p = Point2::new;
        let mut cubic = [p(0.0, 0.0), p(0.0, 0.0), p(3.0, 1.0), p(3.0, 1.0)];
        assert_eq!(simplify_degenerate_curve(&mut cubic, 3), 1);
        assert_eq!(cubic[1], p(3.0, 1.0));

        let mut quadratic = [p(0.0, 0.0), p(2.0, 2.0), p(2.0, 2.0), p(0.0, 0.0)];
        assert_eq!(simplify_degenerate_curve(&mut quadratic, 2), 1);

        // A collapsed curve stays a line; only an original line can drop to a point.
        let mut point_cubic = [p(1.0, 1.0); 4];
        assert_eq!(simplify_degenerate_curve(&mut point_cubic, 3), 1);
        let mut point_line = [p(1.0, 1.0); 4];
        assert_eq!(simplify_degenerate_curve(&mut point_line, 1), 0);

        let mut proper = [p(0.0, 0.0), p(1.0, 2.0), p(2.0, 2.0), p(3.0, 0.0)];
        assert_eq!(simplify_degenerate_curve(&mut proper, 3), 3);
    }

    #[test]
    fn disjoint_curves_are_undetermined() {
        let a = EdgeSegment::linear(Point2::new(1.0, 0.0), Point2::new(0.0, 0.0), EdgeColor::WHITE);
        let b = EdgeSegment::linear(Point2::new(0.0, 1.0), Point2::new(2.0, 0.0), EdgeColor::WHITE);
        assert_eq!(convergent_curve_ordering(&a, &b), 0);
    }

    #[test]
    fn degenerate_start_uses_half_order_terms() {
        let a = EdgeSegment::Cubic(crate::geometry::CubicSegment {
            p: [
                Point2::new(2.0, 1.0),
                Point2::new(1.0, 0.5),
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 0.0),
            ],
            color: EdgeColor::WHITE,
        });
        let b = EdgeSegment::linear(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), EdgeColor::WHITE);
        assert_ne!(convergent_curve_ordering(&a, &b), 0);
    }
}
