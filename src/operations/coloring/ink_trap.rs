use crate::geometry::{EdgeColor, Shape};
use crate::math::normalize;

use super::{
    color_teardrop, estimate_edge_length, init_color, is_corner, switch_color, switch_color_banned, Seed,
};

#[derive(Debug, Clone, Copy)]
struct InkTrapCorner {
    index: usize,
    prev_edge_length: f64,
    minor: bool,
    color: EdgeColor,
}

/// Like the simple strategy, but a spline shorter than both of its
/// neighbours is treated as an ink trap: its starting corner is minor and
/// takes the color shared by neither neighbour.
pub(super) fn color_shape(shape: &mut Shape, angle_threshold: f64, seed: &mut Seed) {
    let cross_threshold = angle_threshold.sin();
    let mut color = init_color(seed);
    let mut corners: Vec<InkTrapCorner> = Vec::new();
    for contour in &mut shape.contours {
        let Some(last) = contour.edges.last() else {
            continue;
        };
        corners.clear();
        let mut spline_length = 0.0;
        let mut prev_direction = last.direction(1.0);
        for (index, edge) in contour.edges.iter().enumerate() {
            if is_corner(
                &normalize(&prev_direction, false),
                &normalize(&edge.direction(0.0), false),
                cross_threshold,
            ) {
                corners.push(InkTrapCorner {
                    index,
                    prev_edge_length: spline_length,
                    minor: false,
                    color: EdgeColor::BLACK,
                });
                spline_length = 0.0;
            }
            spline_length += estimate_edge_length(edge);
            prev_direction = edge.direction(1.0);
        }

        match corners.len() {
            0 => {
                switch_color(&mut color, seed);
                for edge in &mut contour.edges {
                    edge.set_color(color);
                }
            }
            1 => {
                switch_color(&mut color, seed);
                let first = color;
                switch_color(&mut color, seed);
                color_teardrop(contour, corners[0].index, [first, EdgeColor::WHITE, color]);
            }
            corner_count => {
                let mut major_corner_count = corner_count;
                if corner_count > 3 {
                    corners[0].prev_edge_length += spline_length;
                    for i in 0..corner_count {
                        let next = corners[(i + 1) % corner_count].prev_edge_length;
                        let after = corners[(i + 2) % corner_count].prev_edge_length;
                        if corners[i].prev_edge_length > next && next < after {
                            corners[i].minor = true;
                            major_corner_count -= 1;
                        }
                    }
                }

                let mut initial_color = EdgeColor::BLACK;
                for corner in corners.iter_mut().filter(|c| !c.minor) {
                    major_corner_count -= 1;
                    let banned = if major_corner_count == 0 {
                        initial_color
                    } else {
                        EdgeColor::BLACK
                    };
                    switch_color_banned(&mut color, seed, banned);
                    corner.color = color;
                    if initial_color == EdgeColor::BLACK {
                        initial_color = color;
                    }
                }
                for i in 0..corner_count {
                    if corners[i].minor {
                        let next_color = corners[(i + 1) % corner_count].color;
                        corners[i].color = (color & next_color) ^ EdgeColor::WHITE;
                    } else {
                        color = corners[i].color;
                    }
                }

                let m = contour.edges.len();
                let start = corners[0].index;
                let mut spline = 0;
                let mut color = corners[0].color;
                for i in 0..m {
                    let index = (start + i) % m;
                    if spline + 1 < corner_count && corners[spline + 1].index == index {
                        spline += 1;
                        color = corners[spline].color;
                    }
                    contour.edges[index].set_color(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Contour;
    use crate::math::Point2;
    use crate::operations::coloring::DEFAULT_ANGLE_THRESHOLD;

    fn neighbours_differ(contour: &Contour) -> bool {
        let n = contour.edges.len();
        (0..n).all(|i| {
            let a = contour.edges[i].color();
            let b = contour.edges[(i + 1) % n].color();
            a == b || (a & b).bits().count_ones() <= 1
        })
    }

    #[test]
    fn short_notch_edge_is_minor() {
        // Long rectangle with a tiny step in its top edge.
        let points = [
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 3.0),
            (5.1, 3.0),
            (5.0, 3.1),
            (0.0, 3.1),
        ]
        .map(|(x, y)| Point2::new(x, y));
        let mut shape = Shape::from_contours(vec![Contour::polygon(&points)]);
        color_shape(&mut shape, DEFAULT_ANGLE_THRESHOLD, &mut Seed(0));
        let contour = &shape.contours[0];
        assert!(neighbours_differ(contour));
        let notch = contour.edges[3].color();
        let before = contour.edges[2].color();
        let after = contour.edges[4].color();
        assert_eq!(notch, (before & after) ^ EdgeColor::WHITE);
    }

    #[test]
    fn square_keeps_all_corners_major() {
        let points = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].map(|(x, y)| Point2::new(x, y));
        let mut shape = Shape::from_contours(vec![Contour::polygon(&points)]);
        color_shape(&mut shape, DEFAULT_ANGLE_THRESHOLD, &mut Seed(3));
        let contour = &shape.contours[0];
        assert!(neighbours_differ(contour));
        assert!(contour.edges.iter().all(|e| e.color().bits().count_ones() == 2));
    }
}
