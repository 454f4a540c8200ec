use crate::geometry::{EdgeColor, Shape};

use super::{color_teardrop, find_corners, init_color, switch_color, switch_color_banned, Seed};

/// Cycles through the secondary colors, switching at every corner. White is
/// only used for the middle span of a contour with a single corner.
pub(super) fn color_shape(shape: &mut Shape, angle_threshold: f64, seed: &mut Seed) {
    let cross_threshold = angle_threshold.sin();
    let mut color = init_color(seed);
    for contour in &mut shape.contours {
        if contour.is_empty() {
            continue;
        }
        let corners = find_corners(contour, cross_threshold);
        match corners.as_slice() {
            [] => {
                switch_color(&mut color, seed);
                for edge in &mut contour.edges {
                    edge.set_color(color);
                }
            }
            [corner] => {
                switch_color(&mut color, seed);
                let first = color;
                switch_color(&mut color, seed);
                color_teardrop(contour, *corner, [first, EdgeColor::WHITE, color]);
            }
            _ => {
                let corner_count = corners.len();
                let start = corners[0];
                let m = contour.edges.len();
                switch_color(&mut color, seed);
                let initial_color = color;
                let mut spline = 0;
                for i in 0..m {
                    let index = (start + i) % m;
                    if spline + 1 < corner_count && corners[spline + 1] == index {
                        spline += 1;
                        let banned = if spline == corner_count - 1 {
                            initial_color
                        } else {
                            EdgeColor::BLACK
                        };
                        switch_color_banned(&mut color, seed, banned);
                    }
                    contour.edges[index].set_color(color);
                }
            }
        }
    }
}
