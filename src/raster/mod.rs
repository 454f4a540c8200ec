pub mod bitmap;

pub use bitmap::Bitmap;

use crate::math::{clamp_index, mix, Point2};

/// Samples `bitmap` at raster position `pos` with bilinear filtering.
///
/// Pixel centres lie at half-integer coordinates; positions outside the
/// raster are clamped to the border pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn interpolate<const N: usize>(bitmap: &Bitmap<N>, pos: Point2) -> [f32; N] {
    let mut output = [0.0; N];
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return output;
    }
    let pos = pos - Point2::new(0.5, 0.5);
    let left = pos.x.floor();
    let bottom = pos.y.floor();
    let lr = pos.x - left;
    let bt = pos.y - bottom;
    let max_x = bitmap.width() - 1;
    let max_y = bitmap.height() - 1;
    let l = clamp_index(left as i64, max_x);
    let r = clamp_index(left as i64 + 1, max_x);
    let b = clamp_index(bottom as i64, max_y);
    let t = clamp_index(bottom as i64 + 1, max_y);
    for (i, out) in output.iter_mut().enumerate() {
        let lower = mix(f64::from(bitmap.pixel(l, b)[i]), f64::from(bitmap.pixel(r, b)[i]), lr);
        let upper = mix(f64::from(bitmap.pixel(l, t)[i]), f64::from(bitmap.pixel(r, t)[i]), lr);
        *out = mix(lower, upper, bt) as f32;
    }
    output
}
