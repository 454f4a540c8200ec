use std::slice::{ChunksExact, ChunksExactMut};

/// A floating-point raster with `N` channels per pixel.
///
/// Rows are stored bottom-up: row 0 is the lowest row of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap<const N: usize> {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
}

impl<const N: usize> Bitmap<N> {
    /// Creates a zero-filled bitmap.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0.0; width * height * N],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the `N` channels of the pixel at column `x`, row `y`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = N * (self.width * y + x);
        &self.pixels[start..start + N]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let start = N * (self.width * y + x);
        &mut self.pixels[start..start + N]
    }

    /// Iterates over rows, bottom to top.
    pub fn rows(&self) -> ChunksExact<'_, f32> {
        self.pixels.chunks_exact(self.row_len())
    }

    /// Iterates mutably over rows, bottom to top.
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, f32> {
        let row_len = self.row_len();
        self.pixels.chunks_exact_mut(row_len)
    }

    /// Number of samples in one row.
    #[must_use]
    pub fn row_len(&self) -> usize {
        (self.width * N).max(1)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_addressing_is_row_major() {
        let mut bitmap = Bitmap::<3>::new(4, 2);
        bitmap.pixel_mut(1, 1).copy_from_slice(&[0.1, 0.2, 0.3]);
        assert_eq!(bitmap.pixel(1, 1), &[0.1, 0.2, 0.3]);
        assert_eq!(bitmap.as_slice()[3 * 5], 0.1);
        assert_eq!(bitmap.rows().count(), 2);
        assert_eq!(bitmap.rows().nth(1).map(<[f32]>::len), Some(12));
    }

    #[test]
    fn empty_bitmap_has_no_rows() {
        let bitmap = Bitmap::<1>::new(0, 0);
        assert_eq!(bitmap.rows().count(), 0);
        assert!(bitmap.as_slice().is_empty());
    }
}
