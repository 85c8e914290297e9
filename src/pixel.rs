//! Sample-domain block loading.
//!
//! Blocks on the right and bottom image borders are short of samples; the
//! loader stretches the last available row and column across the missing
//! area. Replicated samples keep the high-frequency coefficients small, which
//! is the cheapest padding for the forward transform.

use crate::block::{FloatBlock, BLOCK_DIM, BLOCK_SIZE};
use crate::error::{Result, SpectralError};

/// An 8x8 tile of image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBlock<T> {
    data: [T; BLOCK_SIZE],
}

impl<T: Copy + Default> PixelBlock<T> {
    /// Loads the tile with its top-left corner at `(origin_x, origin_y)` from
    /// a `width` x `height` plane stored row-major with `stride` samples per
    /// row. Samples past the right or bottom border are replicated from the
    /// last valid column and row.
    ///
    /// The origin must lie inside the image.
    pub fn load_and_stretch_edges(
        source: &[T],
        origin_x: usize,
        origin_y: usize,
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self> {
        debug_assert!(origin_x < width && origin_y < height);
        debug_assert!(stride >= width);
        let expected = (height - 1) * stride + width;
        if source.len() < expected {
            return Err(SpectralError::SourceTooSmall {
                expected,
                actual: source.len(),
            });
        }

        let avail_w = (width - origin_x).min(BLOCK_DIM);
        let avail_h = (height - origin_y).min(BLOCK_DIM);

        let mut data = [T::default(); BLOCK_SIZE];
        for y in 0..BLOCK_DIM {
            let sy = origin_y + y.min(avail_h - 1);
            let row = &source[sy * stride..];
            for x in 0..BLOCK_DIM {
                data[y * BLOCK_DIM + x] = row[origin_x + x.min(avail_w - 1)];
            }
        }
        Ok(Self { data })
    }

    pub fn as_slice(&self) -> &[T; BLOCK_SIZE] {
        &self.data
    }
}

impl<T: Copy + Into<f32>> PixelBlock<T> {
    /// Widens to floats and removes the level shift, centering the samples
    /// around zero for the forward transform.
    pub fn to_centered_float(&self, level_shift: f32) -> FloatBlock {
        let mut out = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            out[i] = self.data[i].into() - level_shift;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: usize, height: usize) -> Vec<u8> {
        (0..width * height).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn interior_block_copies_verbatim() {
        let src = plane(32, 32);
        let block = PixelBlock::load_and_stretch_edges(&src, 8, 16, 32, 32, 32).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(block.as_slice()[y * 8 + x], src[(16 + y) * 32 + 8 + x]);
            }
        }
    }

    #[test]
    fn border_block_stretches_edges() {
        // 12x10 image: the block at (8, 8) has 4 columns and 2 rows available
        let src = plane(12, 10);
        let block = PixelBlock::load_and_stretch_edges(&src, 8, 8, 12, 10, 12).unwrap();
        for y in 0..8 {
            let sy = (8 + y.min(1)) * 12;
            for x in 0..8 {
                assert_eq!(block.as_slice()[y * 8 + x], src[sy + 8 + x.min(3)]);
            }
        }
    }

    #[test]
    fn single_pixel_corner_fills_block() {
        let src = plane(9, 9);
        let block = PixelBlock::load_and_stretch_edges(&src, 8, 8, 9, 9, 9).unwrap();
        assert!(block.as_slice().iter().all(|&v| v == src[8 * 9 + 8]));
    }

    #[test]
    fn short_source_is_rejected() {
        let src = plane(16, 15);
        let err = PixelBlock::load_and_stretch_edges(&src, 0, 0, 16, 16, 16);
        assert_eq!(
            err,
            Err(SpectralError::SourceTooSmall {
                expected: 15 * 16 + 16,
                actual: 16 * 15,
            })
        );
    }

    #[test]
    fn centered_float_level_shifts() {
        let src = vec![200u8; 64];
        let block = PixelBlock::load_and_stretch_edges(&src, 0, 0, 8, 8, 8).unwrap();
        let centered = block.to_centered_float(128.0);
        assert!(centered.as_slice().iter().all(|&v| v == 72.0));
    }
}
