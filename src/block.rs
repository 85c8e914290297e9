//! 8x8 coefficient and sample blocks.
//!
//! Blocks are stored row-major in fixed arrays so they stay on the stack and
//! alias cleanly with 128-bit and 256-bit SIMD lanes.

use crate::error::{Result, SpectralError};
use std::ops::{Index, IndexMut};

/// Number of samples in an 8x8 block.
pub const BLOCK_SIZE: usize = 64;

/// Side length of a block.
pub const BLOCK_DIM: usize = 8;

/// An 8x8 block of quantized coefficients or integer samples.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntBlock(pub(crate) [i16; BLOCK_SIZE]);

impl IntBlock {
    pub const fn zeroed() -> Self {
        Self([0; BLOCK_SIZE])
    }

    pub const fn from_array(data: [i16; BLOCK_SIZE]) -> Self {
        Self(data)
    }

    /// Loads the first 64 elements of `source`.
    pub fn from_slice(source: &[i16]) -> Result<Self> {
        if source.len() < BLOCK_SIZE {
            return Err(SpectralError::SourceTooSmall {
                expected: BLOCK_SIZE,
                actual: source.len(),
            });
        }
        let mut data = [0i16; BLOCK_SIZE];
        data.copy_from_slice(&source[..BLOCK_SIZE]);
        Ok(Self(data))
    }

    pub fn as_slice(&self) -> &[i16; BLOCK_SIZE] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [i16; BLOCK_SIZE] {
        &mut self.0
    }

    /// Copies the block into the first 64 elements of `dest`.
    pub fn copy_to(&self, dest: &mut [i16]) {
        dest[..BLOCK_SIZE].copy_from_slice(&self.0);
    }

    /// Swaps rows and columns in place.
    pub fn transpose(&mut self) {
        for r in 0..BLOCK_DIM {
            for c in (r + 1)..BLOCK_DIM {
                self.0.swap(r * BLOCK_DIM + c, c * BLOCK_DIM + r);
            }
        }
    }

    /// Adds `value` to every coefficient, saturating.
    pub fn add_to_all(&mut self, value: i16) {
        for v in &mut self.0 {
            *v = v.saturating_add(value);
        }
    }

    /// Multiplies every coefficient by `value`, saturating.
    pub fn multiply_by(&mut self, value: i16) {
        for v in &mut self.0 {
            *v = v.saturating_mul(value);
        }
    }

    /// Element-wise saturating sum with `other`.
    pub fn add_elements(&mut self, other: &IntBlock) {
        for (v, a) in self.0.iter_mut().zip(other.0.iter()) {
            *v = v.saturating_add(*a);
        }
    }

    /// Element-wise saturating product with `other`.
    pub fn multiply_elements(&mut self, other: &IntBlock) {
        for (v, m) in self.0.iter_mut().zip(other.0.iter()) {
            *v = v.saturating_mul(*m);
        }
    }

    /// Widens every coefficient to `f32`.
    pub fn widen(&self) -> FloatBlock {
        FloatBlock::from(self)
    }

    /// Index of the last non-zero coefficient, or `None` for an all-zero block.
    pub fn last_non_zero(&self) -> Option<usize> {
        self.0.iter().rposition(|&v| v != 0)
    }
}

impl Default for IntBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Index<usize> for IntBlock {
    type Output = i16;

    fn index(&self, idx: usize) -> &i16 {
        &self.0[idx]
    }
}

impl IndexMut<usize> for IntBlock {
    fn index_mut(&mut self, idx: usize) -> &mut i16 {
        &mut self.0[idx]
    }
}

impl Index<(usize, usize)> for IntBlock {
    type Output = i16;

    /// Indexed as `(row, column)`.
    fn index(&self, (r, c): (usize, usize)) -> &i16 {
        &self.0[r * BLOCK_DIM + c]
    }
}

impl IndexMut<(usize, usize)> for IntBlock {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut i16 {
        &mut self.0[r * BLOCK_DIM + c]
    }
}

/// An 8x8 block of single-precision samples or transform coefficients.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatBlock(pub(crate) [f32; BLOCK_SIZE]);

/// Rounds half away from zero, saturating to the `i16` range.
///
/// The saturation is done on the float side so the scalar path produces the
/// same values as the SIMD truncate-and-pack sequence for every finite input.
#[inline]
pub(crate) fn round_away_from_zero(v: f32) -> i16 {
    let r = if v < 0.0 { v - 0.5 } else { v + 0.5 };
    r.clamp(-32768.0, 32767.0) as i16
}

impl FloatBlock {
    pub const fn zeroed() -> Self {
        Self([0.0; BLOCK_SIZE])
    }

    pub const fn from_array(data: [f32; BLOCK_SIZE]) -> Self {
        Self(data)
    }

    /// Loads the first 64 elements of `source`.
    pub fn from_slice(source: &[f32]) -> Result<Self> {
        if source.len() < BLOCK_SIZE {
            return Err(SpectralError::SourceTooSmall {
                expected: BLOCK_SIZE,
                actual: source.len(),
            });
        }
        let mut data = [0.0f32; BLOCK_SIZE];
        data.copy_from_slice(&source[..BLOCK_SIZE]);
        Ok(Self(data))
    }

    pub fn as_slice(&self) -> &[f32; BLOCK_SIZE] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32; BLOCK_SIZE] {
        &mut self.0
    }

    /// Copies the block into the first 64 elements of `dest`.
    pub fn copy_to(&self, dest: &mut [f32]) {
        dest[..BLOCK_SIZE].copy_from_slice(&self.0);
    }

    /// Swaps rows and columns in place.
    pub fn transpose(&mut self) {
        for r in 0..BLOCK_DIM {
            for c in (r + 1)..BLOCK_DIM {
                self.0.swap(r * BLOCK_DIM + c, c * BLOCK_DIM + r);
            }
        }
    }

    /// Multiplies every sample by `value`.
    pub fn multiply_by(&mut self, value: f32) {
        for v in &mut self.0 {
            *v *= value;
        }
    }

    /// Element-wise product with `other`.
    pub fn multiply_elements(&mut self, other: &FloatBlock) {
        for (v, m) in self.0.iter_mut().zip(other.0.iter()) {
            *v *= m;
        }
    }

    /// Adds `value` to every sample.
    pub fn add_to_all(&mut self, value: f32) {
        for v in &mut self.0 {
            *v += value;
        }
    }

    /// Element-wise sum with `other`.
    pub fn add_elements(&mut self, other: &FloatBlock) {
        for (v, a) in self.0.iter_mut().zip(other.0.iter()) {
            *v += a;
        }
    }

    /// Rounds every sample half away from zero into an integer block,
    /// saturating at the `i16` bounds.
    pub fn round_into(&self, dest: &mut IntBlock) {
        for (d, &v) in dest.0.iter_mut().zip(self.0.iter()) {
            *d = round_away_from_zero(v);
        }
    }

    /// Converts reconstructed samples to the displayable range.
    ///
    /// Adds the level-shift offset `ceil(max_value / 2)`, clamps to
    /// `[0, max_value]` and rounds to the nearest integer, half up.
    pub fn normalize(&mut self, max_value: f32) {
        let offset = (max_value / 2.0).ceil();
        for v in &mut self.0 {
            *v = ((*v + offset).clamp(0.0, max_value) + 0.5).floor();
        }
    }

    /// Copies the block into a row-major plane, duplicating each sample
    /// `h_scale` times horizontally and `v_scale` times vertically.
    pub fn scaled_copy_to(&self, dest: &mut [f32], stride: usize, h_scale: usize, v_scale: usize) {
        debug_assert!(stride >= BLOCK_DIM * h_scale);
        if h_scale == 1 && v_scale == 1 {
            for r in 0..BLOCK_DIM {
                let row = &self.0[r * BLOCK_DIM..r * BLOCK_DIM + BLOCK_DIM];
                dest[r * stride..r * stride + BLOCK_DIM].copy_from_slice(row);
            }
            return;
        }
        if h_scale == 2 && v_scale == 2 {
            for r in 0..BLOCK_DIM {
                let base = r * 2 * stride;
                for c in 0..BLOCK_DIM {
                    let v = self.0[r * BLOCK_DIM + c];
                    dest[base + c * 2] = v;
                    dest[base + c * 2 + 1] = v;
                    dest[base + stride + c * 2] = v;
                    dest[base + stride + c * 2 + 1] = v;
                }
            }
            return;
        }
        for r in 0..BLOCK_DIM {
            for dup_row in 0..v_scale {
                let base = (r * v_scale + dup_row) * stride;
                for c in 0..BLOCK_DIM {
                    let v = self.0[r * BLOCK_DIM + c];
                    for dup_col in 0..h_scale {
                        dest[base + c * h_scale + dup_col] = v;
                    }
                }
            }
        }
    }
}

impl Default for FloatBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<&IntBlock> for FloatBlock {
    fn from(src: &IntBlock) -> Self {
        let mut out = [0.0f32; BLOCK_SIZE];
        for (o, &v) in out.iter_mut().zip(src.0.iter()) {
            *o = v as f32;
        }
        Self(out)
    }
}

impl Index<usize> for FloatBlock {
    type Output = f32;

    fn index(&self, idx: usize) -> &f32 {
        &self.0[idx]
    }
}

impl IndexMut<usize> for FloatBlock {
    fn index_mut(&mut self, idx: usize) -> &mut f32 {
        &mut self.0[idx]
    }
}

impl Index<(usize, usize)> for FloatBlock {
    type Output = f32;

    /// Indexed as `(row, column)`.
    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        &self.0[r * BLOCK_DIM + c]
    }
}

impl IndexMut<(usize, usize)> for FloatBlock {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        &mut self.0[r * BLOCK_DIM + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_is_involution() {
        let mut block = IntBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            block[i] = i as i16;
        }
        let original = block;
        block.transpose();
        assert_eq!(block[(3, 5)], original[(5, 3)]);
        block.transpose();
        assert_eq!(block, original);
    }

    #[test]
    fn round_into_saturates() {
        let mut src = FloatBlock::zeroed();
        src[0] = 40000.0;
        src[1] = -40000.0;
        src[2] = 2.5;
        src[3] = -2.5;
        src[4] = 0.4;
        src[5] = -0.4;
        let mut dest = IntBlock::zeroed();
        src.round_into(&mut dest);
        assert_eq!(dest[0], i16::MAX);
        assert_eq!(dest[1], i16::MIN);
        assert_eq!(dest[2], 3);
        assert_eq!(dest[3], -3);
        assert_eq!(dest[4], 0);
        assert_eq!(dest[5], 0);
    }

    #[test]
    fn normalize_shifts_and_clamps() {
        let mut block = FloatBlock::zeroed();
        block[0] = 0.0;
        block[1] = -200.0;
        block[2] = 200.0;
        block[3] = 10.4;
        block.normalize(255.0);
        assert_eq!(block[0], 128.0);
        assert_eq!(block[1], 0.0);
        assert_eq!(block[2], 255.0);
        assert_eq!(block[3], 138.0);
    }

    #[test]
    fn normalize_12_bit_offset() {
        let mut block = FloatBlock::zeroed();
        block.normalize(4095.0);
        assert_eq!(block[0], 2048.0);
    }

    #[test]
    fn scaled_copy_duplicates_samples() {
        let mut block = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            block[i] = i as f32;
        }
        let mut plane = vec![0.0f32; 16 * 16];
        block.scaled_copy_to(&mut plane, 16, 2, 2);
        for r in 0..16 {
            for c in 0..16 {
                assert_eq!(plane[r * 16 + c], block[(r / 2, c / 2)]);
            }
        }
    }

    #[test]
    fn from_slice_rejects_short_source() {
        let short = [0i16; 63];
        assert_eq!(
            IntBlock::from_slice(&short),
            Err(SpectralError::SourceTooSmall {
                expected: 64,
                actual: 63,
            })
        );
        let exact: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let block = FloatBlock::from_slice(&exact).unwrap();
        assert_eq!(block[63], 63.0);
    }

    #[test]
    fn int_arithmetic_saturates() {
        let mut block = IntBlock::zeroed();
        block[0] = 30000;
        block[1] = -5;
        block.add_to_all(10000);
        assert_eq!(block[0], i16::MAX);
        assert_eq!(block[1], 9995);

        let mut other = IntBlock::zeroed();
        other[0] = 2;
        other[1] = -9995;
        block.multiply_elements(&other);
        assert_eq!(block[0], i16::MAX);
        assert_eq!(block[1], i16::MIN);

        let widened = block.widen();
        assert_eq!(widened[0], f32::from(i16::MAX));
    }

    #[test]
    fn copy_to_fills_prefix() {
        let mut block = IntBlock::zeroed();
        block[63] = -7;
        let mut out = [0i16; 70];
        block.copy_to(&mut out);
        assert_eq!(out[63], -7);
        assert_eq!(out[64], 0);
    }

    #[test]
    fn last_non_zero_positions() {
        let mut block = IntBlock::zeroed();
        assert_eq!(block.last_non_zero(), None);
        block[0] = 3;
        assert_eq!(block.last_non_zero(), Some(0));
        block[41] = -1;
        assert_eq!(block.last_non_zero(), Some(41));
    }
}
