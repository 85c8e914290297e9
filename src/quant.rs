//! Quantization tables, quality-factor scaling and quality estimation.
//!
//! A [`QuantTable`] holds divisors in natural order. The transform pipelines
//! never divide by them directly: the encoder pre-computes a transposed
//! reciprocal table with the AAN coefficient scale folded in, and the decoder
//! pre-computes a transposed multiplier table with the inverse-transform pass
//! normalization folded in.

use crate::block::{round_away_from_zero, FloatBlock, IntBlock, BLOCK_SIZE};
use crate::dct::fdct_scale;
use crate::error::{Result, SpectralError};
use crate::zigzag::TRANSPOSING_ZIGZAG_ORDER;

/// Annex K luminance base table (quality 50).
#[rustfmt::skip]
pub const BASE_LUMINANCE_TABLE: [u16; BLOCK_SIZE] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Annex K chrominance base table (quality 50).
#[rustfmt::skip]
pub const BASE_CHROMINANCE_TABLE: [u16; BLOCK_SIZE] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Ratio credited to a zero divisor during quality estimation, standing in
/// for "infinitely coarse" without overflowing the average.
const ZERO_DIVISOR_RATIO: f64 = 25500.0;

/// An 8x8 table of quantization divisors in natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    entries: [u16; BLOCK_SIZE],
}

impl QuantTable {
    /// Builds a table from divisors parsed out of a DQT segment.
    /// Every entry must be non-zero.
    pub fn from_raw(entries: [u16; BLOCK_SIZE]) -> Result<Self> {
        if let Some(index) = entries.iter().position(|&v| v == 0) {
            return Err(SpectralError::ZeroQuantizerValue { index });
        }
        Ok(Self { entries })
    }

    /// Scales a base table by a quality factor in `1..=100`.
    ///
    /// Quality 50 reproduces the base table, quality 100 yields all ones
    /// (lossless quantization) and quality 1 the coarsest divisors.
    pub fn from_quality(quality: u32, base: &[u16; BLOCK_SIZE]) -> Result<Self> {
        if quality == 0 || quality > 100 {
            return Err(SpectralError::InvalidQuality { value: quality });
        }
        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        };
        let mut entries = [0u16; BLOCK_SIZE];
        for (e, &b) in entries.iter_mut().zip(base.iter()) {
            *e = ((u32::from(b) * scale + 50) / 100).clamp(1, 255) as u16;
        }
        Ok(Self { entries })
    }

    /// Luminance table for the given quality factor.
    pub fn luminance_for_quality(quality: u32) -> Result<Self> {
        Self::from_quality(quality, &BASE_LUMINANCE_TABLE)
    }

    /// Chrominance table for the given quality factor.
    pub fn chrominance_for_quality(quality: u32) -> Result<Self> {
        Self::from_quality(quality, &BASE_CHROMINANCE_TABLE)
    }

    pub fn entries(&self) -> &[u16; BLOCK_SIZE] {
        &self.entries
    }

    /// Reciprocal multipliers for the encoder, with the forward transform's
    /// per-coefficient AAN scale divided out. The table is transposed to
    /// match the transposed layout the forward transform produces.
    pub fn fdct_reciprocals(&self) -> FloatBlock {
        let mut out = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            out[i] = 1.0 / (f32::from(self.entries[i]) * fdct_scale(i));
        }
        out.transpose();
        out
    }

    /// Dequantization multipliers for the decoder, with the inverse
    /// transform's `1/8` pass normalization folded in. The table is
    /// transposed to match the input layout the inverse transform expects.
    pub fn idct_dequantizers(&self) -> FloatBlock {
        let mut out = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            out[i] = f32::from(self.entries[i]) * 0.125;
        }
        out.transpose();
        out
    }
}

/// Quantizes a transposed coefficient block straight into scan order.
///
/// `reciprocals` comes from [`QuantTable::fdct_reciprocals`]. Each product is
/// rounded half away from zero and saturated to `i16`; the transposing zigzag
/// undoes the forward transform's transposition while reordering.
pub fn quantize(block: &FloatBlock, reciprocals: &FloatBlock, dest: &mut IntBlock) {
    for i in 0..BLOCK_SIZE {
        let src = TRANSPOSING_ZIGZAG_ORDER[i] as usize;
        dest[i] = round_away_from_zero(block[src] * reciprocals[src]);
    }
}

/// Expands a natural-order coefficient block into the transposed float block
/// the inverse transform consumes.
///
/// `dequantizers` comes from [`QuantTable::idct_dequantizers`]; the gather
/// fuses the transposition with the multiply.
pub fn dequantize(block: &IntBlock, dequantizers: &FloatBlock, dest: &mut FloatBlock) {
    for i in 0..BLOCK_SIZE {
        let transposed = (i % 8) * 8 + i / 8;
        dest[i] = f32::from(block[transposed]) * dequantizers[i];
    }
}

/// Estimates the quality factor a table was scaled with, by comparing it
/// against the base table it presumably came from.
///
/// The inverse of the [`QuantTable::from_quality`] mapping, evaluated on the
/// average table-to-base ratio. An all-ones table is quality 100 outright.
/// Zero divisors (malformed tables) count as [`ZERO_DIVISOR_RATIO`].
pub fn estimate_quality(entries: &[u16; BLOCK_SIZE], base: &[u16; BLOCK_SIZE]) -> u32 {
    if entries.iter().all(|&v| v == 1) {
        return 100;
    }
    let mut sum = 0.0f64;
    for (&e, &b) in entries.iter().zip(base.iter()) {
        sum += if e == 0 {
            ZERO_DIVISOR_RATIO
        } else {
            100.0 * f64::from(e) / f64::from(b)
        };
    }
    let avg = sum / BLOCK_SIZE as f64;
    let quality = if avg <= 100.0 {
        (200.0 - avg) / 2.0
    } else {
        5000.0 / avg
    };
    (quality + 0.5).floor().clamp(1.0, 100.0) as u32
}

/// [`estimate_quality`] against the Annex K luminance base table.
pub fn estimate_luminance_quality(entries: &[u16; BLOCK_SIZE]) -> u32 {
    estimate_quality(entries, &BASE_LUMINANCE_TABLE)
}

/// [`estimate_quality`] against the Annex K chrominance base table.
pub fn estimate_chrominance_quality(entries: &[u16; BLOCK_SIZE]) -> u32 {
    estimate_quality(entries, &BASE_CHROMINANCE_TABLE)
}
