//! Scalar 8x8 forward and inverse DCT.
//!
//! The forward transform is the AAN factorization. Its output is scaled per
//! coefficient by `8 * aan(u) * aan(v)` (see [`fdct_scale`]); the quantizer
//! folds the correction into its reciprocal table, so it never costs extra
//! multiplies. Both forward passes run along columns with a transpose in
//! between, which leaves the coefficient block transposed. The quantizer
//! compensates with the transposing zigzag.
//!
//! The inverse transform is the float LLM factorization. It expects its input
//! already transposed with the `1/8` pass normalization pre-folded into the
//! dequantization table, and produces spatial samples in natural orientation.

use crate::block::{FloatBlock, BLOCK_DIM};
use num_enum::{IntoPrimitive, TryFromPrimitive};

const F_0_382683: f32 = 0.382683433;
const F_0_541196: f32 = 0.541196100;
const F_0_707107: f32 = 0.707106781;
const F_1_306563: f32 = 1.306562965;

const F_0_298631: f32 = 0.298631336;
const F_0_390181: f32 = 0.390180644;
const F_0_765367: f32 = 0.765366865;
const F_0_899976: f32 = 0.899976223;
const F_1_175876: f32 = 1.175875602;
const F_1_501321: f32 = 1.501321110;
const F_1_847759: f32 = 1.847759065;
const F_1_961571: f32 = 1.961570560;
const F_2_053120: f32 = 2.053119869;
const F_2_562915: f32 = 2.562915447;
const F_3_072711: f32 = 3.072711026;

/// Per-dimension AAN post-scale factors: `aan(0) = 1`,
/// `aan(k) = cos(k * PI / 16) * sqrt(2)`.
const AAN_SCALE: [f32; 8] = [
    1.0,
    1.387039845,
    1.306562965,
    1.175875602,
    1.0,
    0.785694958,
    0.541196100,
    0.275899379,
];

/// Scale carried by forward-transform coefficient `index` (natural order)
/// relative to the orthonormal DCT: `8 * aan(u) * aan(v)`.
pub fn fdct_scale(index: usize) -> f32 {
    AAN_SCALE[index % BLOCK_DIM] * AAN_SCALE[index / BLOCK_DIM] * 8.0
}

/// Forward 8x8 DCT, in place. Output is transposed and AAN-scaled.
pub fn fdct(block: &mut FloatBlock) {
    fdct_pass(block);
    block.transpose();
    fdct_pass(block);
}

/// One AAN pass over the eight columns.
fn fdct_pass(block: &mut FloatBlock) {
    let b = &mut block.0;
    for col in 0..BLOCK_DIM {
        let s0 = b[col];
        let s1 = b[col + 8];
        let s2 = b[col + 16];
        let s3 = b[col + 24];
        let s4 = b[col + 32];
        let s5 = b[col + 40];
        let s6 = b[col + 48];
        let s7 = b[col + 56];

        let tmp0 = s0 + s7;
        let tmp7 = s0 - s7;
        let tmp1 = s1 + s6;
        let tmp6 = s1 - s6;
        let tmp2 = s2 + s5;
        let tmp5 = s2 - s5;
        let tmp3 = s3 + s4;
        let tmp4 = s3 - s4;

        // even part
        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        b[col] = tmp10 + tmp11;
        b[col + 32] = tmp10 - tmp11;

        let z1 = (tmp12 + tmp13) * F_0_707107;
        b[col + 16] = tmp13 + z1;
        b[col + 48] = tmp13 - z1;

        // odd part
        let tmp10 = tmp4 + tmp5;
        let tmp11 = tmp5 + tmp6;
        let tmp12 = tmp6 + tmp7;

        let z5 = (tmp10 - tmp12) * F_0_382683;
        let z2 = F_0_541196 * tmp10 + z5;
        let z4 = F_1_306563 * tmp12 + z5;
        let z3 = tmp11 * F_0_707107;

        let z11 = tmp7 + z3;
        let z13 = tmp7 - z3;

        b[col + 40] = z13 + z2;
        b[col + 24] = z13 - z2;
        b[col + 8] = z11 + z4;
        b[col + 56] = z11 - z4;
    }
}

/// Inverse 8x8 DCT, in place. Input must be transposed with the pass
/// normalization folded into the dequantizers; output is natural orientation.
pub fn idct(block: &mut FloatBlock) {
    idct_pass(block);
    block.transpose();
    idct_pass(block);
}

/// One LLM pass over the eight columns.
fn idct_pass(block: &mut FloatBlock) {
    let b = &mut block.0;
    for col in 0..BLOCK_DIM {
        let s0 = b[col];
        let s1 = b[col + 8];
        let s2 = b[col + 16];
        let s3 = b[col + 24];
        let s4 = b[col + 32];
        let s5 = b[col + 40];
        let s6 = b[col + 48];
        let s7 = b[col + 56];

        // odd part
        let z0 = s1 + s7;
        let mut z2 = s3 + s7;
        let z1 = s3 + s5;
        let mut z3 = s1 + s5;
        let z4 = (z0 + z1) * F_1_175876;
        z2 = z2 * -F_1_961571 + z4;
        z3 = z3 * -F_0_390181 + z4;
        let z0 = z0 * -F_0_899976;
        let z1 = z1 * -F_2_562915;

        let b3 = s7 * F_0_298631 + z0 + z2;
        let b2 = s5 * F_2_053120 + z1 + z3;
        let b1 = s3 * F_3_072711 + z1 + z2;
        let b0 = s1 * F_1_501321 + z0 + z3;

        // even part
        let z4 = (s2 + s6) * F_0_541196;
        let z0 = s0 + s4;
        let z1 = s0 - s4;
        let z2 = z4 + s6 * -F_1_847759;
        let z3 = z4 + s2 * F_0_765367;

        let a0 = z0 + z3;
        let a3 = z0 - z3;
        let a1 = z1 + z2;
        let a2 = z1 - z2;

        b[col] = a0 + b0;
        b[col + 56] = a0 - b0;
        b[col + 8] = a1 + b1;
        b[col + 48] = a1 - b1;
        b[col + 16] = a2 + b2;
        b[col + 40] = a2 - b2;
        b[col + 24] = a3 + b3;
        b[col + 32] = a3 - b3;
    }
}

/// Output resolution of a reduced inverse transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ScaledSize {
    OneByOne = 1,
    TwoByTwo = 2,
    FourByFour = 4,
    FullSize = 8,
}

/// Reduced inverse DCT dispatch.
///
/// The reduced variants require every coefficient outside the top-left
/// `n x n` corner to be zero, which holds for the thumbnail decode path that
/// drops high-frequency coefficients before dequantization. Under that
/// precondition their output matches the corresponding corner of the full
/// transform exactly. Outputs land in the top-left `n x n` samples of the
/// block; the remaining slots are left untouched.
pub fn idct_scaled(block: &mut FloatBlock, size: ScaledSize) {
    match size {
        ScaledSize::OneByOne => idct_1x1(block),
        ScaledSize::TwoByTwo => idct_2x2(block),
        ScaledSize::FourByFour => idct_4x4(block),
        ScaledSize::FullSize => idct(block),
    }
}

/// Reduced inverse producing the top-left 4x4 spatial samples.
pub fn idct_4x4(block: &mut FloatBlock) {
    let mut tmp = [0.0f32; 16];
    for col in 0..4 {
        let s = [
            block.0[col],
            block.0[col + 8],
            block.0[col + 16],
            block.0[col + 24],
        ];
        let o = idct_kernel_4(s);
        for (k, v) in o.into_iter().enumerate() {
            tmp[k * 4 + col] = v;
        }
    }
    for col in 0..4 {
        // second pass reads the transpose of the intermediate
        let s = [tmp[col * 4], tmp[col * 4 + 1], tmp[col * 4 + 2], tmp[col * 4 + 3]];
        let o = idct_kernel_4(s);
        for (k, v) in o.into_iter().enumerate() {
            block.0[k * 8 + col] = v;
        }
    }
}

/// The LLM column kernel with coefficients 4..8 pinned to zero.
fn idct_kernel_4(s: [f32; 4]) -> [f32; 4] {
    let [s0, s1, s2, s3] = s;

    let z4 = (s1 + s3) * F_1_175876;
    let z2 = s3 * -F_1_961571 + z4;
    let z3 = s1 * -F_0_390181 + z4;
    let z0 = s1 * -F_0_899976;
    let z1 = s3 * -F_2_562915;

    let b3 = z0 + z2;
    let b2 = z1 + z3;
    let b1 = s3 * F_3_072711 + z1 + z2;
    let b0 = s1 * F_1_501321 + z0 + z3;

    let z4 = s2 * F_0_541196;
    let z2 = z4;
    let z3 = z4 + s2 * F_0_765367;

    let a0 = s0 + z3;
    let a3 = s0 - z3;
    let a1 = s0 + z2;
    let a2 = s0 - z2;

    [a0 + b0, a1 + b1, a2 + b2, a3 + b3]
}

/// Reduced inverse producing the top-left 2x2 spatial samples.
pub fn idct_2x2(block: &mut FloatBlock) {
    let mut tmp = [0.0f32; 4];
    for col in 0..2 {
        let o = idct_kernel_2([block.0[col], block.0[col + 8]]);
        tmp[col] = o[0];
        tmp[2 + col] = o[1];
    }
    for col in 0..2 {
        let o = idct_kernel_2([tmp[col * 2], tmp[col * 2 + 1]]);
        block.0[col] = o[0];
        block.0[8 + col] = o[1];
    }
}

/// The LLM column kernel with coefficients 2..8 pinned to zero.
fn idct_kernel_2(s: [f32; 2]) -> [f32; 2] {
    let [s0, s1] = s;

    let z4 = s1 * F_1_175876;
    let z3 = s1 * -F_0_390181 + z4;
    let z0 = s1 * -F_0_899976;

    let b0 = s1 * F_1_501321 + z0 + z3;
    let b1 = z4;

    [s0 + b0, s0 + b1]
}

/// Reduced inverse producing only the block average. With the pass
/// normalization folded into the dequantizer, that is the dequantized DC
/// coefficient itself.
pub fn idct_1x1(block: &mut FloatBlock) {
    let _ = block;
}
