//! 256-bit kernels. Everything here requires AVX2 and FMA.
//!
//! A whole 8x8 float block fits in eight ymm registers, so both DCT passes
//! run their butterflies across full rows. The forward pass sticks to plain
//! multiply/add and stays bit-identical to the other tiers; the inverse pass
//! contracts its constant multiplies into FMA and can differ from the scalar
//! tier in the last float bit, which the final integer rounding absorbs.
//!
//! The zigzag gather works on row pairs: a cross-lane dword permute first
//! pulls the contributing quads into the right 128-bit lane, then an
//! in-lane byte shuffle places the coefficients.

#![allow(clippy::too_many_lines)]

use super::sse;
use crate::block::{FloatBlock, IntBlock};
use std::arch::x86_64::*;

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

#[target_feature(enable = "avx2,fma")]
pub unsafe fn fdct(block: &mut FloatBlock) {
    fdct_pass(block);
    transpose_f32(block);
    fdct_pass(block);
}

#[target_feature(enable = "avx2,fma")]
pub unsafe fn idct(block: &mut FloatBlock) {
    idct_pass(block);
    transpose_f32(block);
    idct_pass(block);
}

/// AAN butterflies over all eight columns at once.
#[target_feature(enable = "avx2,fma")]
unsafe fn fdct_pass(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();
    let s0 = _mm256_loadu_ps(p);
    let s1 = _mm256_loadu_ps(p.add(8));
    let s2 = _mm256_loadu_ps(p.add(16));
    let s3 = _mm256_loadu_ps(p.add(24));
    let s4 = _mm256_loadu_ps(p.add(32));
    let s5 = _mm256_loadu_ps(p.add(40));
    let s6 = _mm256_loadu_ps(p.add(48));
    let s7 = _mm256_loadu_ps(p.add(56));

    let tmp0 = _mm256_add_ps(s0, s7);
    let tmp7 = _mm256_sub_ps(s0, s7);
    let tmp1 = _mm256_add_ps(s1, s6);
    let tmp6 = _mm256_sub_ps(s1, s6);
    let tmp2 = _mm256_add_ps(s2, s5);
    let tmp5 = _mm256_sub_ps(s2, s5);
    let tmp3 = _mm256_add_ps(s3, s4);
    let tmp4 = _mm256_sub_ps(s3, s4);

    // even part
    let tmp10 = _mm256_add_ps(tmp0, tmp3);
    let tmp13 = _mm256_sub_ps(tmp0, tmp3);
    let tmp11 = _mm256_add_ps(tmp1, tmp2);
    let tmp12 = _mm256_sub_ps(tmp1, tmp2);

    _mm256_storeu_ps(p, _mm256_add_ps(tmp10, tmp11));
    _mm256_storeu_ps(p.add(32), _mm256_sub_ps(tmp10, tmp11));

    let z1 = _mm256_mul_ps(_mm256_add_ps(tmp12, tmp13), _mm256_set1_ps(F_0_707107));
    _mm256_storeu_ps(p.add(16), _mm256_add_ps(tmp13, z1));
    _mm256_storeu_ps(p.add(48), _mm256_sub_ps(tmp13, z1));

    // odd part
    let tmp10 = _mm256_add_ps(tmp4, tmp5);
    let tmp11 = _mm256_add_ps(tmp5, tmp6);
    let tmp12 = _mm256_add_ps(tmp6, tmp7);

    let z5 = _mm256_mul_ps(_mm256_sub_ps(tmp10, tmp12), _mm256_set1_ps(F_0_382683));
    let z2 = _mm256_add_ps(_mm256_mul_ps(_mm256_set1_ps(F_0_541196), tmp10), z5);
    let z4 = _mm256_add_ps(_mm256_mul_ps(_mm256_set1_ps(F_1_306563), tmp12), z5);
    let z3 = _mm256_mul_ps(tmp11, _mm256_set1_ps(F_0_707107));

    let z11 = _mm256_add_ps(tmp7, z3);
    let z13 = _mm256_sub_ps(tmp7, z3);

    _mm256_storeu_ps(p.add(40), _mm256_add_ps(z13, z2));
    _mm256_storeu_ps(p.add(24), _mm256_sub_ps(z13, z2));
    _mm256_storeu_ps(p.add(8), _mm256_add_ps(z11, z4));
    _mm256_storeu_ps(p.add(56), _mm256_sub_ps(z11, z4));
}

/// LLM butterflies over all eight columns at once, constants contracted
/// into FMA.
#[target_feature(enable = "avx2,fma")]
unsafe fn idct_pass(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();
    let s0 = _mm256_loadu_ps(p);
    let s1 = _mm256_loadu_ps(p.add(8));
    let s2 = _mm256_loadu_ps(p.add(16));
    let s3 = _mm256_loadu_ps(p.add(24));
    let s4 = _mm256_loadu_ps(p.add(32));
    let s5 = _mm256_loadu_ps(p.add(40));
    let s6 = _mm256_loadu_ps(p.add(48));
    let s7 = _mm256_loadu_ps(p.add(56));

    // odd part
    let z0 = _mm256_add_ps(s1, s7);
    let mut z2 = _mm256_add_ps(s3, s7);
    let z1 = _mm256_add_ps(s3, s5);
    let mut z3 = _mm256_add_ps(s1, s5);
    let z4 = _mm256_mul_ps(_mm256_add_ps(z0, z1), _mm256_set1_ps(F_1_175876));
    z2 = _mm256_fmadd_ps(z2, _mm256_set1_ps(-F_1_961571), z4);
    z3 = _mm256_fmadd_ps(z3, _mm256_set1_ps(-F_0_390181), z4);
    let z0 = _mm256_mul_ps(z0, _mm256_set1_ps(-F_0_899976));
    let z1 = _mm256_mul_ps(z1, _mm256_set1_ps(-F_2_562915));

    let b3 = _mm256_add_ps(_mm256_fmadd_ps(s7, _mm256_set1_ps(F_0_298631), z0), z2);
    let b2 = _mm256_add_ps(_mm256_fmadd_ps(s5, _mm256_set1_ps(F_2_053120), z1), z3);
    let b1 = _mm256_add_ps(_mm256_fmadd_ps(s3, _mm256_set1_ps(F_3_072711), z1), z2);
    let b0 = _mm256_add_ps(_mm256_fmadd_ps(s1, _mm256_set1_ps(F_1_501321), z0), z3);

    // even part
    let z4 = _mm256_mul_ps(_mm256_add_ps(s2, s6), _mm256_set1_ps(F_0_541196));
    let z0 = _mm256_add_ps(s0, s4);
    let z1 = _mm256_sub_ps(s0, s4);
    let z2 = _mm256_fmadd_ps(s6, _mm256_set1_ps(-F_1_847759), z4);
    let z3 = _mm256_fmadd_ps(s2, _mm256_set1_ps(F_0_765367), z4);

    let a0 = _mm256_add_ps(z0, z3);
    let a3 = _mm256_sub_ps(z0, z3);
    let a1 = _mm256_add_ps(z1, z2);
    let a2 = _mm256_sub_ps(z1, z2);

    _mm256_storeu_ps(p, _mm256_add_ps(a0, b0));
    _mm256_storeu_ps(p.add(56), _mm256_sub_ps(a0, b0));
    _mm256_storeu_ps(p.add(8), _mm256_add_ps(a1, b1));
    _mm256_storeu_ps(p.add(48), _mm256_sub_ps(a1, b1));
    _mm256_storeu_ps(p.add(16), _mm256_add_ps(a2, b2));
    _mm256_storeu_ps(p.add(40), _mm256_sub_ps(a2, b2));
    _mm256_storeu_ps(p.add(24), _mm256_add_ps(a3, b3));
    _mm256_storeu_ps(p.add(32), _mm256_sub_ps(a3, b3));
}

/// In-place 8x8 float transpose: interleave pairs, stitch quads, swap the
/// 128-bit halves.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn transpose_f32(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();
    let r0 = _mm256_loadu_ps(p);
    let r1 = _mm256_loadu_ps(p.add(8));
    let r2 = _mm256_loadu_ps(p.add(16));
    let r3 = _mm256_loadu_ps(p.add(24));
    let r4 = _mm256_loadu_ps(p.add(32));
    let r5 = _mm256_loadu_ps(p.add(40));
    let r6 = _mm256_loadu_ps(p.add(48));
    let r7 = _mm256_loadu_ps(p.add(56));

    let t0 = _mm256_unpacklo_ps(r0, r1);
    let t1 = _mm256_unpackhi_ps(r0, r1);
    let t2 = _mm256_unpacklo_ps(r2, r3);
    let t3 = _mm256_unpackhi_ps(r2, r3);
    let t4 = _mm256_unpacklo_ps(r4, r5);
    let t5 = _mm256_unpackhi_ps(r4, r5);
    let t6 = _mm256_unpacklo_ps(r6, r7);
    let t7 = _mm256_unpackhi_ps(r6, r7);

    let q0 = _mm256_shuffle_ps::<0x44>(t0, t2);
    let q1 = _mm256_shuffle_ps::<0xEE>(t0, t2);
    let q2 = _mm256_shuffle_ps::<0x44>(t1, t3);
    let q3 = _mm256_shuffle_ps::<0xEE>(t1, t3);
    let q4 = _mm256_shuffle_ps::<0x44>(t4, t6);
    let q5 = _mm256_shuffle_ps::<0xEE>(t4, t6);
    let q6 = _mm256_shuffle_ps::<0x44>(t5, t7);
    let q7 = _mm256_shuffle_ps::<0xEE>(t5, t7);

    _mm256_storeu_ps(p, _mm256_permute2f128_ps::<0x20>(q0, q4));
    _mm256_storeu_ps(p.add(8), _mm256_permute2f128_ps::<0x20>(q1, q5));
    _mm256_storeu_ps(p.add(16), _mm256_permute2f128_ps::<0x20>(q2, q6));
    _mm256_storeu_ps(p.add(24), _mm256_permute2f128_ps::<0x20>(q3, q7));
    _mm256_storeu_ps(p.add(32), _mm256_permute2f128_ps::<0x31>(q0, q4));
    _mm256_storeu_ps(p.add(40), _mm256_permute2f128_ps::<0x31>(q1, q5));
    _mm256_storeu_ps(p.add(48), _mm256_permute2f128_ps::<0x31>(q2, q6));
    _mm256_storeu_ps(p.add(56), _mm256_permute2f128_ps::<0x31>(q3, q7));
}

/// Rounds half away from zero, clamps to the `i16` range and truncates.
/// Matches the scalar rounding for every finite input, including `-0.0`.
#[target_feature(enable = "avx2,fma")]
unsafe fn round_clamp_i32(v: __m256) -> __m256i {
    let sign = _mm256_and_ps(v, _mm256_set1_ps(-0.0));
    let rounded = _mm256_add_ps(v, _mm256_or_ps(sign, _mm256_set1_ps(0.5)));
    let clamped = _mm256_min_ps(
        _mm256_max_ps(rounded, _mm256_set1_ps(-32768.0)),
        _mm256_set1_ps(32767.0),
    );
    _mm256_cvttps_epi32(clamped)
}

/// Fused quantize + transpose + zigzag into scan order.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn quantize(block: &FloatBlock, reciprocals: &FloatBlock, dest: &mut IntBlock) {
    let bp = block.as_slice().as_ptr();
    let rp = reciprocals.as_slice().as_ptr();

    let mut tmp = IntBlock::zeroed();
    let tp = tmp.as_mut_slice().as_mut_ptr();
    for pair in 0..4 {
        let lo = round_clamp_i32(_mm256_mul_ps(
            _mm256_loadu_ps(bp.add(pair * 16)),
            _mm256_loadu_ps(rp.add(pair * 16)),
        ));
        let hi = round_clamp_i32(_mm256_mul_ps(
            _mm256_loadu_ps(bp.add(pair * 16 + 8)),
            _mm256_loadu_ps(rp.add(pair * 16 + 8)),
        ));
        // packs interleaves the 128-bit lanes; permute restores row order
        let packed = _mm256_packs_epi32(lo, hi);
        let ordered = _mm256_permute4x64_epi64::<0b11011000>(packed);
        _mm256_storeu_si256(tp.add(pair * 16).cast::<__m256i>(), ordered);
    }

    sse::transpose_i16(&mut tmp);
    gather_zigzag(&tmp, dest);
}

/// Shuffle controls for the scan-order gather. Entries used as dword permute
/// indices hold one little-endian `i32` per quad; entries used as byte
/// shuffles follow `vpshufb` semantics per 128-bit lane, `0xFF` zeroing.
#[rustfmt::skip]
const AVX_MASKS: [[u8; 32]; 18] = [
    [0, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0],
    [0, 1, 2, 3, 8, 9, 0xFF, 0xFF, 10, 11, 4, 5, 6, 7, 12, 13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 4, 5, 6, 7],
    [0, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 8, 9, 0xFF, 0xFF, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [3, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 3, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF],
    [4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 0, 1, 2, 3, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 6, 7, 12, 13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 12, 13],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 8, 9, 0xFF, 0xFF, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 0, 1, 0xFF, 0xFF, 2, 3, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [1, 0, 0, 0, 2, 0, 0, 0, 5, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 2, 0, 0, 0, 3, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0],
    [2, 3, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 8, 9, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 8, 9, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 0, 1, 0xFF, 0xFF, 2, 3, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [8, 9, 10, 11, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 8, 9, 10, 11, 4, 5, 0xFF, 0xFF, 6, 7, 12, 13, 14, 15],
];

#[target_feature(enable = "avx2,fma")]
unsafe fn mask(i: usize) -> __m256i {
    _mm256_loadu_si256(AVX_MASKS[i].as_ptr().cast::<__m256i>())
}

/// Scan-order gather of an untransposed block, two rows per vector.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn gather_zigzag(src: &IntBlock, dest: &mut IntBlock) {
    let sp = src.as_slice().as_ptr().cast::<__m256i>();
    let ab = _mm256_loadu_si256(sp);
    let cd = _mm256_loadu_si256(sp.add(1));
    let ef = _mm256_loadu_si256(sp.add(2));
    let gh = _mm256_loadu_si256(sp.add(3));

    let cross0 = mask(0);
    let cross2 = mask(2);
    let cross5 = mask(5);
    let cross12 = mask(12);

    let rows0123_ef = _mm256_permutevar8x32_epi32(ef, cross0);
    let row01 = _mm256_or_si256(
        _mm256_or_si256(
            _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(ab, cross0), mask(1)),
            _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(cd, cross2), mask(3)),
        ),
        _mm256_shuffle_epi8(rows0123_ef, mask(4)),
    );

    let rows2345_ab = _mm256_permutevar8x32_epi32(ab, cross5);
    let rows2345_gh = _mm256_permutevar8x32_epi32(gh, cross2);
    let row23 = _mm256_or_si256(
        _mm256_or_si256(
            _mm256_shuffle_epi8(rows2345_ab, mask(6)),
            _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(cd, cross0), mask(7)),
        ),
        _mm256_or_si256(
            _mm256_shuffle_epi8(rows0123_ef, mask(8)),
            _mm256_shuffle_epi8(rows2345_gh, mask(9)),
        ),
    );

    let rows4567_cd = _mm256_permutevar8x32_epi32(cd, cross5);
    let row45 = _mm256_or_si256(
        _mm256_or_si256(
            _mm256_shuffle_epi8(rows2345_ab, mask(10)),
            _mm256_shuffle_epi8(rows4567_cd, mask(11)),
        ),
        _mm256_or_si256(
            _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(ef, cross12), mask(13)),
            _mm256_shuffle_epi8(rows2345_gh, mask(14)),
        ),
    );

    let row67 = _mm256_or_si256(
        _mm256_or_si256(
            _mm256_shuffle_epi8(rows4567_cd, mask(15)),
            _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(ef, cross5), mask(16)),
        ),
        _mm256_shuffle_epi8(_mm256_permutevar8x32_epi32(gh, cross12), mask(17)),
    );

    let dp = dest.as_mut_slice().as_mut_ptr().cast::<__m256i>();
    _mm256_storeu_si256(dp, row01);
    _mm256_storeu_si256(dp.add(1), row23);
    _mm256_storeu_si256(dp.add(2), row45);
    _mm256_storeu_si256(dp.add(3), row67);
}

/// Scan-order gather of a transposed block.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn gather_transposing_zigzag(src: &IntBlock, dest: &mut IntBlock) {
    let mut tmp = *src;
    sse::transpose_i16(&mut tmp);
    gather_zigzag(&tmp, dest);
}
