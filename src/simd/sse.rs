//! 128-bit kernels. Everything here requires SSSE3.
//!
//! The DCT passes run the same butterfly sequence as the scalar module on
//! four columns at a time, so their results are bit-identical to the scalar
//! tier. The zigzag gathers are byte-shuffle networks: each output row of the
//! scan order touches at most five source rows, so it can be assembled from a
//! handful of `pshufb` lookups or-ed together.

#![allow(clippy::too_many_lines)]

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

#[target_feature(enable = "ssse3")]
pub unsafe fn fdct(block: &mut FloatBlock) {
    fdct_pass(block);
    transpose_f32(block);
    fdct_pass(block);
}

#[target_feature(enable = "ssse3")]
pub unsafe fn idct(block: &mut FloatBlock) {
    idct_pass(block);
    transpose_f32(block);
    idct_pass(block);
}

/// AAN butterflies over all eight columns, four at a time.
#[target_feature(enable = "ssse3")]
unsafe fn fdct_pass(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();
    for half in 0..2 {
        let base = p.add(half * 4);
        let s0 = _mm_loadu_ps(base);
        let s1 = _mm_loadu_ps(base.add(8));
        let s2 = _mm_loadu_ps(base.add(16));
        let s3 = _mm_loadu_ps(base.add(24));
        let s4 = _mm_loadu_ps(base.add(32));
        let s5 = _mm_loadu_ps(base.add(40));
        let s6 = _mm_loadu_ps(base.add(48));
        let s7 = _mm_loadu_ps(base.add(56));

        let tmp0 = _mm_add_ps(s0, s7);
        let tmp7 = _mm_sub_ps(s0, s7);
        let tmp1 = _mm_add_ps(s1, s6);
        let tmp6 = _mm_sub_ps(s1, s6);
        let tmp2 = _mm_add_ps(s2, s5);
        let tmp5 = _mm_sub_ps(s2, s5);
        let tmp3 = _mm_add_ps(s3, s4);
        let tmp4 = _mm_sub_ps(s3, s4);

        // even part
        let tmp10 = _mm_add_ps(tmp0, tmp3);
        let tmp13 = _mm_sub_ps(tmp0, tmp3);
        let tmp11 = _mm_add_ps(tmp1, tmp2);
        let tmp12 = _mm_sub_ps(tmp1, tmp2);

        _mm_storeu_ps(base, _mm_add_ps(tmp10, tmp11));
        _mm_storeu_ps(base.add(32), _mm_sub_ps(tmp10, tmp11));

        let z1 = _mm_mul_ps(_mm_add_ps(tmp12, tmp13), _mm_set1_ps(F_0_707107));
        _mm_storeu_ps(base.add(16), _mm_add_ps(tmp13, z1));
        _mm_storeu_ps(base.add(48), _mm_sub_ps(tmp13, z1));

        // odd part
        let tmp10 = _mm_add_ps(tmp4, tmp5);
        let tmp11 = _mm_add_ps(tmp5, tmp6);
        let tmp12 = _mm_add_ps(tmp6, tmp7);

        let z5 = _mm_mul_ps(_mm_sub_ps(tmp10, tmp12), _mm_set1_ps(F_0_382683));
        let z2 = _mm_add_ps(_mm_mul_ps(_mm_set1_ps(F_0_541196), tmp10), z5);
        let z4 = _mm_add_ps(_mm_mul_ps(_mm_set1_ps(F_1_306563), tmp12), z5);
        let z3 = _mm_mul_ps(tmp11, _mm_set1_ps(F_0_707107));

        let z11 = _mm_add_ps(tmp7, z3);
        let z13 = _mm_sub_ps(tmp7, z3);

        _mm_storeu_ps(base.add(40), _mm_add_ps(z13, z2));
        _mm_storeu_ps(base.add(24), _mm_sub_ps(z13, z2));
        _mm_storeu_ps(base.add(8), _mm_add_ps(z11, z4));
        _mm_storeu_ps(base.add(56), _mm_sub_ps(z11, z4));
    }
}

/// LLM butterflies over all eight columns, four at a time.
#[target_feature(enable = "ssse3")]
unsafe fn idct_pass(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();
    for half in 0..2 {
        let base = p.add(half * 4);
        let s0 = _mm_loadu_ps(base);
        let s1 = _mm_loadu_ps(base.add(8));
        let s2 = _mm_loadu_ps(base.add(16));
        let s3 = _mm_loadu_ps(base.add(24));
        let s4 = _mm_loadu_ps(base.add(32));
        let s5 = _mm_loadu_ps(base.add(40));
        let s6 = _mm_loadu_ps(base.add(48));
        let s7 = _mm_loadu_ps(base.add(56));

        // odd part
        let z0 = _mm_add_ps(s1, s7);
        let mut z2 = _mm_add_ps(s3, s7);
        let z1 = _mm_add_ps(s3, s5);
        let mut z3 = _mm_add_ps(s1, s5);
        let z4 = _mm_mul_ps(_mm_add_ps(z0, z1), _mm_set1_ps(F_1_175876));
        z2 = _mm_add_ps(_mm_mul_ps(z2, _mm_set1_ps(-F_1_961571)), z4);
        z3 = _mm_add_ps(_mm_mul_ps(z3, _mm_set1_ps(-F_0_390181)), z4);
        let z0 = _mm_mul_ps(z0, _mm_set1_ps(-F_0_899976));
        let z1 = _mm_mul_ps(z1, _mm_set1_ps(-F_2_562915));

        let b3 = _mm_add_ps(_mm_add_ps(_mm_mul_ps(s7, _mm_set1_ps(F_0_298631)), z0), z2);
        let b2 = _mm_add_ps(_mm_add_ps(_mm_mul_ps(s5, _mm_set1_ps(F_2_053120)), z1), z3);
        let b1 = _mm_add_ps(_mm_add_ps(_mm_mul_ps(s3, _mm_set1_ps(F_3_072711)), z1), z2);
        let b0 = _mm_add_ps(_mm_add_ps(_mm_mul_ps(s1, _mm_set1_ps(F_1_501321)), z0), z3);

        // even part
        let z4 = _mm_mul_ps(_mm_add_ps(s2, s6), _mm_set1_ps(F_0_541196));
        let z0 = _mm_add_ps(s0, s4);
        let z1 = _mm_sub_ps(s0, s4);
        let z2 = _mm_add_ps(z4, _mm_mul_ps(s6, _mm_set1_ps(-F_1_847759)));
        let z3 = _mm_add_ps(z4, _mm_mul_ps(s2, _mm_set1_ps(F_0_765367)));

        let a0 = _mm_add_ps(z0, z3);
        let a3 = _mm_sub_ps(z0, z3);
        let a1 = _mm_add_ps(z1, z2);
        let a2 = _mm_sub_ps(z1, z2);

        _mm_storeu_ps(base, _mm_add_ps(a0, b0));
        _mm_storeu_ps(base.add(56), _mm_sub_ps(a0, b0));
        _mm_storeu_ps(base.add(8), _mm_add_ps(a1, b1));
        _mm_storeu_ps(base.add(48), _mm_sub_ps(a1, b1));
        _mm_storeu_ps(base.add(16), _mm_add_ps(a2, b2));
        _mm_storeu_ps(base.add(40), _mm_sub_ps(a2, b2));
        _mm_storeu_ps(base.add(24), _mm_add_ps(a3, b3));
        _mm_storeu_ps(base.add(32), _mm_sub_ps(a3, b3));
    }
}

/// In-place 8x8 float transpose built from four 4x4 quadrant transposes.
#[target_feature(enable = "ssse3")]
pub unsafe fn transpose_f32(block: &mut FloatBlock) {
    let p = block.as_mut_slice().as_mut_ptr();

    let q00 = transpose4(load_quad(p, 0, 0));
    let q01 = transpose4(load_quad(p, 0, 1));
    let q10 = transpose4(load_quad(p, 1, 0));
    let q11 = transpose4(load_quad(p, 1, 1));

    store_quad(p, 0, 0, q00);
    store_quad(p, 0, 1, q10);
    store_quad(p, 1, 0, q01);
    store_quad(p, 1, 1, q11);
}

#[target_feature(enable = "ssse3")]
unsafe fn load_quad(p: *const f32, qr: usize, qc: usize) -> [__m128; 4] {
    let base = p.add(qr * 32 + qc * 4);
    [
        _mm_loadu_ps(base),
        _mm_loadu_ps(base.add(8)),
        _mm_loadu_ps(base.add(16)),
        _mm_loadu_ps(base.add(24)),
    ]
}

#[target_feature(enable = "ssse3")]
unsafe fn store_quad(p: *mut f32, qr: usize, qc: usize, q: [__m128; 4]) {
    let base = p.add(qr * 32 + qc * 4);
    _mm_storeu_ps(base, q[0]);
    _mm_storeu_ps(base.add(8), q[1]);
    _mm_storeu_ps(base.add(16), q[2]);
    _mm_storeu_ps(base.add(24), q[3]);
}

#[target_feature(enable = "ssse3")]
unsafe fn transpose4(q: [__m128; 4]) -> [__m128; 4] {
    let t0 = _mm_unpacklo_ps(q[0], q[1]);
    let t1 = _mm_unpacklo_ps(q[2], q[3]);
    let t2 = _mm_unpackhi_ps(q[0], q[1]);
    let t3 = _mm_unpackhi_ps(q[2], q[3]);
    [
        _mm_movelh_ps(t0, t1),
        _mm_movehl_ps(t1, t0),
        _mm_movelh_ps(t2, t3),
        _mm_movehl_ps(t3, t2),
    ]
}

/// Rounds half away from zero, clamps to the `i16` range and truncates.
/// Matches the scalar rounding for every finite input, including `-0.0`.
#[target_feature(enable = "ssse3")]
unsafe fn round_clamp_i32(v: __m128) -> __m128i {
    let sign = _mm_and_ps(v, _mm_set1_ps(-0.0));
    let rounded = _mm_add_ps(v, _mm_or_ps(sign, _mm_set1_ps(0.5)));
    let clamped = _mm_min_ps(
        _mm_max_ps(rounded, _mm_set1_ps(-32768.0)),
        _mm_set1_ps(32767.0),
    );
    _mm_cvttps_epi32(clamped)
}

/// Fused quantize + transpose + zigzag into scan order.
#[target_feature(enable = "ssse3")]
pub unsafe fn quantize(block: &FloatBlock, reciprocals: &FloatBlock, dest: &mut IntBlock) {
    let bp = block.as_slice().as_ptr();
    let rp = reciprocals.as_slice().as_ptr();

    let mut tmp = IntBlock::zeroed();
    let tp = tmp.as_mut_slice().as_mut_ptr();
    for row in 0..8 {
        let lo = round_clamp_i32(_mm_mul_ps(
            _mm_loadu_ps(bp.add(row * 8)),
            _mm_loadu_ps(rp.add(row * 8)),
        ));
        let hi = round_clamp_i32(_mm_mul_ps(
            _mm_loadu_ps(bp.add(row * 8 + 4)),
            _mm_loadu_ps(rp.add(row * 8 + 4)),
        ));
        _mm_storeu_si128(
            tp.add(row * 8).cast::<__m128i>(),
            _mm_packs_epi32(lo, hi),
        );
    }

    // the coefficients arrive transposed; undoing it here lets the scan
    // reorder use the plain zigzag shuffles
    transpose_i16(&mut tmp);
    gather_zigzag(&tmp, dest);
}

/// In-place 8x8 i16 transpose via the unpack16/32/64 ladder.
#[target_feature(enable = "ssse3")]
pub unsafe fn transpose_i16(block: &mut IntBlock) {
    let p = block.as_mut_slice().as_mut_ptr().cast::<__m128i>();
    let a0 = _mm_loadu_si128(p);
    let a1 = _mm_loadu_si128(p.add(1));
    let a2 = _mm_loadu_si128(p.add(2));
    let a3 = _mm_loadu_si128(p.add(3));
    let a4 = _mm_loadu_si128(p.add(4));
    let a5 = _mm_loadu_si128(p.add(5));
    let a6 = _mm_loadu_si128(p.add(6));
    let a7 = _mm_loadu_si128(p.add(7));

    let b0 = _mm_unpacklo_epi16(a0, a1);
    let b1 = _mm_unpackhi_epi16(a0, a1);
    let b2 = _mm_unpacklo_epi16(a2, a3);
    let b3 = _mm_unpackhi_epi16(a2, a3);
    let b4 = _mm_unpacklo_epi16(a4, a5);
    let b5 = _mm_unpackhi_epi16(a4, a5);
    let b6 = _mm_unpacklo_epi16(a6, a7);
    let b7 = _mm_unpackhi_epi16(a6, a7);

    let c0 = _mm_unpacklo_epi32(b0, b2);
    let c1 = _mm_unpackhi_epi32(b0, b2);
    let c2 = _mm_unpacklo_epi32(b1, b3);
    let c3 = _mm_unpackhi_epi32(b1, b3);
    let c4 = _mm_unpacklo_epi32(b4, b6);
    let c5 = _mm_unpackhi_epi32(b4, b6);
    let c6 = _mm_unpacklo_epi32(b5, b7);
    let c7 = _mm_unpackhi_epi32(b5, b7);

    _mm_storeu_si128(p, _mm_unpacklo_epi64(c0, c4));
    _mm_storeu_si128(p.add(1), _mm_unpackhi_epi64(c0, c4));
    _mm_storeu_si128(p.add(2), _mm_unpacklo_epi64(c1, c5));
    _mm_storeu_si128(p.add(3), _mm_unpackhi_epi64(c1, c5));
    _mm_storeu_si128(p.add(4), _mm_unpacklo_epi64(c2, c6));
    _mm_storeu_si128(p.add(5), _mm_unpackhi_epi64(c2, c6));
    _mm_storeu_si128(p.add(6), _mm_unpacklo_epi64(c3, c7));
    _mm_storeu_si128(p.add(7), _mm_unpackhi_epi64(c3, c7));
}

/// Shuffle masks for the scan-order gather, one 16-byte `pshufb` control per
/// (source row, output row) pair that contributes coefficients. `0xFF`
/// zeroes a lane.
#[rustfmt::skip]
const SSE_MASKS: [[u8; 16]; 35] = [
    [0, 1, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 4, 5, 6, 7, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 4, 5],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 8, 9, 10, 11],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 0xFF, 0xFF, 0xFF, 0xFF],
    [2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 6, 7, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 4, 5],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 2, 3, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF],
    [6, 7, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 8, 9],
    [0xFF, 0xFF, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 1, 2, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 12, 13, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 8, 9, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 6, 7],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13],
    [0xFF, 0xFF, 0xFF, 0xFF, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [4, 5, 6, 7, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 0xFF, 0xFF, 14, 15, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 8, 9, 10, 11, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 12, 13, 14, 15],
];

#[target_feature(enable = "ssse3")]
unsafe fn mask(i: usize) -> __m128i {
    _mm_loadu_si128(SSE_MASKS[i].as_ptr().cast::<__m128i>())
}

/// Scan-order gather of an untransposed block.
#[target_feature(enable = "ssse3")]
pub unsafe fn gather_zigzag(src: &IntBlock, dest: &mut IntBlock) {
    let sp = src.as_slice().as_ptr().cast::<__m128i>();
    let a = _mm_loadu_si128(sp);
    let b = _mm_loadu_si128(sp.add(1));
    let c = _mm_loadu_si128(sp.add(2));
    let d = _mm_loadu_si128(sp.add(3));
    let e = _mm_loadu_si128(sp.add(4));
    let f = _mm_loadu_si128(sp.add(5));
    let g = _mm_loadu_si128(sp.add(6));
    let h = _mm_loadu_si128(sp.add(7));

    let row0 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(a, mask(0)), _mm_shuffle_epi8(b, mask(1))),
        _mm_shuffle_epi8(c, mask(2)),
    );
    let row1 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(a, mask(3)), _mm_shuffle_epi8(b, mask(4))),
        _mm_or_si128(
            _mm_or_si128(_mm_shuffle_epi8(c, mask(5)), _mm_shuffle_epi8(d, mask(6))),
            _mm_shuffle_epi8(e, mask(7)),
        ),
    );
    let row2 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(b, mask(8)), _mm_shuffle_epi8(c, mask(9))),
        _mm_or_si128(
            _mm_or_si128(_mm_shuffle_epi8(d, mask(10)), _mm_shuffle_epi8(e, mask(11))),
            _mm_or_si128(_mm_shuffle_epi8(f, mask(12)), _mm_shuffle_epi8(g, mask(13))),
        ),
    );
    let row3 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(a, mask(14)), _mm_shuffle_epi8(b, mask(15))),
        _mm_or_si128(_mm_shuffle_epi8(c, mask(16)), _mm_shuffle_epi8(d, mask(17))),
    );
    let row4 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(e, mask(17)), _mm_shuffle_epi8(f, mask(18))),
        _mm_or_si128(_mm_shuffle_epi8(g, mask(19)), _mm_shuffle_epi8(h, mask(20))),
    );
    let row5 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(b, mask(21)), _mm_shuffle_epi8(c, mask(22))),
        _mm_or_si128(
            _mm_or_si128(_mm_shuffle_epi8(d, mask(23)), _mm_shuffle_epi8(e, mask(24))),
            _mm_or_si128(_mm_shuffle_epi8(f, mask(25)), _mm_shuffle_epi8(g, mask(26))),
        ),
    );
    let row6 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(d, mask(27)), _mm_shuffle_epi8(e, mask(28))),
        _mm_or_si128(
            _mm_or_si128(_mm_shuffle_epi8(f, mask(29)), _mm_shuffle_epi8(g, mask(30))),
            _mm_shuffle_epi8(h, mask(31)),
        ),
    );
    let row7 = _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(f, mask(32)), _mm_shuffle_epi8(g, mask(33))),
        _mm_shuffle_epi8(h, mask(34)),
    );

    let dp = dest.as_mut_slice().as_mut_ptr().cast::<__m128i>();
    _mm_storeu_si128(dp, row0);
    _mm_storeu_si128(dp.add(1), row1);
    _mm_storeu_si128(dp.add(2), row2);
    _mm_storeu_si128(dp.add(3), row3);
    _mm_storeu_si128(dp.add(4), row4);
    _mm_storeu_si128(dp.add(5), row5);
    _mm_storeu_si128(dp.add(6), row6);
    _mm_storeu_si128(dp.add(7), row7);
}

/// Scan-order gather of a transposed block: untranspose in registers, then
/// run the plain zigzag shuffles.
#[target_feature(enable = "ssse3")]
pub unsafe fn gather_transposing_zigzag(src: &IntBlock, dest: &mut IntBlock) {
    let mut tmp = *src;
    transpose_i16(&mut tmp);
    gather_zigzag(&tmp, dest);
}
