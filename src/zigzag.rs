//! Zigzag coefficient ordering.
//!
//! The tables carry 16 padding entries past the 64 real ones, all pointing at
//! the last coefficient. A decoder recovering from a corrupted stream can run
//! its scan position past the end of a block; the overrun lands on slot 63
//! instead of indexing out of bounds.

use crate::block::{IntBlock, BLOCK_SIZE};

/// Table length including the overrun padding.
pub const PADDED_LEN: usize = 80;

/// Scan order of natural (row-major) indices for an untransposed block.
#[rustfmt::skip]
pub const ZIGZAG_ORDER: [u8; PADDED_LEN] = [
    0,  1,  8,  16, 9,  2,  3,  10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
    // overrun padding
    63, 63, 63, 63, 63, 63, 63, 63,
    63, 63, 63, 63, 63, 63, 63, 63,
];

/// Scan order for a block the forward transform left transposed.
///
/// Entry `i` is the transpose of `ZIGZAG_ORDER[i]`, so gathering through this
/// table produces the same scan sequence as first transposing the block and
/// then gathering through [`ZIGZAG_ORDER`].
#[rustfmt::skip]
pub const TRANSPOSING_ZIGZAG_ORDER: [u8; PADDED_LEN] = [
    0,  8,  1,  2,  9,  16, 24, 17,
    10, 3,  4,  11, 18, 25, 32, 40,
    33, 26, 19, 12, 5,  6,  13, 20,
    27, 34, 41, 48, 56, 49, 42, 35,
    28, 21, 14, 7,  15, 22, 29, 36,
    43, 50, 57, 58, 51, 44, 37, 30,
    23, 31, 38, 45, 52, 59, 60, 53,
    46, 39, 47, 54, 61, 62, 55, 63,
    // overrun padding
    63, 63, 63, 63, 63, 63, 63, 63,
    63, 63, 63, 63, 63, 63, 63, 63,
];

/// Reorders a natural-order block into scan order.
pub fn gather(src: &IntBlock, dest: &mut IntBlock) {
    for i in 0..BLOCK_SIZE {
        dest[i] = src[ZIGZAG_ORDER[i] as usize];
    }
}

/// Reorders a transposed block into scan order.
pub fn gather_transposing(src: &IntBlock, dest: &mut IntBlock) {
    for i in 0..BLOCK_SIZE {
        dest[i] = src[TRANSPOSING_ZIGZAG_ORDER[i] as usize];
    }
}

/// Writes one decoded coefficient at scan position `scan_pos` into its
/// natural-order slot. Positions `64..80` are tolerated and alias slot 63.
#[inline]
pub fn scatter(block: &mut IntBlock, scan_pos: usize, value: i16) {
    block[ZIGZAG_ORDER[scan_pos] as usize] = value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_order_is_permutation() {
        let mut seen = [false; BLOCK_SIZE];
        for &z in &ZIGZAG_ORDER[..BLOCK_SIZE] {
            assert!(!seen[z as usize]);
            seen[z as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn transposing_order_is_transposed_zigzag() {
        for i in 0..BLOCK_SIZE {
            let z = ZIGZAG_ORDER[i] as usize;
            let t = (z % 8) * 8 + z / 8;
            assert_eq!(TRANSPOSING_ZIGZAG_ORDER[i] as usize, t);
        }
    }

    #[test]
    fn padding_aliases_last_slot() {
        for i in BLOCK_SIZE..PADDED_LEN {
            assert_eq!(ZIGZAG_ORDER[i], 63);
            assert_eq!(TRANSPOSING_ZIGZAG_ORDER[i], 63);
        }
    }

    #[test]
    fn gather_transposing_matches_transpose_then_gather() {
        let mut src = IntBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            src[i] = i as i16 - 32;
        }
        let mut direct = IntBlock::zeroed();
        gather_transposing(&src, &mut direct);

        let mut transposed = src;
        transposed.transpose();
        let mut via_transpose = IntBlock::zeroed();
        gather(&transposed, &mut via_transpose);

        assert_eq!(direct, via_transpose);
    }

    #[test]
    fn scatter_then_gather_round_trips() {
        let scan: Vec<i16> = (0..BLOCK_SIZE as i16).map(|v| v * 3 - 90).collect();
        let mut block = IntBlock::zeroed();
        for (k, &v) in scan.iter().enumerate() {
            scatter(&mut block, k, v);
        }
        let mut back = IntBlock::zeroed();
        gather(&block, &mut back);
        assert_eq!(back.as_slice()[..], scan[..]);
    }

    #[test]
    fn scatter_overrun_lands_on_last_slot() {
        let mut block = IntBlock::zeroed();
        for k in BLOCK_SIZE..PADDED_LEN {
            scatter(&mut block, k, k as i16);
        }
        assert_eq!(block[63], (PADDED_LEN - 1) as i16);
        assert_eq!(block.last_non_zero(), Some(63));
    }
}
