//! End-to-end block pipeline tests: forward transform, quantization and scan
//! ordering on the encode side, coefficient scatter, dequantization and
//! inverse transform on the decode side, across every SIMD tier the host
//! supports.

use jpeg_spectral::block::{FloatBlock, IntBlock, BLOCK_SIZE};
use jpeg_spectral::dct::{self, ScaledSize};
use jpeg_spectral::pixel::PixelBlock;
use jpeg_spectral::quant::{self, QuantTable};
use jpeg_spectral::simd::{SimdLevel, TransformEngine};
use jpeg_spectral::zigzag;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

fn supported_levels() -> Vec<SimdLevel> {
    let mut levels = vec![SimdLevel::Scalar];
    let detected = SimdLevel::detect();
    if detected >= SimdLevel::Wide128 {
        levels.push(SimdLevel::Wide128);
    }
    if detected >= SimdLevel::Wide256 {
        levels.push(SimdLevel::Wide256);
    }
    levels
}

fn random_samples(rng: &mut XorShiftRng) -> [u8; BLOCK_SIZE] {
    let mut samples = [0u8; BLOCK_SIZE];
    for s in &mut samples {
        *s = rng.random_range(0..=255);
    }
    samples
}

/// Encodes one block of 8-bit samples into scan order.
fn encode(engine: &TransformEngine, samples: &[u8; BLOCK_SIZE], reciprocals: &FloatBlock) -> IntBlock {
    let tile = PixelBlock::load_and_stretch_edges(samples.as_slice(), 0, 0, 8, 8, 8).unwrap();
    let mut block = tile.to_centered_float(128.0);
    engine.fdct(&mut block);
    let mut scan = IntBlock::zeroed();
    engine.quantize(&block, reciprocals, &mut scan);
    scan
}

/// Decodes a scan-order coefficient sequence back to 8-bit samples.
fn decode(engine: &TransformEngine, scan: &IntBlock, dequantizers: &FloatBlock) -> [u8; BLOCK_SIZE] {
    let mut natural = IntBlock::zeroed();
    for k in 0..BLOCK_SIZE {
        zigzag::scatter(&mut natural, k, scan[k]);
    }
    let mut block = FloatBlock::zeroed();
    quant::dequantize(&natural, dequantizers, &mut block);
    engine.idct(&mut block);
    block.normalize(255.0);
    let mut out = [0u8; BLOCK_SIZE];
    for (o, &v) in out.iter_mut().zip(block.as_slice().iter()) {
        *o = v as u8;
    }
    out
}

#[test]
fn lossless_quality_round_trip_is_nearly_exact() {
    let table = QuantTable::luminance_for_quality(100).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();
    let engine = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0001);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let scan = encode(&engine, &samples, &reciprocals);
        let decoded = decode(&engine, &scan, &dequantizers);
        for i in 0..BLOCK_SIZE {
            let diff = (decoded[i] as i16 - samples[i] as i16).abs();
            assert!(diff <= 2, "sample {i}: {} -> {}", samples[i], decoded[i]);
        }
    }
}

#[test]
fn high_quality_round_trip_is_close() {
    let table = QuantTable::luminance_for_quality(95).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();
    let engine = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0002);
    for _ in 0..50 {
        let samples = random_samples(&mut rng);
        let scan = encode(&engine, &samples, &reciprocals);
        let decoded = decode(&engine, &scan, &dequantizers);
        for i in 0..BLOCK_SIZE {
            let diff = (decoded[i] as i16 - samples[i] as i16).abs();
            assert!(diff <= 16, "sample {i}: {} -> {}", samples[i], decoded[i]);
        }
    }
}

#[test]
fn flat_block_round_trips_exactly() {
    for quality in [1, 25, 50, 75, 100] {
        let table = QuantTable::luminance_for_quality(quality).unwrap();
        let reciprocals = table.fdct_reciprocals();
        let dequantizers = table.idct_dequantizers();
        let engine = TransformEngine::with_level(SimdLevel::Scalar);

        let samples = [128u8; BLOCK_SIZE];
        let scan = encode(&engine, &samples, &reciprocals);
        assert_eq!(scan.last_non_zero(), None, "quality {quality}");
        let decoded = decode(&engine, &scan, &dequantizers);
        assert_eq!(decoded, samples, "quality {quality}");
    }
}

#[test]
fn dc_only_stream_decodes_flat() {
    let table = QuantTable::luminance_for_quality(75).unwrap();
    let dequantizers = table.idct_dequantizers();
    let engine = TransformEngine::with_level(SimdLevel::Scalar);

    let mut scan = IntBlock::zeroed();
    scan[0] = 13;
    let decoded = decode(&engine, &scan, &dequantizers);
    assert!(decoded.iter().all(|&v| v == decoded[0]));
    assert!(decoded[0] > 128);
}

#[test]
fn all_tiers_quantize_identically() {
    let table = QuantTable::luminance_for_quality(80).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let scalar = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0003);
    for _ in 0..100 {
        let mut block = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            block[i] = rng.random_range(-20000.0..20000.0);
        }
        let mut expected = IntBlock::zeroed();
        scalar.quantize(&block, &reciprocals, &mut expected);

        for level in supported_levels() {
            let engine = TransformEngine::with_level(level);
            let mut got = IntBlock::zeroed();
            engine.quantize(&block, &reciprocals, &mut got);
            assert_eq!(got, expected, "tier {}", level.name());
        }
    }
}

#[test]
fn all_tiers_forward_transform_identically() {
    let scalar = TransformEngine::with_level(SimdLevel::Scalar);
    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0004);
    for _ in 0..100 {
        let mut block = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            block[i] = rng.random_range(-128.0..128.0);
        }
        let mut expected = block;
        scalar.fdct(&mut expected);

        for level in supported_levels() {
            let engine = TransformEngine::with_level(level);
            let mut got = block;
            engine.fdct(&mut got);
            assert_eq!(got, expected, "tier {}", level.name());
        }
    }
}

#[test]
fn all_tiers_decode_within_one_step() {
    let table = QuantTable::luminance_for_quality(85).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();
    let scalar = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0005);
    for _ in 0..100 {
        let samples = random_samples(&mut rng);
        let scan = encode(&scalar, &samples, &reciprocals);
        let expected = decode(&scalar, &scan, &dequantizers);

        for level in supported_levels() {
            let engine = TransformEngine::with_level(level);
            let got = decode(&engine, &scan, &dequantizers);
            for i in 0..BLOCK_SIZE {
                let diff = (got[i] as i16 - expected[i] as i16).abs();
                // the 256-bit inverse contracts into FMA; one rounding step
                assert!(diff <= 1, "tier {} sample {i}", level.name());
            }
        }
    }
}

#[test]
fn all_tiers_gather_zigzag_identically() {
    let scalar = TransformEngine::with_level(SimdLevel::Scalar);
    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0006);
    for _ in 0..100 {
        let mut block = IntBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            block[i] = rng.random_range(i16::MIN..=i16::MAX);
        }
        let mut expected = IntBlock::zeroed();
        scalar.gather_zigzag(&block, &mut expected);
        let mut expected_t = IntBlock::zeroed();
        scalar.gather_transposing_zigzag(&block, &mut expected_t);

        for level in supported_levels() {
            let engine = TransformEngine::with_level(level);
            let mut got = IntBlock::zeroed();
            engine.gather_zigzag(&block, &mut got);
            assert_eq!(got, expected, "tier {}", level.name());
            engine.gather_transposing_zigzag(&block, &mut got);
            assert_eq!(got, expected_t, "tier {} transposing", level.name());
        }
    }
}

#[test]
fn all_tiers_transpose_identically() {
    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0009);
    for _ in 0..50 {
        let mut ints = IntBlock::zeroed();
        let mut floats = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            ints[i] = rng.random_range(i16::MIN..=i16::MAX);
            floats[i] = rng.random_range(-1e6..1e6);
        }
        let mut expected_i = ints;
        expected_i.transpose();
        let mut expected_f = floats;
        expected_f.transpose();

        for level in supported_levels() {
            let engine = TransformEngine::with_level(level);
            let mut got_i = ints;
            engine.transpose_i16(&mut got_i);
            assert_eq!(got_i, expected_i, "tier {}", level.name());
            let mut got_f = floats;
            engine.transpose_f32(&mut got_f);
            assert_eq!(got_f, expected_f, "tier {}", level.name());
        }
    }
}

#[test]
fn quantize_dequantize_round_trips_within_one_step() {
    let table = QuantTable::luminance_for_quality(60).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();
    let engine = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0008);
    for _ in 0..100 {
        // true coefficients, presented in the scaled transposed layout the
        // forward transform hands to the quantizer
        let mut truth = [0.0f32; BLOCK_SIZE];
        for t in &mut truth {
            *t = rng.random_range(-1000.0..1000.0);
        }
        let mut block = FloatBlock::zeroed();
        for i in 0..BLOCK_SIZE {
            let transposed = (i % 8) * 8 + i / 8;
            block[transposed] = truth[i] * dct::fdct_scale(i);
        }

        let mut scan = IntBlock::zeroed();
        engine.quantize(&block, &reciprocals, &mut scan);

        let mut natural = IntBlock::zeroed();
        for k in 0..BLOCK_SIZE {
            zigzag::scatter(&mut natural, k, scan[k]);
        }
        let mut recovered = FloatBlock::zeroed();
        quant::dequantize(&natural, &dequantizers, &mut recovered);

        // dequantize output is transposed and carries the 1/8 fold
        for i in 0..BLOCK_SIZE {
            let transposed = (i % 8) * 8 + i / 8;
            let got = recovered[transposed] * 8.0;
            let step = f32::from(table.entries()[i]);
            assert!(
                (got - truth[i]).abs() <= step * 0.5 + 1e-2,
                "coefficient {i}: got {got}, want {} within {}",
                truth[i],
                step * 0.5
            );
        }
    }
}

#[test]
fn thumbnail_decode_matches_full_decode_corner() {
    let table = QuantTable::luminance_for_quality(90).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();
    let engine = TransformEngine::with_level(SimdLevel::Scalar);

    let mut rng = XorShiftRng::seed_from_u64(0x5eed_0007);
    for trial in 0..100 {
        let samples = random_samples(&mut rng);
        let scan = encode(&engine, &samples, &reciprocals);

        // thumbnail path: drop every coefficient outside the corner
        let (size, keep) = match trial % 3 {
            0 => (ScaledSize::FourByFour, 4),
            1 => (ScaledSize::TwoByTwo, 2),
            _ => (ScaledSize::OneByOne, 1),
        };
        let mut natural = IntBlock::zeroed();
        for k in 0..BLOCK_SIZE {
            zigzag::scatter(&mut natural, k, scan[k]);
        }
        for i in 0..BLOCK_SIZE {
            if i % 8 >= keep || i / 8 >= keep {
                natural[i] = 0;
            }
        }
        let mut coeffs = FloatBlock::zeroed();
        quant::dequantize(&natural, &dequantizers, &mut coeffs);

        let mut full = coeffs;
        dct::idct(&mut full);
        full.normalize(255.0);

        let mut reduced = coeffs;
        dct::idct_scaled(&mut reduced, size);
        reduced.normalize(255.0);

        for y in 0..keep {
            for x in 0..keep {
                assert_eq!(reduced[(y, x)], full[(y, x)], "size {keep} sample ({y},{x})");
            }
        }
    }
}

#[test]
fn corrupted_scan_overrun_is_tolerated() {
    let mut natural = IntBlock::zeroed();
    // a decoder chasing a bad run length walks past position 63
    for k in 60..zigzag::PADDED_LEN {
        zigzag::scatter(&mut natural, k, 7);
    }
    assert_eq!(natural.last_non_zero(), Some(63));
}

#[test]
fn quality_estimate_recovers_encoding_quality() {
    for quality in [30, 50, 75, 90] {
        let table = QuantTable::luminance_for_quality(quality).unwrap();
        let estimated = quant::estimate_luminance_quality(table.entries());
        assert!(estimated.abs_diff(quality) <= 1, "quality {quality} -> {estimated}");
    }
}
