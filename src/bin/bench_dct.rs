use jpeg_spectral::block::{FloatBlock, IntBlock};
use jpeg_spectral::quant::QuantTable;
use jpeg_spectral::simd::{SimdLevel, TransformEngine};
use std::time::Instant;

fn main() {
    let detected = SimdLevel::detect();
    println!("Benchmarking DCT pipeline, detected tier: {}", detected.name());

    let mut samples = [0.0f32; 64];
    for (i, s) in samples.iter_mut().enumerate() {
        *s = ((i * 29 + 7) % 256) as f32 - 128.0;
    }
    let input = FloatBlock::from_array(samples);

    let table = QuantTable::luminance_for_quality(75).unwrap();
    let reciprocals = table.fdct_reciprocals();
    let dequantizers = table.idct_dequantizers();

    let iterations = 1_000_000;
    let scalar = TransformEngine::with_level(SimdLevel::Scalar);
    let vector = TransformEngine::with_level(detected);

    // Benchmark scalar tier
    let mut scan_scalar = IntBlock::zeroed();
    let start = Instant::now();
    for _ in 0..iterations {
        let mut block = input;
        scalar.fdct(&mut block);
        scalar.quantize(&block, &reciprocals, &mut scan_scalar);
        std::hint::black_box(scan_scalar);
    }
    let duration_scalar = start.elapsed();
    println!("Scalar forward+quantize: {:?} for {} iterations", duration_scalar, iterations);

    // Benchmark detected tier
    let mut scan_vector = IntBlock::zeroed();
    let start = Instant::now();
    for _ in 0..iterations {
        let mut block = input;
        vector.fdct(&mut block);
        vector.quantize(&block, &reciprocals, &mut scan_vector);
        std::hint::black_box(scan_vector);
    }
    let duration_vector = start.elapsed();
    println!("{} forward+quantize: {:?} for {} iterations", detected.name(), duration_vector, iterations);

    let speedup = duration_scalar.as_secs_f64() / duration_vector.as_secs_f64();
    println!("Speedup: {:.2}x", speedup);

    if scan_scalar == scan_vector {
        println!("Quantized outputs: IDENTICAL");
    } else {
        println!("Quantized outputs: MISMATCH");
    }

    // Inverse direction
    let mut coeffs = FloatBlock::zeroed();
    jpeg_spectral::quant::dequantize(&scan_scalar, &dequantizers, &mut coeffs);

    let start = Instant::now();
    for _ in 0..iterations {
        let mut block = coeffs;
        scalar.idct(&mut block);
        std::hint::black_box(block);
    }
    let duration_scalar = start.elapsed();
    println!("Scalar inverse: {:?} for {} iterations", duration_scalar, iterations);

    let start = Instant::now();
    for _ in 0..iterations {
        let mut block = coeffs;
        vector.idct(&mut block);
        std::hint::black_box(block);
    }
    let duration_vector = start.elapsed();
    println!("{} inverse: {:?} for {} iterations", detected.name(), duration_vector, iterations);

    let speedup = duration_scalar.as_secs_f64() / duration_vector.as_secs_f64();
    println!("Speedup: {:.2}x", speedup);

    let mut a = coeffs;
    scalar.idct(&mut a);
    let mut b = coeffs;
    vector.idct(&mut b);
    let mut max_diff = 0.0f32;
    for i in 0..64 {
        let diff = (a[i] - b[i]).abs();
        if diff > max_diff {
            max_diff = diff;
        }
    }
    println!("Max inverse difference between tiers: {}", max_diff);
    if max_diff < 0.01 {
        println!("Accuracy: PASSED (Tolerance < 0.01)");
    } else {
        println!("Accuracy: FAILED (Tolerance > 0.01)");
    }
}
