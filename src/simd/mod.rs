//! Runtime-dispatched transform kernels.
//!
//! Hardware support is probed once and cached; every block operation then
//! routes through a [`TransformEngine`] so the hot loops never re-check CPU
//! features. The 128-bit tier needs SSSE3 (for the zigzag byte shuffles), the
//! 256-bit tier needs AVX2 and FMA.

use crate::block::{FloatBlock, IntBlock};
use crate::{dct, quant, zigzag};
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
mod avx;
#[cfg(target_arch = "x86_64")]
mod sse;

/// Widest vector tier usable on the running CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    Scalar,
    Wide128,
    Wide256,
}

impl SimdLevel {
    /// Probes the CPU. Called once per process through [`TransformEngine::get`].
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Self::Wide256;
            }
            if is_x86_feature_detected!("ssse3") {
                return Self::Wide128;
            }
        }
        Self::Scalar
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Wide128 => "128-bit (ssse3)",
            Self::Wide256 => "256-bit (avx2)",
        }
    }
}

static ENGINE: OnceLock<TransformEngine> = OnceLock::new();

/// Block transform front-end bound to one vector tier.
///
/// All tiers compute the same results: the quantization outputs are
/// bit-identical and the float transforms agree to within one rounding step
/// of the final integer samples.
#[derive(Debug, Clone, Copy)]
pub struct TransformEngine {
    level: SimdLevel,
}

impl TransformEngine {
    /// The process-wide engine for the detected CPU tier.
    pub fn get() -> &'static Self {
        ENGINE.get_or_init(|| Self::with_level(SimdLevel::detect()))
    }

    /// An engine pinned to a specific tier. The caller is responsible for
    /// only selecting tiers the CPU supports.
    pub fn with_level(level: SimdLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> SimdLevel {
        self.level
    }

    /// Forward DCT. Output is transposed and AAN-scaled, see [`dct::fdct`].
    pub fn fdct(&self, block: &mut FloatBlock) {
        match self.level {
            SimdLevel::Scalar => dct::fdct(block),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::fdct(block) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::fdct(block) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => dct::fdct(block),
        }
    }

    /// Inverse DCT on a transposed, dequantized block, see [`dct::idct`].
    pub fn idct(&self, block: &mut FloatBlock) {
        match self.level {
            SimdLevel::Scalar => dct::idct(block),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::idct(block) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::idct(block) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => dct::idct(block),
        }
    }

    /// Fused quantize, transpose and zigzag into scan order, bit-identical
    /// to [`quant::quantize`] on every tier.
    pub fn quantize(&self, block: &FloatBlock, reciprocals: &FloatBlock, dest: &mut IntBlock) {
        match self.level {
            SimdLevel::Scalar => quant::quantize(block, reciprocals, dest),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::quantize(block, reciprocals, dest) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::quantize(block, reciprocals, dest) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => quant::quantize(block, reciprocals, dest),
        }
    }

    /// In-place float transpose, bit-identical across tiers.
    pub fn transpose_f32(&self, block: &mut FloatBlock) {
        match self.level {
            SimdLevel::Scalar => block.transpose(),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::transpose_f32(block) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::transpose_f32(block) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => block.transpose(),
        }
    }

    /// In-place integer transpose, bit-identical across tiers.
    pub fn transpose_i16(&self, block: &mut IntBlock) {
        match self.level {
            SimdLevel::Scalar => block.transpose(),
            // both wide tiers use the 128-bit unpack ladder
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 | SimdLevel::Wide256 => unsafe { sse::transpose_i16(block) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => block.transpose(),
        }
    }

    /// Scan-order gather of an untransposed block.
    pub fn gather_zigzag(&self, src: &IntBlock, dest: &mut IntBlock) {
        match self.level {
            SimdLevel::Scalar => zigzag::gather(src, dest),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::gather_zigzag(src, dest) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::gather_zigzag(src, dest) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => zigzag::gather(src, dest),
        }
    }

    /// Scan-order gather of a transposed block.
    pub fn gather_transposing_zigzag(&self, src: &IntBlock, dest: &mut IntBlock) {
        match self.level {
            SimdLevel::Scalar => zigzag::gather_transposing(src, dest),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide128 => unsafe { sse::gather_transposing_zigzag(src, dest) },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Wide256 => unsafe { avx::gather_transposing_zigzag(src, dest) },
            #[cfg(not(target_arch = "x86_64"))]
            _ => zigzag::gather_transposing(src, dest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_stable() {
        assert_eq!(SimdLevel::detect(), SimdLevel::detect());
        assert_eq!(TransformEngine::get().level(), SimdLevel::detect());
    }

    #[test]
    fn scalar_engine_matches_free_functions() {
        let engine = TransformEngine::with_level(SimdLevel::Scalar);
        let mut a = FloatBlock::zeroed();
        for i in 0..64 {
            a[i] = (i as f32) - 31.5;
        }
        let mut b = a;
        engine.fdct(&mut a);
        dct::fdct(&mut b);
        assert_eq!(a, b);
    }
}
