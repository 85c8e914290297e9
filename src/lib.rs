//! Spectral transform core for baseline JPEG.
//!
//! The crate covers the per-block pipeline between entropy coding and pixel
//! data: the 8x8 forward and inverse DCT, quantization with quality-factor
//! table scaling, and zigzag coefficient (re)ordering. Three implementation
//! tiers (scalar, 128-bit, 256-bit) compute the same results; the widest one
//! the CPU supports is picked once at startup through
//! [`TransformEngine::get`].
//!
//! Encoding a block:
//!
//! ```
//! use jpeg_spectral::{PixelBlock, QuantTable, TransformEngine, IntBlock};
//!
//! let samples = vec![128u8; 64];
//! let tile = PixelBlock::load_and_stretch_edges(&samples, 0, 0, 8, 8, 8).unwrap();
//! let table = QuantTable::luminance_for_quality(90).unwrap();
//! let reciprocals = table.fdct_reciprocals();
//!
//! let engine = TransformEngine::get();
//! let mut block = tile.to_centered_float(128.0);
//! engine.fdct(&mut block);
//! let mut scan = IntBlock::zeroed();
//! engine.quantize(&block, &reciprocals, &mut scan);
//! assert_eq!(scan.last_non_zero(), None); // flat gray block quantizes away
//! ```

pub mod block;
pub mod dct;
pub mod error;
pub mod pixel;
pub mod quant;
pub mod simd;
pub mod zigzag;

pub use block::{FloatBlock, IntBlock, BLOCK_DIM, BLOCK_SIZE};
pub use dct::ScaledSize;
pub use error::{Result, SpectralError};
pub use pixel::PixelBlock;
pub use quant::QuantTable;
pub use simd::{SimdLevel, TransformEngine};
