use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralError {
    #[error("Quality factor {value} is outside the range 1..=100")]
    InvalidQuality { value: u32 },
    #[error("Quantization table entry {index} is zero")]
    ZeroQuantizerValue { index: usize },
    #[error("Source has {actual} samples, expected at least {expected}")]
    SourceTooSmall { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SpectralError>;
