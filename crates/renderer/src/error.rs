//! Rendering errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Buffer holds {actual} bytes but a {width}x{height} image needs {expected}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Palette has {0} entries; indexed PNG allows at most 256")]
    PaletteTooLarge(usize),

    #[error("IDAT compression failed: {0}")]
    Compression(#[from] std::io::Error),
}
