//! Error taxonomy for GRIB2 decoding.
//!
//! Every failure is terminal for the decode attempt that produced it: no
//! partially decoded grid is ever returned alongside an error.

use thiserror::Error;

/// Result type alias using Grib2Error.
pub type Grib2Result<T> = Result<T, Grib2Error>;

/// Errors raised while walking sections or unpacking values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Grib2Error {
    #[error("Malformed GRIB2 header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported GRIB edition {0} (only edition 2 is supported)")]
    UnsupportedEdition(u8),

    #[error("Truncated input while reading {context}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid length {length} for section at offset {offset} ({remaining} bytes remain)")]
    InvalidSectionLength {
        offset: usize,
        length: u32,
        remaining: usize,
    },

    #[error("Expected section {expected}, found section {found}")]
    UnexpectedSection { expected: u8, found: u8 },

    #[error("Unsupported grid definition template 3.{0}")]
    UnsupportedGridTemplate(u16),

    #[error("Unsupported data representation template 5.{0}")]
    UnsupportedPackingTemplate(u16),

    #[error("Unsupported bitmap indicator {0}")]
    UnsupportedBitmapIndicator(u8),

    #[error("Invalid bits per value: {0}")]
    InvalidBitWidth(u8),

    #[error("Grid is {points_x}x{points_y} but {declared} data points are declared")]
    DimensionMismatch {
        points_x: u32,
        points_y: u32,
        declared: u32,
    },

    #[error("Invalid reference time: {0}")]
    InvalidReferenceTime(String),

    #[error("Packed data truncated at cell {cell}: needed bit {needed_bits}, payload has {available_bits}")]
    TruncatedData {
        cell: usize,
        needed_bits: usize,
        available_bits: usize,
    },

    #[error("Grid of {0} cells is too large to allocate")]
    GridTooLarge(usize),
}

impl Grib2Error {
    /// Stable identifier for the error kind, suitable for logs and for
    /// mapping onto transport-level status codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Grib2Error::MalformedHeader(_) => "MalformedHeader",
            Grib2Error::UnsupportedEdition(_) => "UnsupportedEdition",
            Grib2Error::TruncatedInput { .. } => "TruncatedInput",
            Grib2Error::InvalidSectionLength { .. } => "InvalidSectionLength",
            Grib2Error::UnexpectedSection { .. } => "UnexpectedSection",
            Grib2Error::UnsupportedGridTemplate(_) => "UnsupportedGridTemplate",
            Grib2Error::UnsupportedPackingTemplate(_) => "UnsupportedPackingTemplate",
            Grib2Error::UnsupportedBitmapIndicator(_) => "UnsupportedBitmapIndicator",
            Grib2Error::InvalidBitWidth(_) => "InvalidBitWidth",
            Grib2Error::DimensionMismatch { .. } => "DimensionMismatch",
            Grib2Error::InvalidReferenceTime(_) => "InvalidReferenceTime",
            Grib2Error::TruncatedData { .. } => "TruncatedData",
            Grib2Error::GridTooLarge(_) => "GridTooLarge",
        }
    }

    /// True for errors caused by a template or option this decoder does not
    /// implement, as opposed to a corrupt message.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Grib2Error::UnsupportedEdition(_)
                | Grib2Error::UnsupportedGridTemplate(_)
                | Grib2Error::UnsupportedPackingTemplate(_)
                | Grib2Error::UnsupportedBitmapIndicator(_)
        )
    }
}
