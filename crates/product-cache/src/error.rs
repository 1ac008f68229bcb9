//! Error types for the product cache.

use grib2_parser::Grib2Error;
use thiserror::Error;

/// Outcome of a failed refresh.
///
/// `Clone` so a single refresh result can be handed to every coalesced
/// waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Decode failed: {0}")]
    Decode(#[from] Grib2Error),

    #[error("Decode task failed: {0}")]
    Join(String),

    #[error("Refresh ended without publishing a result")]
    RefreshAborted,
}

impl CacheError {
    /// Stable identifier for logs and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "FetchFailed",
            Self::Decode(e) => e.kind(),
            Self::Join(_) => "DecodeTaskFailed",
            Self::RefreshAborted => "RefreshAborted",
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
