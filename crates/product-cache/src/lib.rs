//! In-memory cache of decoded radar products.
//!
//! Holds the latest decoded message per product key, serves it while it is
//! younger than the freshness window and refreshes it through a
//! [`ProductSource`] otherwise. One refresh runs per key at a time.

pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod source;
pub mod stats;

pub use cache::ProductCache;
pub use config::{CacheConfig, DEFAULT_FRESHNESS_WINDOW};
pub use entry::{CacheEntry, Freshness, GridMetadata};
pub use error::{CacheError, CacheResult};
pub use source::ProductSource;
pub use stats::{CacheStats, CacheStatsSnapshot};
