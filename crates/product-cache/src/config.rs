//! Cache configuration.

use std::time::Duration;

/// Freshness window used when nothing else is configured.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age at which an entry is served without refetching.
    pub freshness_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
        }
    }
}

impl CacheConfig {
    pub fn with_window(freshness_window: Duration) -> Self {
        Self { freshness_window }
    }

    /// Load configuration from environment variables.
    ///
    /// `PRODUCT_CACHE_TTL_SECS` overrides the freshness window; unparsable
    /// values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PRODUCT_CACHE_TTL_SECS") {
            if let Ok(secs) = val.trim().parse::<u64>() {
                config.freshness_window = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.freshness_window.is_zero() {
            return Err("freshness_window must be > 0".to_string());
        }
        Ok(())
    }
}
