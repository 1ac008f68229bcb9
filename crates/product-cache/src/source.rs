//! Where product bytes come from.

use async_trait::async_trait;
use bytes::Bytes;

/// Fetches the current message for a product key.
///
/// Implementations return the decompressed GRIB2 bytes. The error is a
/// human-readable description; the cache wraps it in
/// [`CacheError::Fetch`](crate::CacheError::Fetch).
#[async_trait]
pub trait ProductSource: Send + Sync + 'static {
    async fn fetch(&self, product_key: &str) -> Result<Bytes, String>;
}
