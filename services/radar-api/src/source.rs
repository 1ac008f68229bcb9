//! Upstream fetch of product files over HTTP.

use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use flate2::read::GzDecoder;
use product_cache::ProductSource;
use tracing::debug;

use crate::config::ProductCatalog;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Downloads `<base_url>/<file>` for catalogued products.
pub struct HttpProductSource {
    client: reqwest::Client,
    base_url: String,
    catalog: Arc<ProductCatalog>,
}

impl HttpProductSource {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        catalog: Arc<ProductCatalog>,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("radar-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog,
        })
    }

    pub fn url_for(&self, product_key: &str) -> Option<String> {
        self.catalog
            .get(product_key)
            .map(|spec| format!("{}/{}", self.base_url, spec.file.trim_start_matches('/')))
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch(&self, product_key: &str) -> Result<Bytes, String> {
        let url = self
            .url_for(product_key)
            .ok_or_else(|| format!("product {product_key} is not in the catalog"))?;
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("GET {url}: {e}"))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| format!("GET {url}: reading body: {e}"))?;

        debug!(
            product = %product_key,
            url = %url,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downloaded product"
        );

        let body = tokio::task::spawn_blocking(move || maybe_gunzip(body))
            .await
            .map_err(|e| format!("decompression task failed: {e}"))??;
        Ok(body)
    }
}

/// Gunzip `data` when it starts with the gzip magic, else return it as is.
pub fn maybe_gunzip(data: Bytes) -> Result<Bytes, String> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data);
    }
    let mut out = Vec::with_capacity(data.len() * 4);
    GzDecoder::new(&data[..])
        .read_to_end(&mut out)
        .map_err(|e| format!("gzip decompression failed: {e}"))?;
    Ok(Bytes::from(out))
}
