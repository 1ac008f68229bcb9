//! Service configuration: command line / environment and the product catalog.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use product_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_UPSTREAM_URL: &str = "https://mrms.ncep.noaa.gov/data/2D";

const BUILTIN_CATALOG: &str = include_str!("../config/products.yaml");

/// Radar API server
#[derive(Parser, Debug, Clone)]
#[command(name = "radar-api")]
#[command(about = "Serves decoded MRMS radar metadata and rendered PNG overlays")]
pub struct ServiceConfig {
    /// Listen host
    #[arg(long, default_value = "0.0.0.0", env = "RADAR_API_HOST")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value = "8080", env = "RADAR_API_PORT")]
    pub port: u16,

    /// Log level
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Freshness window in seconds (defaults to PRODUCT_CACHE_TTL_SECS, then 120)
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,

    /// Base URL products are downloaded from
    #[arg(long, default_value = DEFAULT_UPSTREAM_URL, env = "MRMS_BASE_URL")]
    pub upstream_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "30", env = "UPSTREAM_TIMEOUT_SECS")]
    pub http_timeout_secs: u64,

    /// Product catalog YAML (built-in MRMS catalog when omitted)
    #[arg(long, env = "PRODUCT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long, env = "WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Cache settings: environment first, then the command-line override.
    pub fn cache_config(&self) -> Result<CacheConfig> {
        let mut config = CacheConfig::from_env();
        if let Some(secs) = self.cache_ttl_secs {
            config.freshness_window = Duration::from_secs(secs);
        }
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    pub fn load_catalog(&self) -> Result<ProductCatalog> {
        match &self.catalog {
            Some(path) => ProductCatalog::from_file(path),
            None => ProductCatalog::builtin(),
        }
    }
}

/// One servable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub key: String,
    /// Path of the (optionally gzipped) GRIB2 file under the upstream URL.
    pub file: String,
    #[serde(default)]
    pub description: String,
}

/// The closed set of product keys the service will fetch and cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub products: Vec<ProductSpec>,
}

impl ProductCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG).context("Built-in product catalog is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        info!(path = %path.display(), products = catalog.products.len(), "Loaded product catalog");
        Ok(catalog)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(content)?;
        if catalog.products.is_empty() {
            anyhow::bail!("catalog lists no products");
        }
        if let Some(dup) = catalog
            .products
            .iter()
            .enumerate()
            .find(|(i, p)| catalog.products[..*i].iter().any(|q| q.key == p.key))
        {
            anyhow::bail!("duplicate product key {}", dup.1.key);
        }
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&ProductSpec> {
        self.products.iter().find(|p| p.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ProductCatalog::builtin().unwrap();
        let spec = catalog.get("MergedReflectivityQCComposite").unwrap();
        assert!(spec.file.ends_with(".grib2.gz"));
        assert!(!catalog.contains("Temperature"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let yaml = "products:\n  - key: A\n    file: a.grib2\n  - key: A\n    file: b.grib2\n";
        assert!(ProductCatalog::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(ProductCatalog::from_yaml("products: []").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let config = ServiceConfig::parse_from([
            "radar-api",
            "--port",
            "9000",
            "--cache-ttl-secs",
            "30",
        ]);
        assert_eq!(config.listen_addr().unwrap().port(), 9000);
        assert_eq!(
            config.cache_config().unwrap().freshness_window,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = ServiceConfig::parse_from(["radar-api", "--cache-ttl-secs", "0"]);
        assert!(config.cache_config().is_err());
    }
}
