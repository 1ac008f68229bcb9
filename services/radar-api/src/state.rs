//! Shared application state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use product_cache::ProductCache;

use crate::config::ProductCatalog;

pub struct AppState {
    pub cache: ProductCache,
    pub catalog: Arc<ProductCatalog>,
    /// Present when a Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(cache: ProductCache, catalog: Arc<ProductCatalog>) -> Self {
        Self {
            cache,
            catalog,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
