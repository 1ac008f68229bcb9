//! MRMS radar API: fetches, decodes and caches radar products and serves
//! their metadata and PNG renderings.

pub mod config;
pub mod error;
pub mod handlers;
pub mod source;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::{ProductCatalog, ProductSpec, ServiceConfig};
pub use error::ApiError;
pub use source::HttpProductSource;
pub use state::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Radar products
        .route("/api/radar/products", get(handlers::products_handler))
        .route("/api/radar/legend", get(handlers::legend_handler))
        .route("/api/radar/:product/metadata", get(handlers::metadata_handler))
        .route("/api/radar/:product/image.png", get(handlers::image_handler))
        // Cache
        .route("/api/cache/stats", get(handlers::stats_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
