//! HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Path},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use product_cache::{CacheEntry, CacheStatsSnapshot, Freshness};
use renderer::{png, ColorTable, REFLECTIVITY};
use serde::Serialize;
use tracing::debug;

use crate::config::ProductSpec;
use crate::error::ApiError;
use crate::state::AppState;

pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// GET /health
pub async fn health_handler() -> &'static str {
    "OK"
}

/// GET /api/radar/products
pub async fn products_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<ProductSpec>> {
    Json(state.catalog.products.clone())
}

/// GET /api/radar/:product/metadata
pub async fn metadata_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(product): Path<String>,
) -> Result<Response, ApiError> {
    counter!("radar_requests_total", "endpoint" => "metadata").increment(1);
    let (entry, freshness) = lookup(&state, &product).await?;

    let mut response = Json(entry.metadata()).into_response();
    set_cache_status(&mut response, freshness);
    Ok(response)
}

/// GET /api/radar/:product/image.png
pub async fn image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(product): Path<String>,
) -> Result<Response, ApiError> {
    counter!("radar_requests_total", "endpoint" => "image").increment(1);
    let (entry, freshness) = lookup(&state, &product).await?;

    let start = Instant::now();
    let png = tokio::task::spawn_blocking(move || png::encode_grid_png(entry.grid(), &REFLECTIVITY))
        .await
        .map_err(|e| ApiError::RenderTask(e.to_string()))??;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!("radar_render_duration_ms").record(elapsed_ms);
    debug!(product = %product, bytes = png.len(), elapsed_ms, "Rendered PNG");

    let max_age = state.cache.config().freshness_window.as_secs();
    let cache_control = format!("public, max-age={max_age}");

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        png,
    )
        .into_response();
    set_cache_status(&mut response, freshness);
    Ok(response)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStatsSnapshot,
    pub hit_rate: f64,
    pub in_flight: usize,
}

/// GET /api/cache/stats
pub async fn stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse {
        stats,
        hit_rate: stats.hit_rate(),
        in_flight: state.cache.in_flight_count(),
    })
}

#[derive(Serialize)]
pub struct LegendResponse {
    pub unit: &'static str,
    #[serde(flatten)]
    pub table: ColorTable,
}

/// GET /api/radar/legend
pub async fn legend_handler() -> Json<LegendResponse> {
    Json(LegendResponse {
        unit: "dBZ",
        table: REFLECTIVITY,
    })
}

/// GET /metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Resolve `product` against the catalog and fetch it from the cache,
/// tolerating a stale entry when the refresh fails.
async fn lookup(state: &AppState, product: &str) -> Result<(Arc<CacheEntry>, Freshness), ApiError> {
    if !state.catalog.contains(product) {
        return Err(ApiError::UnknownProduct(product.to_string()));
    }
    let (entry, freshness) = state.cache.get_or_stale(product).await?;
    if freshness == Freshness::Stale {
        counter!("radar_stale_responses_total").increment(1);
    }
    Ok((entry, freshness))
}

fn set_cache_status(response: &mut Response, freshness: Freshness) {
    let value = match freshness {
        Freshness::Fresh => "fresh",
        Freshness::Stale => "stale",
    };
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(value));
}
