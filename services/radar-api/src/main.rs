//! Radar API server
//!
//! Serves metadata and rendered PNG overlays for MRMS radar products,
//! fetched from the upstream feed and decoded on demand.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use product_cache::ProductCache;
use radar_api::{build_router, AppState, HttpProductSource, ServiceConfig};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = ServiceConfig::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = config.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(config))
}

async fn async_main(config: ServiceConfig) -> Result<()> {
    // Initialize tracing
    let level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_thread_ids(true)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let catalog = Arc::new(config.load_catalog()?);
    let cache_config = config.cache_config()?;
    let source = HttpProductSource::new(
        &config.upstream_url,
        config.http_timeout(),
        Arc::clone(&catalog),
    )
    .context("Failed to build HTTP client")?;

    info!(
        upstream = %config.upstream_url,
        products = catalog.products.len(),
        freshness_window_secs = cache_config.freshness_window.as_secs(),
        "Starting radar API"
    );

    let cache = ProductCache::new(cache_config, Arc::new(source));
    let state = Arc::new(AppState::new(cache, catalog).with_prometheus(prometheus));
    let app = build_router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Radar API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Radar API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
