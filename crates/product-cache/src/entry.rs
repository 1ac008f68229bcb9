//! Published cache entries and the metadata record derived from them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use grib2_parser::{normalize_longitude, DecodedGrid, DecodedMessage, GridGeometry};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Whether a lookup was served within the freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
}

/// One decoded product. Immutable once published; a refresh replaces the
/// whole entry.
#[derive(Debug)]
pub struct CacheEntry {
    product_key: String,
    message: DecodedMessage,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(product_key: impl Into<String>, message: DecodedMessage) -> Self {
        Self {
            product_key: product_key.into(),
            message,
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        }
    }

    pub fn product_key(&self) -> &str {
        &self.product_key
    }

    pub fn message(&self) -> &DecodedMessage {
        &self.message
    }

    pub fn grid(&self) -> &DecodedGrid {
        &self.message.grid
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.message.geometry
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }

    pub fn is_fresh(&self, window: Duration) -> bool {
        self.age() < window
    }

    /// Display metadata. Longitudes are normalized to -180..180.
    pub fn metadata(&self) -> GridMetadata {
        let geometry = self.geometry();
        let product = &self.message.product;
        GridMetadata {
            product: self.product_key.clone(),
            timestamp: self.message.identification.reference_time,
            fetched_at: self.fetched_at_utc,
            points_x: geometry.points_x,
            points_y: geometry.points_y,
            lat_first: geometry.lat_first,
            lon_first: normalize_longitude(geometry.lon_first),
            lat_last: geometry.lat_last,
            lon_last: normalize_longitude(geometry.lon_last),
            product_template: product.template,
            parameter_category: product.parameter_category,
            parameter_number: product.parameter_number,
        }
    }
}

/// Grid metadata consumed by the map display to place the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMetadata {
    pub product: String,
    /// Reference time of the measurement.
    pub timestamp: DateTime<Utc>,
    /// When this process fetched the message.
    pub fetched_at: DateTime<Utc>,
    pub points_x: u32,
    pub points_y: u32,
    pub lat_first: f64,
    pub lon_first: f64,
    pub lat_last: f64,
    pub lon_last: f64,
    /// Section 4 product definition template number.
    pub product_template: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
}
