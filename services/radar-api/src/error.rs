//! Mapping of service errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use product_cache::CacheError;
use renderer::RenderError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Render task failed: {0}")]
    RenderTask(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownProduct(_) => StatusCode::NOT_FOUND,
            Self::Cache(CacheError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            Self::Cache(CacheError::Decode(e)) if e.is_unsupported() => {
                StatusCode::NOT_IMPLEMENTED
            }
            Self::Cache(CacheError::Decode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cache(CacheError::RefreshAborted) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Cache(CacheError::Join(_)) | Self::Render(_) | Self::RenderTask(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownProduct(_) => "UnknownProduct",
            Self::Cache(e) => e.kind(),
            Self::Render(_) | Self::RenderTask(_) => "RenderFailed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, kind = self.kind(), "Request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
