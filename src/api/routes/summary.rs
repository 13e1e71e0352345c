//! Summary Route
//!
//! GET /v1/summary - The dashboard snapshot. Always 200; upstream failures
//! are listed in the body's `errors` array.

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::summary::build_summary;

/// GET /v1/summary
pub async fn get_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let started = Instant::now();
    let summary = build_summary(state.feeds.as_ref(), &state.config).await;

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        errors = summary.errors.len(),
        "Summary built"
    );

    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(summary),
    )
}

/// Fallback for unknown paths under /v1
pub async fn unknown_endpoint(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
