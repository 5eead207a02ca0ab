//! HTTP API of the zkauth service.
//!
//! - [`errors`] – API error types and conversions from service errors.
//! - [`health`] – health endpoint (`/health`).
//! - [`info`] – info about the deployment (`/info`).
//! - [`v1`] – version 1 of the admission, address and key endpoints under `/api/v1`.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod info;
pub(crate) mod v1;

/// Builds the main API router.
///
/// Nests [`v1`] under `/api/v1`, merges [`health`] and [`info`] and adds an HTTP trace layer.
pub(crate) fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", v1::routes())
        .merge(health::routes())
        .merge(info::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
