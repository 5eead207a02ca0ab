//! Health Endpoint
//!
//! - `/health` – answers `200 healthy` as long as the server runs
//!
//! The endpoint includes a `Cache-Control: no-cache` header to prevent caching of responses.
use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::AppState;

/// Create a router containing the health endpoint.
pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
