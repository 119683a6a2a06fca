//! Route table and middleware assembly.

use std::path::Path;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::bootstrap::CorsConfig;
use crate::handlers;
use crate::state::AppState;

/// API-only router: generation plus the utility endpoints.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/favicon.ico", get(favicon))
        .route("/api/generate", post(handlers::generate::generate))
        .layer(build_cors_layer(cors))
        .with_state(state)
}

/// Full router: the API plus the static frontend, with `index.html`
/// as the fallback for unmatched paths.
pub fn create_spa_router(state: AppState, static_dir: &Path, cors: &CorsConfig) -> Router {
    let index = static_dir.join("index.html");
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(index));
    create_router(state, cors).fallback_service(spa)
}

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Liveness probe.
async fn health_check() -> &'static str {
    "OK"
}

/// Quiet 204 for the browser's automatic favicon request.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
