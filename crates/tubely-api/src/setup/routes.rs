//! Route table and HTTP layers

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::Config;

use crate::handlers::{health, upload};
use crate::state::AppState;

pub fn setup_routes(state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(&state.config)?;
    Ok(build_router(state).layer(cors))
}

/// Routes and tracing without CORS, for embedding and tests.
pub fn build_router(state: Arc<AppState>) -> Router {
    let assets_path = format!("/{}", state.config.assets_url_prefix());
    let assets = ServeDir::new(state.config.assets_root());

    // Size is enforced while streaming, after auth and ownership have passed.
    let uploads = Router::new()
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(upload::upload_thumbnail),
        )
        .route("/api/video_upload/{video_id}", post(upload::upload_video))
        .layer(DefaultBodyLimit::disable());

    let router = Router::new()
        .route("/healthz", get(health::liveness))
        .merge(uploads);
    let router = if state.config.assets_url_prefix().is_empty() {
        router.fallback_service(assets)
    } else {
        router.nest_service(&assets_path, assets)
    };

    router.with_state(state).layer(TraceLayer::new_for_http())
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse())
            .collect::<Result<Vec<HeaderValue>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
