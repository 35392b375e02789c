//! Application setup and initialization
//!
//! Everything `main` needs to turn a validated [`Config`] into a router:
//! record store, storage backends, the upload pipeline and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tubely_core::{AssetClass, Config};
use tubely_storage::KeyGenerator;

use crate::auth::JwtVerifier;
use crate::pipeline::{AssetTarget, UploadPipeline};
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let records = database::setup_record_store(&config).await?;

    let thumbnails = AssetTarget {
        policy: config.asset_policy(AssetClass::Thumbnail),
        storage: storage::setup_storage(&config, AssetClass::Thumbnail).await?,
    };
    let videos = AssetTarget {
        policy: config.asset_policy(AssetClass::Video),
        storage: storage::setup_storage(&config, AssetClass::Video).await?,
    };

    let verifier = Arc::new(JwtVerifier::new(config.jwt_secret(), config.jwt_issuer()));
    let pipeline = UploadPipeline::new(verifier, records, KeyGenerator::new(), thumbnails, videos);

    let state = Arc::new(AppState {
        config,
        pipeline: Arc::new(pipeline),
    });
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
