//! Storage setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use tubely_core::{AssetClass, Config};
use tubely_storage::{create_storage, Storage};

/// Build the backend configured for `class`.
pub async fn setup_storage(config: &Config, class: AssetClass) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config, class)
        .await
        .with_context(|| format!("Failed to initialize {} storage", class))?;
    tracing::info!(
        asset_class = %class,
        backend = %storage.backend_type(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
