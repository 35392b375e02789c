//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use tubely_core::{AssetClass, Config};

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let thumbnail = config.asset_policy(AssetClass::Thumbnail);
    let video = config.asset_policy(AssetClass::Video);
    tracing::info!(
        max_thumbnail_mb = thumbnail.max_bytes / 1024 / 1024,
        max_video_mb = video.max_bytes / 1024 / 1024,
        thumbnail_types = %thumbnail.allowed_content_types.join(","),
        video_types = %video.allowed_content_types.join(","),
        thumbnail_backend = %config.storage_backend(AssetClass::Thumbnail),
        video_backend = %config.storage_backend(AssetClass::Video),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
