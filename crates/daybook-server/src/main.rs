//! # daybook-server
//!
//! Hosted image storage for Daybook journals.
//!
//! This binary provides:
//! - **One-time upload URLs** so clients never hold a long-lived write key
//! - **Image blob storage** on local disk with a metadata sidecar per blob
//! - **REST API** (axum) to upload, fetch, resolve and delete images

mod api;
mod blob_store;
mod config;
mod error;
mod upload_tokens;

use std::sync::Arc;

use daybook_shared::constants::APP_NAME;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::blob_store::BlobStore;
use crate::config::ServerConfig;
use crate::upload_tokens::UploadTokens;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,daybook_server=debug")),
        )
        .init();

    info!("Starting {} blob server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let blob_store = Arc::new(
        BlobStore::new(config.blob_storage_path.clone(), config.max_blob_size).await?,
    );
    info!(count = blob_store.list_blobs().await?.len(), "Existing blobs on disk");

    let upload_tokens = UploadTokens::new(config.upload_url_ttl);

    let http_addr = config.http_addr;
    let app_state = AppState {
        blob_store,
        upload_tokens: upload_tokens.clone(),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Drop expired upload tokens every minute
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            upload_tokens.purge_expired().await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
