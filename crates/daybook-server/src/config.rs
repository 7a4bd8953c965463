//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use daybook_shared::constants::{DEFAULT_HTTP_PORT, MAX_IMAGE_SIZE};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path where uploaded images are stored.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./blobs`
    pub blob_storage_path: PathBuf,

    /// Base URL clients reach this server at; upload and download URLs
    /// handed out are built from it.
    /// Env: `PUBLIC_URL`
    /// Default: `http://127.0.0.1:8080`
    pub public_url: String,

    /// Maximum upload size in bytes.
    /// Env: `MAX_BLOB_SIZE`
    /// Default: 20 MiB
    pub max_blob_size: usize,

    /// How long an issued upload URL stays valid.
    /// Env: `UPLOAD_URL_TTL_SECS`
    /// Default: one hour
    pub upload_url_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            blob_storage_path: PathBuf::from("./blobs"),
            public_url: format!("http://127.0.0.1:{DEFAULT_HTTP_PORT}"),
            max_blob_size: MAX_IMAGE_SIZE,
            upload_url_ttl: Duration::from_secs(3600),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("BLOB_STORAGE_PATH") {
            config.blob_storage_path = PathBuf::from(path);
        }

        if let Some(url) = lookup("PUBLIC_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.public_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid PUBLIC_URL, using default");
            }
        }

        if let Some(val) = lookup("MAX_BLOB_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_blob_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_BLOB_SIZE, using default"),
            }
        }

        if let Some(val) = lookup("UPLOAD_URL_TTL_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => config.upload_url_ttl = Duration::from_secs(n),
                _ => tracing::warn!(value = %val, "Invalid UPLOAD_URL_TTL_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
