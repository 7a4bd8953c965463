//! Client configuration loaded from environment variables.
//!
//! Everything has a default so a fresh install runs with no setup.

use std::path::PathBuf;

use daybook_shared::constants::DEFAULT_HTTP_PORT;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory holding `daybook.db`.
    /// Env: `DAYBOOK_DATA_DIR`
    /// Default: the platform data directory, or `./data` if there is none.
    pub data_dir: PathBuf,

    /// Base URL of the blob server used for image uploads.
    /// Env: `DAYBOOK_BLOB_URL`
    /// Default: `http://127.0.0.1:8080`
    pub blob_server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let data_dir = daybook_store::database::default_data_dir().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "No platform data directory, using ./data");
            PathBuf::from("./data")
        });

        Self {
            data_dir,
            blob_server_url: format!("http://127.0.0.1:{DEFAULT_HTTP_PORT}"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("DAYBOOK_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup("DAYBOOK_BLOB_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.blob_server_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid DAYBOOK_BLOB_URL, using default");
            }
        }

        config
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("daybook.db")
    }
}
