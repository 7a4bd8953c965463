use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use daybook_shared::constants::DEFAULT_BASE_YEARS;
use daybook_store::Database;

use crate::error::Result;

/// User preferences persisted in the `app_settings` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub display_name: Option<String>,
    /// Overrides `ClientConfig::blob_server_url` when set.
    pub blob_server_url: Option<String>,
    /// Years always offered by the year selector.
    pub base_years: Vec<i32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            display_name: None,
            blob_server_url: None,
            base_years: DEFAULT_BASE_YEARS.to_vec(),
        }
    }
}

/// Stored settings, or the defaults when none were saved yet or the stored
/// JSON no longer parses.
pub fn get_settings(db: &Database) -> Result<AppSettings> {
    match db.load_settings::<AppSettings>() {
        Ok(settings) => Ok(settings.unwrap_or_default()),
        Err(daybook_store::StoreError::Json(e)) => {
            warn!(error = %e, "Corrupt settings JSON, using defaults");
            Ok(AppSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn update_settings(db: &Database, settings: &AppSettings) -> Result<()> {
    let mut settings = settings.clone();
    settings.display_name = settings
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    settings.blob_server_url = settings
        .blob_server_url
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty());

    db.save_settings(&settings)?;
    info!(name = ?settings.display_name, blob_url = ?settings.blob_server_url, "Settings updated");
    Ok(())
}
