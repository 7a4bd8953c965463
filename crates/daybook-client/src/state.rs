//! Application state shared by every journal operation.
//!
//! [`AppState`] lives behind `Arc<Mutex<>>` in [`crate::journal::Journal`].
//! Holding the lock for a whole read-modify-write is what keeps two
//! appends to the same day from losing one another.

use daybook_shared::OwnerId;
use daybook_store::Database;

use crate::commands::settings::AppSettings;
use crate::identity::IdentityProvider;

/// Central application state.
pub struct AppState {
    /// Who the journal is written for.
    /// `None` until an identity is created, loaded or handed in.
    pub identity: Option<Box<dyn IdentityProvider + Send>>,

    /// Handle to the local SQLite database.
    /// `None` until the journal is opened.
    pub database: Option<Database>,

    /// Persisted user preferences, cached after load.
    pub settings: AppSettings,

    /// Base URL of the blob server in use.
    pub blob_server_url: String,
}

impl AppState {
    /// Create a new, uninitialised application state.
    pub fn new() -> Self {
        Self {
            identity: None,
            database: None,
            settings: AppSettings::default(),
            blob_server_url: String::new(),
        }
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.identity.as_ref().and_then(|i| i.current_owner())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
