//! The handle a UI holds.
//!
//! [`Journal`] owns the shared [`AppState`] and the event channel. Each
//! method takes the lock once, runs one command against the database on
//! behalf of the current owner, and emits a [`JournalEvent`] when
//! something changed. Dates and ids arrive as strings from the UI and are
//! validated here before the lock is taken.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use daybook_shared::{DayDate, OwnerId, ValidationError};
use daybook_store::{Database, DayRecord, Draft, StoreError};

use crate::commands::attachments::{self, BlobStorage, HttpBlobStorage, PendingImage};
use crate::commands::calendar::{self, CalendarDay, Stats};
use crate::commands::days::{self, DayChange};
use crate::commands::settings::{self, AppSettings};
use crate::commands::{drafts, export};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{emit_event, JournalEvent, EVENT_CHANNEL_CAPACITY};
use crate::identity::{self, IdentityProvider};
use crate::state::AppState;

#[derive(Clone)]
pub struct Journal {
    state: Arc<Mutex<AppState>>,
    events: broadcast::Sender<JournalEvent>,
}

impl Journal {
    /// Open the database under `config.data_dir` and load (or create) the
    /// local identity.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(StoreError::from)?;
        let db = Database::open_at(&config.database_path())?;

        let settings = settings::get_settings(&db)?;
        let identity = identity::load_or_create_identity(&db, settings.display_name.clone())?;
        let blob_server_url = settings
            .blob_server_url
            .clone()
            .unwrap_or_else(|| config.blob_server_url.clone());

        info!(
            path = %config.database_path().display(),
            owner = %identity.owner,
            blob_url = %blob_server_url,
            "Journal opened"
        );

        let mut state = AppState::new();
        state.identity = Some(Box::new(identity));
        state.database = Some(db);
        state.settings = settings;
        state.blob_server_url = blob_server_url;
        Ok(Self::with_state(state))
    }

    /// Assemble a journal from an already opened database and an external
    /// identity provider.
    pub fn from_parts(
        db: Database,
        identity: impl IdentityProvider + Send + 'static,
        blob_server_url: impl Into<String>,
    ) -> Result<Self> {
        let settings = settings::get_settings(&db)?;

        let mut state = AppState::new();
        state.identity = Some(Box::new(identity));
        state.database = Some(db);
        state.settings = settings;
        state.blob_server_url = blob_server_url.into();
        Ok(Self::with_state(state))
    }

    fn with_state(state: AppState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(state)),
            events,
        }
    }

    /// Receive a [`JournalEvent`] after every successful mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.events.subscribe()
    }

    pub fn owner(&self) -> Result<OwnerId> {
        let guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        guard.owner().ok_or(ClientError::NoIdentity)
    }

    /// Run `f` with the database and current owner while holding the lock.
    fn with_db<T>(&self, f: impl FnOnce(&Database, &OwnerId) -> Result<T>) -> Result<T> {
        let guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        let owner = guard.owner().ok_or(ClientError::NoIdentity)?;
        let db = guard.database.as_ref().ok_or(ClientError::NoDatabase)?;
        f(db, &owner)
    }

    fn emit_day_change(&self, date: DayDate, change: &DayChange) {
        match change {
            DayChange::Unchanged => {}
            DayChange::Saved(record) => emit_event(
                &self.events,
                JournalEvent::DayChanged {
                    date,
                    entry_count: record.entry_count,
                },
            ),
            DayChange::Removed { .. } => {
                emit_event(&self.events, JournalEvent::DayRemoved { date })
            }
        }
    }

    // ------------------------------------------------------------------
    // Days
    // ------------------------------------------------------------------

    /// Append an entry to `date`. Returns the day record's id.
    pub fn append(
        &self,
        date: &str,
        body: &str,
        time: Option<&str>,
        attachments: &[String],
    ) -> Result<Uuid> {
        let date = DayDate::parse(date)?;
        let record =
            self.with_db(|db, owner| days::append(db, owner, date, body, time, attachments))?;
        emit_event(
            &self.events,
            JournalEvent::DayChanged {
                date,
                entry_count: record.entry_count,
            },
        );
        Ok(record.id)
    }

    /// Upload the pending images, then append an entry referencing them.
    ///
    /// Input is validated before anything is uploaded. If the append itself
    /// fails, the uploaded blobs stay orphaned on the server.
    pub async fn append_with_images<B: BlobStorage>(
        &self,
        storage: &B,
        date: &str,
        body: &str,
        time: Option<&str>,
        images: &mut [PendingImage],
    ) -> Result<Uuid> {
        DayDate::parse(date)?;
        if let Some(time) = time {
            daybook_shared::clock::to_display_time(time)?;
        }
        if body.trim().is_empty() && !images.iter().any(PendingImage::is_image) {
            return Err(ValidationError::EmptyEntry.into());
        }

        let ids = attachments::upload_images(storage, images).await?;
        self.append(date, body, time, &ids)
    }

    pub fn edit_entry(
        &self,
        date: &str,
        index: usize,
        new_body: &str,
        new_time: Option<&str>,
    ) -> Result<DayChange> {
        let date = DayDate::parse(date)?;
        let change = self.with_db(|db, owner| {
            days::edit_entry(db, owner, date, index, new_body, new_time)
        })?;
        self.emit_day_change(date, &change);
        Ok(change)
    }

    pub fn delete_entries(&self, date: &str, indices: &[usize]) -> Result<DayChange> {
        let date = DayDate::parse(date)?;
        let change = self.with_db(|db, owner| days::delete_entries(db, owner, date, indices))?;
        self.emit_day_change(date, &change);
        Ok(change)
    }

    pub fn list(&self) -> Result<BTreeMap<DayDate, DayRecord>> {
        self.with_db(|db, owner| days::list(db, owner))
    }

    pub fn get(&self, date: &str) -> Result<Option<DayRecord>> {
        let date = DayDate::parse(date)?;
        self.with_db(|db, owner| days::get(db, owner, date))
    }

    // ------------------------------------------------------------------
    // Calendar and export
    // ------------------------------------------------------------------

    pub fn stats(&self) -> Result<Stats> {
        Ok(calendar::stats(&self.list()?, DayDate::today()))
    }

    pub fn year_days(&self, year: i32) -> Result<Vec<CalendarDay>> {
        Ok(calendar::year_days(year, &self.list()?))
    }

    pub fn available_years(&self) -> Result<Vec<i32>> {
        let base_years = self.get_settings()?.base_years;
        Ok(calendar::available_years(&self.list()?, &base_years))
    }

    pub fn export_all(&self) -> Result<String> {
        Ok(export::export_all(&self.list()?))
    }

    /// Raw text of the selected entries of `date`; empty if the day is empty.
    pub fn copy_selected(&self, date: &str, indices: &[usize]) -> Result<String> {
        Ok(self
            .get(date)?
            .map(|record| export::copy_selected(&record.content, indices))
            .unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    pub fn get_drafts(&self) -> Result<Vec<Draft>> {
        self.with_db(|db, owner| drafts::get_drafts(db, owner))
    }

    pub fn add_draft(&self, text: &str) -> Result<Draft> {
        let draft = self.with_db(|db, owner| drafts::add_draft(db, owner, text))?;
        emit_event(&self.events, JournalEvent::DraftsChanged);
        Ok(draft)
    }

    pub fn toggle_draft(&self, id: &str) -> Result<Option<bool>> {
        let id = Uuid::parse_str(id)?;
        let flag = self.with_db(|db, owner| drafts::toggle_draft(db, owner, id))?;
        if flag.is_some() {
            emit_event(&self.events, JournalEvent::DraftsChanged);
        }
        Ok(flag)
    }

    pub fn delete_draft(&self, id: &str) -> Result<bool> {
        let id = Uuid::parse_str(id)?;
        let deleted = self.with_db(|db, owner| drafts::delete_draft(db, owner, id))?;
        if deleted {
            emit_event(&self.events, JournalEvent::DraftsChanged);
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// HTTP blob storage at the configured server.
    pub fn blob_storage(&self) -> Result<HttpBlobStorage> {
        let guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        Ok(HttpBlobStorage::new(guard.blob_server_url.clone()))
    }

    pub async fn image_urls<B: BlobStorage>(
        &self,
        storage: &B,
        storage_ids: &[String],
    ) -> Result<Vec<Option<String>>> {
        attachments::image_urls(storage, storage_ids).await
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn get_settings(&self) -> Result<AppSettings> {
        let guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        Ok(guard.settings.clone())
    }

    pub fn update_settings(&self, new_settings: &AppSettings) -> Result<()> {
        let mut guard = self.state.lock().map_err(|_| ClientError::LockPoisoned)?;
        let db = guard.database.as_ref().ok_or(ClientError::NoDatabase)?;

        settings::update_settings(db, new_settings)?;
        let stored = settings::get_settings(db)?;

        if let Some(url) = &stored.blob_server_url {
            guard.blob_server_url = url.clone();
        }
        guard.settings = stored;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal() -> Journal {
        let db = Database::open_in_memory().unwrap();
        Journal::from_parts(db, OwnerId::new("user_2alice").unwrap(), "http://blob.test").unwrap()
    }

    #[test]
    fn malformed_date_rejected() {
        let journal = journal();
        for bad in ["2025-1-6", "+025-03-07", "2025-03- 7"] {
            let err = journal.append(bad, "x", None, &[]).unwrap_err();
            assert!(matches!(err, ClientError::Validation(ValidationError::MalformedDate(_))));
        }
        assert!(journal.list().unwrap().is_empty());
    }

    #[test]
    fn events_follow_mutations() {
        let journal = journal();
        let mut rx = journal.subscribe();

        journal.append("2025-01-06", "one", Some("09:00"), &[]).unwrap();
        journal.edit_entry("2025-01-06", 5, "stale", None).unwrap();
        journal.delete_entries("2025-01-06", &[0]).unwrap();

        let date = DayDate::parse("2025-01-06").unwrap();
        assert_eq!(rx.try_recv().unwrap(), JournalEvent::DayChanged { date, entry_count: 1 });
        assert_eq!(rx.try_recv().unwrap(), JournalEvent::DayRemoved { date });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn draft_ids_validated() {
        let journal = journal();
        assert!(matches!(journal.toggle_draft("not-a-uuid"), Err(ClientError::InvalidId(_))));
        let draft = journal.add_draft("idea").unwrap();
        assert_eq!(journal.toggle_draft(&draft.id.to_string()).unwrap(), Some(true));
    }

    #[test]
    fn settings_cached_and_applied() {
        let journal = journal();
        let mut settings = journal.get_settings().unwrap();
        settings.blob_server_url = Some("https://blobs.example.org/".into());
        settings.base_years = vec![2020];
        journal.update_settings(&settings).unwrap();

        assert_eq!(journal.blob_storage().unwrap().base_url(), "https://blobs.example.org");
        journal.append("2025-01-06", "x", Some("09:00"), &[]).unwrap();
        assert_eq!(journal.available_years().unwrap(), [2025, 2020]);
    }

    #[test]
    fn signed_out_is_an_error() {
        let journal = Journal::with_state(AppState::new());
        assert!(matches!(journal.list(), Err(ClientError::NoIdentity)));
    }
}
