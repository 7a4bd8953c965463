//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer.

use chrono::{DateTime, Utc};
use daybook_shared::entry::{self, Entry};
use daybook_shared::{DayDate, OwnerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Day record
// ---------------------------------------------------------------------------

/// All journal entries one owner wrote on one calendar date.
///
/// A row only exists while the day holds at least one entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Owning account.
    pub owner: OwnerId,
    /// Local calendar date.
    pub date: DayDate,
    /// Serialized entry log (see `daybook_shared::entry`).
    pub content: String,
    /// Always equal to the number of entries parsed from `content`.
    pub entry_count: u32,
    /// When the record was last written.
    pub last_updated: DateTime<Utc>,
    /// Image storage references, in upload order.
    pub attachments: Vec<String>,
}

impl DayRecord {
    pub fn entries(&self) -> Vec<Entry> {
        entry::parse_entries(&self.content)
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// An idea parked in the sidebar until it gets written up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: Uuid,
    pub owner: OwnerId,
    pub text: String,
    pub is_posted: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Local identity
// ---------------------------------------------------------------------------

/// The account this installation acts for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalIdentity {
    pub owner: OwnerId,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
