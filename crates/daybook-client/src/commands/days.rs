//! Day aggregate operations.
//!
//! This is the only code that read-modify-writes a [`DayRecord`]. Every
//! operation loads the record for one `(owner, date)`, applies a single
//! entry-codec operation and writes the result back, keeping
//! `entry_count` in step with the blob and deleting the record once its
//! last entry is gone.
//!
//! Edits and deletes that point at a missing day or a stale index are
//! accepted as no-ops: a second tab or a double submit has usually already
//! done the work, and surfacing an error for it would only confuse.
//! Store failures are logged with their context and returned unchanged.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use daybook_shared::clock;
use daybook_shared::constants::IMAGE_ONLY_BODY;
use daybook_shared::entry::{self, Entry};
use daybook_shared::{CodecError, DayDate, OwnerId, ValidationError};
use daybook_store::{DayRecord, DayStore, StoreError};

use crate::error::{ClientError, Result};

/// Outcome of an edit or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayChange {
    /// Nothing to do (no record, or only stale indices).
    Unchanged,
    /// The record was rewritten.
    Saved(DayRecord),
    /// The last entry went away and the record with it.
    Removed { id: Uuid },
}

/// Append one entry to the day, creating the record if needed.
///
/// `time` is a 24-hour `HH:MM` picker value; without it the entry is
/// stamped with the current local time. `attachments` are appended to the
/// day's existing references, duplicates included.
pub fn append<S: DayStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    date: DayDate,
    body: &str,
    time: Option<&str>,
    attachments: &[String],
) -> Result<DayRecord> {
    let body = body.trim();
    if body.is_empty() && attachments.is_empty() {
        return Err(ValidationError::EmptyEntry.into());
    }
    let timestamp = match time {
        Some(time) => clock::to_display_time(time)?,
        None => clock::now_display_time(),
    };
    let entry = Entry::new(timestamp, if body.is_empty() { IMAGE_ONLY_BODY } else { body });

    let existing = store
        .find_day(owner, date)
        .map_err(|e| store_failure("append", owner, date, e))?;

    let record = match existing {
        Some(mut record) => {
            record.content = entry::append_entry(&record.content, &entry);
            record.entry_count = count(&record.content);
            record.last_updated = Utc::now();
            record.attachments.extend(attachments.iter().cloned());

            store
                .update_day(&record)
                .map_err(|e| store_failure("append", owner, date, e))?;
            record
        }
        None => {
            let content = entry::append_entry("", &entry);
            let record = DayRecord {
                id: Uuid::new_v4(),
                owner: owner.clone(),
                date,
                entry_count: count(&content),
                content,
                last_updated: Utc::now(),
                attachments: attachments.to_vec(),
            };

            store
                .insert_day(&record)
                .map_err(|e| store_failure("append", owner, date, e))?;
            record
        }
    };

    info!(
        owner = %owner,
        date = %date,
        count = record.entry_count,
        images = attachments.len(),
        "Entry appended"
    );
    Ok(record)
}

/// Replace the body (and optionally the time) of the entry at `index`.
///
/// Without `new_time` the stored stamp is kept verbatim.
pub fn edit_entry<S: DayStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    date: DayDate,
    index: usize,
    new_body: &str,
    new_time: Option<&str>,
) -> Result<DayChange> {
    if let Some(time) = new_time {
        clock::to_display_time(time)?;
    }

    let Some(mut record) = store
        .find_day(owner, date)
        .map_err(|e| store_failure("edit", owner, date, e))?
    else {
        debug!(owner = %owner, date = %date, index, "Edit on missing day ignored");
        return Ok(DayChange::Unchanged);
    };

    record.content = match entry::edit_entry_at(&record.content, index, new_body, new_time) {
        Ok(content) => content,
        Err(CodecError::IndexOutOfRange { len, .. }) => {
            debug!(owner = %owner, date = %date, index, len, "Edit on stale index ignored");
            return Ok(DayChange::Unchanged);
        }
        Err(CodecError::Validation(e)) => return Err(e.into()),
    };

    let change = persist(store, record, "edit")?;
    debug!(owner = %owner, date = %date, index, "Entry edited");
    Ok(change)
}

/// Remove the entries at `indices` in one write.
///
/// Out-of-range indices are skipped. When no entry survives, the record is
/// deleted instead of being left empty.
pub fn delete_entries<S: DayStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    date: DayDate,
    indices: &[usize],
) -> Result<DayChange> {
    let Some(mut record) = store
        .find_day(owner, date)
        .map_err(|e| store_failure("delete", owner, date, e))?
    else {
        debug!(owner = %owner, date = %date, "Delete on missing day ignored");
        return Ok(DayChange::Unchanged);
    };

    let before = entry::entry_count(&record.content);
    let content = entry::delete_entries_at(&record.content, indices);
    let removed = before - entry::entry_count(&content);
    if removed == 0 {
        debug!(owner = %owner, date = %date, ?indices, "Delete matched no entries");
        return Ok(DayChange::Unchanged);
    }
    record.content = content;

    let change = persist(store, record, "delete")?;
    info!(owner = %owner, date = %date, removed, "Entries deleted");
    Ok(change)
}

/// Every day record of `owner`, keyed by date.
pub fn list<S: DayStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
) -> Result<BTreeMap<DayDate, DayRecord>> {
    let days = store.list_days(owner).map_err(|e| {
        error!(owner = %owner, operation = "list", error = %e, "Store call failed");
        ClientError::Store(e)
    })?;
    Ok(days.into_iter().map(|day| (day.date, day)).collect())
}

pub fn get<S: DayStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    date: DayDate,
) -> Result<Option<DayRecord>> {
    store
        .find_day(owner, date)
        .map_err(|e| store_failure("get", owner, date, e))
}

/// Write back a modified record, or drop it once it holds no entries.
fn persist<S: DayStore + ?Sized>(
    store: &S,
    mut record: DayRecord,
    operation: &str,
) -> Result<DayChange> {
    let owner = record.owner.clone();
    let date = record.date;

    record.entry_count = count(&record.content);
    if record.entry_count == 0 {
        store
            .delete_day(record.id)
            .map_err(|e| store_failure(operation, &owner, date, e))?;
        info!(owner = %owner, date = %date, "Last entry removed, day deleted");
        return Ok(DayChange::Removed { id: record.id });
    }

    record.last_updated = Utc::now();
    store
        .update_day(&record)
        .map_err(|e| store_failure(operation, &owner, date, e))?;
    Ok(DayChange::Saved(record))
}

fn count(content: &str) -> u32 {
    entry::entry_count(content) as u32
}

fn store_failure(operation: &str, owner: &OwnerId, date: DayDate, e: StoreError) -> ClientError {
    error!(owner = %owner, date = %date, operation, error = %e, "Store call failed");
    ClientError::Store(e)
}
