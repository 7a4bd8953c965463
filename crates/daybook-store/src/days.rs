//! Day records: one entry-log blob per (owner, date).

use chrono::{DateTime, Utc};
use daybook_shared::{DayDate, OwnerId};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::DayRecord;

/// Keyed access to day records.
///
/// Every write touches exactly one row, so each call is atomic on its own.
/// Callers that read-modify-write must serialise access to the same key
/// themselves.
pub trait DayStore {
    /// Fetch the record for `(owner, date)`, if one exists.
    fn find_day(&self, owner: &OwnerId, date: DayDate) -> Result<Option<DayRecord>>;

    /// Insert a new record. Fails if `(owner, date)` is already taken.
    fn insert_day(&self, record: &DayRecord) -> Result<()>;

    /// Overwrite content, count, timestamp and attachments of an existing
    /// record. Returns [`StoreError::NotFound`] when the id is unknown.
    fn update_day(&self, record: &DayRecord) -> Result<()>;

    /// Delete a record by id.  Returns `true` if a row was deleted.
    fn delete_day(&self, id: Uuid) -> Result<bool>;

    /// All records of one owner, oldest date first.
    fn list_days(&self, owner: &OwnerId) -> Result<Vec<DayRecord>>;
}

const DAY_COLUMNS: &str = "id, owner, date, content, entry_count, last_updated, attachments";

impl DayStore for Database {
    fn find_day(&self, owner: &OwnerId, date: DayDate) -> Result<Option<DayRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {DAY_COLUMNS} FROM days WHERE owner = ?1 AND date = ?2"),
                params![owner.as_str(), date.to_string()],
                row_to_day,
            )
            .optional()?;
        Ok(record)
    }

    fn insert_day(&self, record: &DayRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO days (id, owner, date, content, entry_count, last_updated, attachments)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.owner.as_str(),
                record.date.to_string(),
                record.content,
                record.entry_count,
                record.last_updated.to_rfc3339(),
                serde_json::to_string(&record.attachments)?,
            ],
        )?;
        Ok(())
    }

    fn update_day(&self, record: &DayRecord) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE days
             SET content = ?2, entry_count = ?3, last_updated = ?4, attachments = ?5
             WHERE id = ?1",
            params![
                record.id.to_string(),
                record.content,
                record.entry_count,
                record.last_updated.to_rfc3339(),
                serde_json::to_string(&record.attachments)?,
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete_day(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM days WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    fn list_days(&self, owner: &OwnerId) -> Result<Vec<DayRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {DAY_COLUMNS} FROM days WHERE owner = ?1 ORDER BY date ASC"
        ))?;

        let rows = stmt.query_map(params![owner.as_str()], row_to_day)?;

        let mut days = Vec::new();
        for row in rows {
            days.push(row?);
        }
        Ok(days)
    }
}

impl Database {
    /// Fetch a day record by id.
    pub fn get_day(&self, id: Uuid) -> Result<DayRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {DAY_COLUMNS} FROM days WHERE id = ?1"),
                params![id.to_string()],
                row_to_day,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Map a `rusqlite::Row` to a [`DayRecord`].
fn row_to_day(row: &rusqlite::Row<'_>) -> rusqlite::Result<DayRecord> {
    let id_str: String = row.get(0)?;
    let owner_str: String = row.get(1)?;
    let date_str: String = row.get(2)?;
    let content: String = row.get(3)?;
    let entry_count: u32 = row.get(4)?;
    let updated_str: String = row.get(5)?;
    let attachments_json: String = row.get(6)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_err(0, e))?;
    let owner = OwnerId::new(owner_str).map_err(|e| conversion_err(1, e))?;
    let date = DayDate::parse(&date_str).map_err(|e| conversion_err(2, e))?;

    let last_updated: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(5, e))?;

    let attachments: Vec<String> =
        serde_json::from_str(&attachments_json).map_err(|e| conversion_err(6, e))?;

    Ok(DayRecord {
        id,
        owner,
        date,
        content,
        entry_count,
        last_updated,
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, date: &str, content: &str) -> DayRecord {
        DayRecord {
            id: Uuid::new_v4(),
            owner: OwnerId::new(owner).unwrap(),
            date: DayDate::parse(date).unwrap(),
            content: content.to_string(),
            entry_count: daybook_shared::entry::entry_count(content) as u32,
            last_updated: Utc::now(),
            attachments: vec!["kg2abc".to_string()],
        }
    }

    #[test]
    fn insert_find_update_delete() {
        let db = Database::open_in_memory().unwrap();
        let mut day = record("alice", "2025-01-06", "[9:00 AM] hello");
        db.insert_day(&day).unwrap();

        let found = db.find_day(&day.owner, day.date).unwrap().unwrap();
        assert_eq!(found.id, day.id);
        assert_eq!(found.content, day.content);
        assert_eq!(found.attachments, vec!["kg2abc".to_string()]);

        day.content.push_str("\n\n[9:30 AM] again");
        day.entry_count = 2;
        day.attachments.push("kg2def".to_string());
        db.update_day(&day).unwrap();

        let updated = db.get_day(day.id).unwrap();
        assert_eq!(updated.entry_count, 2);
        assert_eq!(updated.attachments.len(), 2);

        assert!(db.delete_day(day.id).unwrap());
        assert!(!db.delete_day(day.id).unwrap());
        assert!(db.find_day(&day.owner, day.date).unwrap().is_none());
    }

    #[test]
    fn one_record_per_owner_and_date() {
        let db = Database::open_in_memory().unwrap();
        db.insert_day(&record("alice", "2025-01-06", "[9:00 AM] a")).unwrap();
        assert!(db.insert_day(&record("alice", "2025-01-06", "[9:00 AM] b")).is_err());
        db.insert_day(&record("bob", "2025-01-06", "[9:00 AM] c")).unwrap();
    }

    #[test]
    fn list_is_scoped_and_sorted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_day(&record("alice", "2025-02-01", "[9:00 AM] b")).unwrap();
        db.insert_day(&record("alice", "2024-12-31", "[9:00 AM] a")).unwrap();
        db.insert_day(&record("bob", "2025-01-01", "[9:00 AM] x")).unwrap();

        let alice = OwnerId::new("alice").unwrap();
        let dates: Vec<String> = db
            .list_days(&alice)
            .unwrap()
            .iter()
            .map(|d| d.date.to_string())
            .collect();
        assert_eq!(dates, ["2024-12-31", "2025-02-01"]);
    }

    #[test]
    fn update_unknown_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let day = record("alice", "2025-01-06", "[9:00 AM] a");
        assert!(matches!(db.update_day(&day), Err(StoreError::NotFound)));
    }

    #[test]
    fn empty_day_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        let mut day = record("alice", "2025-01-06", "");
        day.entry_count = 0;
        assert!(db.insert_day(&day).is_err());
    }
}
