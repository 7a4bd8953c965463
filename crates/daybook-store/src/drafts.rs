//! CRUD operations for [`Draft`] records.
//!
//! Every query is scoped by owner: a draft id belonging to another account
//! behaves exactly like an unknown id.

use chrono::{DateTime, Utc};
use daybook_shared::OwnerId;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::models::Draft;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    pub fn insert_draft(&self, draft: &Draft) -> Result<()> {
        self.conn().execute(
            "INSERT INTO drafts (id, owner, text, is_posted, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.id.to_string(),
                draft.owner.as_str(),
                draft.text,
                draft.is_posted as i32,
                draft.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Drafts of one owner, newest first.
    pub fn list_drafts(&self, owner: &OwnerId) -> Result<Vec<Draft>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, owner, text, is_posted, created_at
             FROM drafts
             WHERE owner = ?1
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![owner.as_str()], row_to_draft)?;

        let mut drafts = Vec::new();
        for row in rows {
            drafts.push(row?);
        }
        Ok(drafts)
    }

    pub fn find_draft(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Draft>> {
        let draft = self
            .conn()
            .query_row(
                "SELECT id, owner, text, is_posted, created_at
                 FROM drafts
                 WHERE id = ?1 AND owner = ?2",
                params![id.to_string(), owner.as_str()],
                row_to_draft,
            )
            .optional()?;
        Ok(draft)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Flip the posted flag.  Returns the new value, or `None` if no such
    /// draft exists for this owner.
    pub fn toggle_draft_posted(&self, owner: &OwnerId, id: Uuid) -> Result<Option<bool>> {
        let flag = self
            .conn()
            .query_row(
                "UPDATE drafts SET is_posted = 1 - is_posted
                 WHERE id = ?1 AND owner = ?2
                 RETURNING is_posted",
                params![id.to_string(), owner.as_str()],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(flag.map(|v| v != 0))
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a draft.  Returns `true` if a row was deleted.
    pub fn delete_draft(&self, owner: &OwnerId, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM drafts WHERE id = ?1 AND owner = ?2",
            params![id.to_string(), owner.as_str()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draft> {
    let id_str: String = row.get(0)?;
    let owner_str: String = row.get(1)?;
    let text: String = row.get(2)?;
    let is_posted_int: i32 = row.get(3)?;
    let created_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let owner = OwnerId::new(owner_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Draft {
        id,
        owner,
        text,
        is_posted: is_posted_int != 0,
        created_at,
    })
}
