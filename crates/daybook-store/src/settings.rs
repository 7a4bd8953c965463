//! Single-row persisted state: the JSON settings blob and the local
//! identity.

use chrono::{DateTime, Utc};
use daybook_shared::OwnerId;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;
use crate::models::LocalIdentity;

impl Database {
    /// Load the settings blob, or `None` if nothing was saved yet.
    pub fn load_settings<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_settings<T: Serialize>(&self, settings: &T) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO app_settings (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    pub fn load_identity(&self) -> Result<Option<LocalIdentity>> {
        let row = self
            .conn()
            .query_row(
                "SELECT owner, display_name, created_at FROM local_identity WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((owner, display_name, created_str)) = row else {
            return Ok(None);
        };

        let owner = OwnerId::new(owner).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let created_at: DateTime<Utc> =
            DateTime::parse_from_rfc3339(&created_str)?.with_timezone(&Utc);

        Ok(Some(LocalIdentity {
            owner,
            display_name,
            created_at,
        }))
    }

    pub fn save_identity(&self, identity: &LocalIdentity) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO local_identity (id, owner, display_name, created_at)
             VALUES (1, ?1, ?2, ?3)",
            params![
                identity.owner.as_str(),
                identity.display_name,
                identity.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
