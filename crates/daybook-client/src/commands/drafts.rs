use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use daybook_shared::{OwnerId, ValidationError};
use daybook_store::{Database, Draft};

use crate::error::Result;

/// Drafts of `owner`, newest first.
pub fn get_drafts(db: &Database, owner: &OwnerId) -> Result<Vec<Draft>> {
    Ok(db.list_drafts(owner)?)
}

pub fn add_draft(db: &Database, owner: &OwnerId, text: &str) -> Result<Draft> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyDraft.into());
    }

    let draft = Draft {
        id: Uuid::new_v4(),
        owner: owner.clone(),
        text: text.to_string(),
        is_posted: false,
        created_at: Utc::now(),
    };
    db.insert_draft(&draft)?;

    info!(owner = %owner, id = %draft.id, "Draft added");
    Ok(draft)
}

/// Flip the posted flag. Returns the new value, `None` when the draft is
/// unknown or belongs to someone else.
pub fn toggle_draft(db: &Database, owner: &OwnerId, id: Uuid) -> Result<Option<bool>> {
    let flag = db.toggle_draft_posted(owner, id)?;
    match flag {
        Some(posted) => debug!(owner = %owner, id = %id, posted, "Draft toggled"),
        None => debug!(owner = %owner, id = %id, "Toggle on unknown draft ignored"),
    }
    Ok(flag)
}

pub fn delete_draft(db: &Database, owner: &OwnerId, id: Uuid) -> Result<bool> {
    let deleted = db.delete_draft(owner, id)?;
    if deleted {
        info!(owner = %owner, id = %id, "Draft deleted");
    }
    Ok(deleted)
}
