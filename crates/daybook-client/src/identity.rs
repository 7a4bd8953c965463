//! Who the journal is written for.
//!
//! Every read and write is scoped by an [`OwnerId`]. A desktop install
//! mints one locally on first start and keeps it in the database; an
//! embedder with its own sign-in can hand in any [`IdentityProvider`].

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use daybook_shared::OwnerId;
use daybook_store::{Database, LocalIdentity};

use crate::error::{ClientError, Result};

/// Source of the current owner.
pub trait IdentityProvider {
    /// The signed-in owner, or `None` while signed out.
    fn current_owner(&self) -> Option<OwnerId>;

    fn display_name(&self) -> Option<String> {
        None
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        Some(self.owner.clone())
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}

impl IdentityProvider for OwnerId {
    fn current_owner(&self) -> Option<OwnerId> {
        Some(self.clone())
    }
}

/// Mint a fresh local identity and persist it, replacing any previous one.
pub fn create_identity(db: &Database, display_name: Option<String>) -> Result<LocalIdentity> {
    let display_name = display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let owner = OwnerId::new(format!("local_{}", Uuid::new_v4().simple()))?;
    let identity = LocalIdentity {
        owner,
        display_name,
        created_at: Utc::now(),
    };
    db.save_identity(&identity)?;

    info!(owner = %identity.owner, name = ?identity.display_name, "Created local identity");
    Ok(identity)
}

pub fn load_identity(db: &Database) -> Result<LocalIdentity> {
    db.load_identity()?.ok_or(ClientError::NoIdentity)
}

/// Load the stored identity, creating one on first start.
pub fn load_or_create_identity(
    db: &Database,
    display_name: Option<String>,
) -> Result<LocalIdentity> {
    match db.load_identity()? {
        Some(identity) => {
            info!(owner = %identity.owner, "Loaded local identity");
            Ok(identity)
        }
        None => create_identity(db, display_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_once_then_loaded() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(load_identity(&db), Err(ClientError::NoIdentity)));

        let first = load_or_create_identity(&db, Some("  Sam ".into())).unwrap();
        assert!(first.owner.as_str().starts_with("local_"));
        assert_eq!(first.display_name.as_deref(), Some("Sam"));

        let again = load_or_create_identity(&db, Some("Other".into())).unwrap();
        assert_eq!(again.owner, first.owner);
        assert_eq!(again.display_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn blank_name_dropped() {
        let db = Database::open_in_memory().unwrap();
        let identity = create_identity(&db, Some("   ".into())).unwrap();
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.current_owner(), Some(identity.owner.clone()));
    }

    #[test]
    fn owner_id_is_a_provider() {
        let owner = OwnerId::new("user_2alice").unwrap();
        assert_eq!(owner.current_owner(), Some(owner.clone()));
        assert_eq!(owner.display_name(), None);
    }
}
