use daybook_shared::ValidationError;
use daybook_store::StoreError;
use thiserror::Error;

/// Errors surfaced to the UI layer.
///
/// Validation problems are reported before anything is written. Store and
/// blob-storage failures are passed through unchanged; callers decide
/// whether to retry.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Blob storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    #[error("Image too large: {size} bytes (max {max})")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Invalid id: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("No identity loaded")]
    NoIdentity,

    #[error("Database not opened")]
    NoDatabase,

    #[error("Lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, ClientError>;
