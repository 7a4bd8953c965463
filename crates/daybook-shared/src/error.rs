use thiserror::Error;

/// Input rejected before any store call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entry is empty: provide text or at least one image")]
    EmptyEntry,

    #[error("Malformed date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("Malformed time '{0}': expected HH:MM (24-hour)")]
    MalformedTime(String),

    #[error("Owner identifier must not be empty")]
    EmptyOwner,

    #[error("Draft text must not be empty")]
    EmptyDraft,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Entry index {index} out of range (day has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
