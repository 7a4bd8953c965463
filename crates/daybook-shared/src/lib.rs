//! # daybook-shared
//!
//! Types and pure functions shared by every Daybook crate: the entry-log
//! codec that packs a day's journal entries into one text blob, wall-clock
//! conversions for entry timestamps, and the validated identifiers
//! (`OwnerId`, `DayDate`) that key every stored record.

pub mod clock;
pub mod constants;
pub mod entry;
pub mod error;
pub mod types;

pub use entry::Entry;
pub use error::{CodecError, ValidationError};
pub use types::{DayDate, OwnerId};
