//! Journal operations grouped by domain.
//!
//! The functions here take the store (or blob storage) they work on as an
//! argument and know nothing about locking or events; [`crate::journal`]
//! wires them to the shared state.

pub mod attachments;
pub mod calendar;
pub mod days;
pub mod drafts;
pub mod export;
pub mod settings;
