//! # daybook-store
//!
//! Local record store for Daybook, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for day records,
//! drafts and persisted settings. Day records are also reachable through
//! the [`DayStore`] trait so the aggregate logic can run against any
//! backend that offers keyed single-record writes.

pub mod database;
pub mod days;
pub mod drafts;
pub mod migrations;
pub mod models;
pub mod settings;

mod error;

pub use database::Database;
pub use days::DayStore;
pub use error::{Result, StoreError};
pub use models::*;
