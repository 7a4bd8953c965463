//! v001 -- Initial schema creation.
//!
//! Creates the two record tables: `days` (one journal blob per owner and
//! calendar date) and `drafts`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Days (one serialized entry log per owner and date)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS days (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    owner        TEXT NOT NULL,               -- opaque identity subject
    date         TEXT NOT NULL,               -- YYYY-MM-DD, local time
    content      TEXT NOT NULL,               -- entry-log blob
    entry_count  INTEGER NOT NULL CHECK (entry_count > 0),
    last_updated TEXT NOT NULL,               -- RFC-3339
    attachments  TEXT NOT NULL DEFAULT '[]'   -- JSON array of storage refs
);

CREATE INDEX IF NOT EXISTS idx_days_owner ON days(owner);
CREATE UNIQUE INDEX IF NOT EXISTS idx_days_owner_date ON days(owner, date);

-- ----------------------------------------------------------------
-- Drafts (sidebar ideas, unrelated to days)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS drafts (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    owner      TEXT NOT NULL,
    text       TEXT NOT NULL,
    is_posted  INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL                  -- RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_drafts_owner ON drafts(owner, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_drafts_owner_posted ON drafts(owner, is_posted);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
