use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Single-row JSON settings blob
CREATE TABLE IF NOT EXISTS app_settings (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);

-- Identity of the local account
CREATE TABLE IF NOT EXISTS local_identity (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    owner        TEXT NOT NULL,
    display_name TEXT,
    created_at   TEXT NOT NULL
);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
