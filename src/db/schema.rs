//! SQL DDL for all daybrief tables.
//!
//! Defines `facts` (generic dated-or-evergreen memories), `calendar_events`
//! (interval-bearing events) and `schema_meta`. All DDL uses `IF NOT EXISTS`
//! for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Generic facts; relevance_date NULL means evergreen
CREATE TABLE IF NOT EXISTS facts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    relevance_date TEXT,
    source TEXT NOT NULL,
    external_uid TEXT
);

CREATE INDEX IF NOT EXISTS idx_facts_relevance ON facts(relevance_date);
CREATE INDEX IF NOT EXISTS idx_facts_source ON facts(source);
CREATE INDEX IF NOT EXISTS idx_facts_source_uid ON facts(source, external_uid);

-- Calendar events; end_time NULL means a point-in-time event
CREATE TABLE IF NOT EXISTS calendar_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_uid TEXT NOT NULL,
    summary TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    location TEXT,
    description TEXT,
    created_at TEXT NOT NULL,
    source TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_start ON calendar_events(start_time);
CREATE INDEX IF NOT EXISTS idx_events_source ON calendar_events(source);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
