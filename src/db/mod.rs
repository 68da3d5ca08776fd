pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// Storage format for every timestamp column. Fixed width and always UTC, so
/// text comparison in SQL orders the same way as the instants do.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Render an instant in the storage format.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts the storage format and any RFC 3339 string.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Open (or create) the daybrief database at the given path with schema
/// initialized and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Importers and brief runs are separate processes; wait out a brief writer lock.
    conn.pragma_update(None, "busy_timeout", 5000)?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub fact_count: i64,
    pub event_count: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run `PRAGMA integrity_check` and collect row counts.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let fact_count: i64 = conn.query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))?;
    let event_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM calendar_events", [], |row| row.get(0))?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    Ok(HealthReport {
        schema_version,
        fact_count,
        event_count,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_format_is_sortable_text() {
        let earlier = Utc.with_ymd_and_hms(2025, 4, 21, 9, 5, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 4, 21, 10, 0, 0).unwrap();
        let a = format_timestamp(&earlier);
        let b = format_timestamp(&later);
        assert_eq!(a, "2025-04-21T09:05:00.000000Z");
        assert!(a < b);
    }

    #[test]
    fn parse_accepts_storage_and_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2025, 4, 21, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-04-21T10:00:00.000000Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-21T13:00:00+03:00"), Some(expected));
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    #[test]
    fn health_check_on_fresh_database() {
        let conn = open_memory_database().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.schema_version, migrations::CURRENT_SCHEMA_VERSION);
        assert_eq!(report.fact_count, 0);
        assert_eq!(report.event_count, 0);
    }
}
