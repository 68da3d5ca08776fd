//! SQLite-backed [`FactStore`] plus the write path used by importers.
//!
//! Source tags and timestamps are converted to and from their stored text form
//! here and nowhere else. Rows whose stored timestamps no longer parse are
//! skipped with a warning instead of failing the whole query.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use super::types::{CalendarEvent, Fact, NewEvent, NewFact, Source};
use super::FactStore;
use crate::db::{self, format_timestamp, parse_timestamp};
use crate::error::StoreError;

const FACT_COLUMNS: &str = "id, content, created_at, relevance_date, source, external_uid";
const EVENT_COLUMNS: &str =
    "id, external_uid, summary, start_time, end_time, location, description, created_at, source";

/// Whether [`SqliteStore::upsert_event`] created or refreshed a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// The fact store over a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store file with schema and migrations applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: db::open_database(path)?,
        })
    }

    /// A fresh in-memory store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_memory_database()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a fact stamped with the current time. Returns the new row id.
    pub fn insert_fact(&self, fact: &NewFact) -> Result<i64> {
        self.insert_fact_at(fact, Utc::now())
    }

    /// Insert a fact with an explicit `created_at`.
    pub fn insert_fact_at(&self, fact: &NewFact, created_at: DateTime<Utc>) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO facts (content, created_at, relevance_date, source, external_uid) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    fact.content,
                    format_timestamp(&created_at),
                    fact.relevance_date.as_ref().map(format_timestamp),
                    fact.source.to_string(),
                    fact.external_uid,
                ],
            )
            .context("failed to insert fact")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an event, or refresh the mutable fields of the row with the same
    /// `(source, external_uid, start_time)`.
    pub fn upsert_event(&self, event: &NewEvent) -> Result<UpsertOutcome> {
        upsert_event_on(&self.conn, event)
    }

    /// Whether an event with this identity is stored.
    pub fn event_exists(
        &self,
        source: &Source,
        external_uid: &str,
        start_time: DateTime<Utc>,
    ) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM calendar_events \
             WHERE source = ?1 AND external_uid = ?2 AND start_time = ?3",
            params![source.to_string(), external_uid, format_timestamp(&start_time)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Delete every event from `source`. Returns the number of rows removed.
    pub fn delete_events_by_source(&self, source: &Source) -> Result<usize> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM calendar_events WHERE source = ?1",
                params![source.to_string()],
            )
            .context("failed to delete events")?;
        Ok(removed)
    }

    /// Full refresh: delete all events from `source` and insert `events`, in one
    /// transaction. Returns the number of events inserted.
    pub fn replace_events_for_source(
        &mut self,
        source: &Source,
        events: &[NewEvent],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM calendar_events WHERE source = ?1",
            params![source.to_string()],
        )?;
        for event in events {
            upsert_event_on(&tx, event)?;
        }
        tx.commit()?;

        tracing::info!(source = %source, removed, inserted = events.len(), "calendar refreshed");
        Ok(events.len())
    }
}

fn upsert_event_on(conn: &Connection, event: &NewEvent) -> Result<UpsertOutcome> {
    let source = event.source.to_string();
    let start = format_timestamp(&event.start_time);
    let end = event.end_time.as_ref().map(format_timestamp);

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM calendar_events \
             WHERE source = ?1 AND external_uid = ?2 AND start_time = ?3",
            params![source, event.external_uid, start],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE calendar_events \
             SET summary = ?1, end_time = ?2, location = ?3, description = ?4 \
             WHERE id = ?5",
            params![event.summary, end, event.location, event.description, id],
        )
        .context("failed to update event")?;
        return Ok(UpsertOutcome::Updated);
    }

    conn.execute(
        "INSERT INTO calendar_events \
         (external_uid, summary, start_time, end_time, location, description, created_at, source) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.external_uid,
            event.summary,
            start,
            end,
            event.location,
            event.description,
            format_timestamp(&Utc::now()),
            source,
        ],
    )
    .context("failed to insert event")?;
    Ok(UpsertOutcome::Inserted)
}

impl FactStore for SqliteStore {
    fn query_facts_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError> {
        const QUERY: &str = "query_facts_in_window";
        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM facts \
             WHERE relevance_date IS NULL \
                OR (relevance_date >= ?1 AND relevance_date <= ?2) \
             ORDER BY relevance_date IS NULL, relevance_date, id"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::query(QUERY))?;
        let rows = stmt
            .query_map(
                params![format_timestamp(&start), format_timestamp(&end)],
                FactRow::from_row,
            )
            .map_err(StoreError::query(QUERY))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query(QUERY))?;
        Ok(rows.into_iter().filter_map(FactRow::into_fact).collect())
    }

    fn query_source_facts_in_window(
        &self,
        source: &Source,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError> {
        const QUERY: &str = "query_source_facts_in_window";
        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM facts \
             WHERE source = ?1 AND relevance_date >= ?2 AND relevance_date <= ?3 \
             ORDER BY created_at, id"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::query(QUERY))?;
        let rows = stmt
            .query_map(
                params![
                    source.to_string(),
                    format_timestamp(&start),
                    format_timestamp(&end)
                ],
                FactRow::from_row,
            )
            .map_err(StoreError::query(QUERY))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query(QUERY))?;
        Ok(rows.into_iter().filter_map(FactRow::into_fact).collect())
    }

    fn query_events_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        const QUERY: &str = "query_events_overlapping";
        // Starts in range, ends in range, or spans the whole range.
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events \
             WHERE (start_time >= ?1 AND start_time <= ?2) \
                OR (COALESCE(end_time, start_time) >= ?1 AND COALESCE(end_time, start_time) <= ?2) \
                OR (start_time <= ?1 AND COALESCE(end_time, start_time) >= ?2) \
             ORDER BY start_time, id"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::query(QUERY))?;
        let rows = stmt
            .query_map(
                params![format_timestamp(&start), format_timestamp(&end)],
                EventRow::from_row,
            )
            .map_err(StoreError::query(QUERY))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query(QUERY))?;
        Ok(rows.into_iter().filter_map(EventRow::into_event).collect())
    }

    fn query_events_ongoing(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        const QUERY: &str = "query_events_ongoing";
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events \
             WHERE start_time <= ?1 AND (end_time IS NULL OR end_time >= ?1) \
             ORDER BY start_time, id"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::query(QUERY))?;
        let rows = stmt
            .query_map(params![format_timestamp(&instant)], EventRow::from_row)
            .map_err(StoreError::query(QUERY))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query(QUERY))?;
        Ok(rows.into_iter().filter_map(EventRow::into_event).collect())
    }
}

// ── Raw rows ─────────────────────────────────────────────────────────────────

struct FactRow {
    id: i64,
    content: String,
    created_at: String,
    relevance_date: Option<String>,
    source: String,
    external_uid: Option<String>,
}

impl FactRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            created_at: row.get(2)?,
            relevance_date: row.get(3)?,
            source: row.get(4)?,
            external_uid: row.get(5)?,
        })
    }

    fn into_fact(self) -> Option<Fact> {
        let Some(created_at) = parse_timestamp(&self.created_at) else {
            tracing::warn!(
                id = self.id,
                value = %self.created_at,
                "skipping fact with bad created_at"
            );
            return None;
        };
        let relevance_date = match self.relevance_date.as_deref() {
            None => None,
            Some(raw) => match parse_timestamp(raw) {
                Some(ts) => Some(ts),
                None => {
                    tracing::warn!(
                        id = self.id,
                        value = %raw,
                        "skipping fact with bad relevance_date"
                    );
                    return None;
                }
            },
        };
        Some(Fact {
            id: self.id,
            content: self.content,
            created_at,
            relevance_date,
            source: Source::from_tag(&self.source),
            external_uid: self.external_uid,
        })
    }
}

struct EventRow {
    id: i64,
    external_uid: String,
    summary: String,
    start_time: String,
    end_time: Option<String>,
    location: Option<String>,
    description: Option<String>,
    created_at: String,
    source: String,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            external_uid: row.get(1)?,
            summary: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            location: row.get(5)?,
            description: row.get(6)?,
            created_at: row.get(7)?,
            source: row.get(8)?,
        })
    }

    fn into_event(self) -> Option<CalendarEvent> {
        let (Some(start_time), Some(created_at)) =
            (parse_timestamp(&self.start_time), parse_timestamp(&self.created_at))
        else {
            tracing::warn!(
                id = self.id,
                uid = %self.external_uid,
                "skipping event with bad timestamp"
            );
            return None;
        };
        let end_time = match self.end_time.as_deref() {
            None => None,
            Some(raw) => match parse_timestamp(raw) {
                Some(ts) => Some(ts),
                None => {
                    tracing::warn!(id = self.id, value = %raw, "skipping event with bad end_time");
                    return None;
                }
            },
        };
        Some(CalendarEvent {
            id: self.id,
            external_uid: self.external_uid,
            summary: self.summary,
            start_time,
            end_time,
            location: self.location,
            description: self.description,
            created_at,
            source: Source::from_tag(&self.source),
        })
    }
}
