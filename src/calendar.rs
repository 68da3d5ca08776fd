//! Calendar import from a JSON event list.
//!
//! Input is an array of objects with `summary`, `start`, and optional `end`,
//! `location`, `description`, `uid`. Times may be RFC 3339, a local
//! `YYYY-MM-DDTHH:MM[:SS]`, or a bare `YYYY-MM-DD` (local midnight). An event
//! whose times cannot be read is skipped with a warning; the rest import.
//! An event without a `uid` gets one derived from its summary and start, so
//! re-importing the same file matches the rows it wrote before.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::memory::sqlite::{SqliteStore, UpsertOutcome};
use crate::memory::types::{NewEvent, Source};

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub summary: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

/// How stored events from the same calendar are reconciled with the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Match by `(source, uid, start)` and update in place; keep the rest.
    Upsert,
    /// Delete every event of the calendar, then insert the import.
    Refresh,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Parse a JSON event array into events tagged `calendar:<name>`.
/// Returns the events plus the number of skipped entries.
pub fn parse_events(json: &str, calendar: &str, timezone: Tz) -> Result<(Vec<NewEvent>, usize)> {
    let raw: Vec<RawEvent> = serde_json::from_str(json).context("failed to parse calendar JSON")?;
    let source = Source::calendar(calendar);

    let mut events = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for item in raw {
        match to_event(item, &source, timezone) {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }
    Ok((events, skipped))
}

fn to_event(raw: RawEvent, source: &Source, timezone: Tz) -> Option<NewEvent> {
    let Some(start_time) = parse_event_time(&raw.start, timezone) else {
        tracing::warn!(
            summary = %raw.summary,
            start = %raw.start,
            "skipping event with unreadable start"
        );
        return None;
    };
    let end_time = match raw.end.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        None => None,
        Some(end) => match parse_event_time(end, timezone) {
            Some(t) => Some(t),
            None => {
                tracing::warn!(summary = %raw.summary, end, "skipping event with unreadable end");
                return None;
            }
        },
    };
    if end_time.is_some_and(|end| end < start_time) {
        tracing::warn!(summary = %raw.summary, "skipping event that ends before it starts");
        return None;
    }

    let external_uid = raw
        .uid
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| derived_uid(&raw.summary, start_time));

    Some(NewEvent {
        external_uid,
        summary: raw.summary,
        start_time,
        end_time,
        location: raw.location.filter(|l| !l.trim().is_empty()),
        description: raw.description.filter(|d| !d.trim().is_empty()),
        source: source.clone(),
    })
}

fn derived_uid(summary: &str, start_time: DateTime<Utc>) -> String {
    let name = format!("{summary}\n{}", start_time.to_rfc3339());
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Read an event time. Naive forms are interpreted in `timezone`; a local time
/// that falls in a DST gap is rejected, an ambiguous one takes the earlier instant.
pub fn parse_event_time(raw: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Write parsed events to the store in the given mode.
pub fn import_events(
    store: &mut SqliteStore,
    calendar: &str,
    events: &[NewEvent],
    mode: ImportMode,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    match mode {
        ImportMode::Refresh => {
            summary.inserted =
                store.replace_events_for_source(&Source::calendar(calendar), events)?;
        }
        ImportMode::Upsert => {
            for event in events {
                match store.upsert_event(event)? {
                    UpsertOutcome::Inserted => summary.inserted += 1,
                    UpsertOutcome::Updated => summary.updated += 1,
                }
            }
        }
    }
    tracing::info!(
        calendar,
        inserted = summary.inserted,
        updated = summary.updated,
        ?mode,
        "calendar imported"
    );
    Ok(summary)
}
