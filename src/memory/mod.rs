//! Fact store: record types, the read contract the brief pipeline depends on,
//! and its SQLite implementation.

pub mod sqlite;
pub mod stats;
pub mod types;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use types::{CalendarEvent, Fact, Source};

/// Read queries the brief pipeline runs against the store.
///
/// Window bounds are inclusive on both ends. Implementations must order facts
/// that share a `created_at` by insertion, so forecast reconciliation is stable.
pub trait FactStore {
    /// Facts whose `relevance_date` is in `[start, end]`, plus every evergreen
    /// fact. Dated facts come first ascending by `relevance_date` then id;
    /// evergreen facts follow in id order.
    fn query_facts_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError>;

    /// Dated facts from exactly `source` with `relevance_date` in `[start, end]`,
    /// ordered by `created_at` then id.
    fn query_source_facts_in_window(
        &self,
        source: &Source,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError>;

    /// Events whose `[start_time, end_time or start_time]` intersects
    /// `[start, end]`, ordered by `start_time` then id.
    fn query_events_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StoreError>;

    /// Events with `start_time <= instant` and no end or `end_time >= instant`,
    /// ordered by `start_time` then id.
    fn query_events_ongoing(&self, instant: DateTime<Utc>)
        -> Result<Vec<CalendarEvent>, StoreError>;
}
