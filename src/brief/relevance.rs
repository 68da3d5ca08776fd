//! Relevance selection: which facts and events belong in a brief.
//!
//! Facts are matched by calendar date (dated facts are stored at 00:00 UTC of
//! their date), events by real instants. Evergreen facts are always included.
//! Facts come first, then events; there is no cross-type chronological merge.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::check_days_ahead;
use crate::error::BriefError;
use crate::memory::types::{date_start_utc, CalendarEvent, Fact};
use crate::memory::FactStore;

/// Selects facts and events whose relevance intersects `[now, now + days_ahead]`.
pub struct RelevanceSelector<'a> {
    store: &'a dyn FactStore,
    timezone: Tz,
}

/// Output of [`RelevanceSelector::select`], kept apart so callers can count each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub facts: Vec<String>,
    pub events: Vec<String>,
}

impl Selection {
    /// Facts then events, as one list of lines.
    pub fn into_lines(self) -> Vec<String> {
        let mut lines = self.facts;
        lines.extend(self.events);
        lines
    }
}

impl<'a> RelevanceSelector<'a> {
    pub fn new(store: &'a dyn FactStore, timezone: Tz) -> Self {
        Self { store, timezone }
    }

    /// Fails with [`BriefError::Config`] when `days_ahead` is out of range,
    /// and with [`BriefError::Store`] when a query fails.
    pub fn select(&self, now: DateTime<Tz>, days_ahead: u32) -> Result<Selection, BriefError> {
        check_days_ahead(days_ahead)?;
        let end = now + Duration::days(i64::from(days_ahead));

        let first_day = date_start_utc(now.date_naive());
        let last_day_end =
            date_start_utc(end.date_naive()) + Duration::days(1) - Duration::microseconds(1);
        let facts = self.store.query_facts_in_window(first_day, last_day_end)?;

        let events = self
            .store
            .query_events_overlapping(now.with_timezone(&Utc), end.with_timezone(&Utc))?;

        tracing::info!(
            facts = facts.len(),
            events = events.len(),
            days_ahead,
            "relevance selected"
        );

        Ok(Selection {
            facts: facts.iter().map(|f| format_fact(f, &self.timezone)).collect(),
            events: events.iter().map(|e| format_event(e, &self.timezone)).collect(),
        })
    }
}

/// `"<content>[ (<date>)] [Source: <source>]"`. Date-only relevance renders as
/// the bare date; a relevance with a time of day renders in local time.
pub fn format_fact(fact: &Fact, timezone: &Tz) -> String {
    let suffix = match fact.relevance_date {
        None => String::new(),
        Some(ts) if ts.time() == NaiveTime::MIN => format!(" ({})", ts.format("%Y-%m-%d")),
        Some(ts) => {
            let local = timezone.from_utc_datetime(&ts.naive_utc());
            format!(" ({})", local.format("%Y-%m-%d %H:%M"))
        }
    };
    format!("{}{} [Source: {}]", fact.content, suffix, fact.source)
}

/// `"<summary>: <start>[ - <end>][, location: ..][, description: ..] [Source: <source>]"`.
/// The end drops its date when it falls on the start's local date.
pub fn format_event(event: &CalendarEvent, timezone: &Tz) -> String {
    let start = timezone.from_utc_datetime(&event.start_time.naive_utc());
    let mut line = format!("{}: {}", event.summary, start.format("%Y-%m-%d %H:%M"));

    if let Some(end_utc) = event.end_time {
        let end = timezone.from_utc_datetime(&end_utc.naive_utc());
        if end.date_naive() == start.date_naive() {
            line.push_str(&format!(" - {}", end.format("%H:%M")));
        } else {
            line.push_str(&format!(" - {}", end.format("%Y-%m-%d %H:%M")));
        }
    }
    if let Some(location) = non_empty(event.location.as_deref()) {
        line.push_str(&format!(", location: {location}"));
    }
    if let Some(description) = non_empty(event.description.as_deref()) {
        line.push_str(&format!(", description: {description}"));
    }
    line.push_str(&format!(" [Source: {}]", event.source));
    line
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
