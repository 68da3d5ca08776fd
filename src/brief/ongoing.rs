//! Events in progress at the moment the brief is built.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::StoreError;
use crate::memory::types::CalendarEvent;
use crate::memory::FactStore;

pub struct OngoingEventDetector<'a> {
    store: &'a dyn FactStore,
    timezone: Tz,
}

impl<'a> OngoingEventDetector<'a> {
    pub fn new(store: &'a dyn FactStore, timezone: Tz) -> Self {
        Self { store, timezone }
    }

    /// Events with `start <= now <= end` (or no end), formatted, in start order.
    pub fn detect(&self, now: DateTime<Tz>) -> Result<Vec<String>, StoreError> {
        let events = self.store.query_events_ongoing(now.with_timezone(&Utc))?;
        Ok(events
            .iter()
            .map(|e| format_ongoing(e, &self.timezone))
            .collect())
    }
}

/// `"<summary> (until HH:MM)"`, or just the summary for point events.
pub fn format_ongoing(event: &CalendarEvent, timezone: &Tz) -> String {
    match event.end_time {
        Some(end) => format!(
            "{} (until {})",
            event.summary,
            timezone.from_utc_datetime(&end.naive_utc()).format("%H:%M")
        ),
        None => event.summary.clone(),
    }
}
