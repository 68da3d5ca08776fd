//! Forecast reconciliation.
//!
//! The weather importer appends a new fact per forecast day on every run and
//! never rewrites old ones, so a date can carry several forecasts. Reconciling
//! happens at read time: the newest forecast per date wins, and a date whose two
//! newest forecasts differ is reported as revised.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::memory::types::{date_start_utc, Fact, Source};
use crate::memory::FactStore;

/// Resolves stored forecasts for one location.
pub struct ForecastReconciler<'a> {
    store: &'a dyn FactStore,
    source: Source,
}

impl<'a> ForecastReconciler<'a> {
    pub fn new(store: &'a dyn FactStore, location: &str) -> Self {
        Self {
            store,
            source: Source::weather(location),
        }
    }

    /// Best-known forecast text per date in `[start, end]`.
    pub fn latest_forecasts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<NaiveDate, String>, StoreError> {
        let facts = self.fetch(start, end)?;
        Ok(latest_per_date(&facts))
    }

    /// A change notice per date whose newest forecast differs from the one before it.
    pub fn forecast_changes(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<NaiveDate, String>, StoreError> {
        let facts = self.fetch(start, end)?;
        Ok(revised_dates(&facts))
    }

    fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Fact>, StoreError> {
        let (from, to) = expand_to_utc_days(start, end);
        let facts = self.store.query_source_facts_in_window(&self.source, from, to)?;
        tracing::debug!(source = %self.source, count = facts.len(), "forecast facts loaded");
        Ok(facts)
    }
}

/// Widen `[start, end]` to whole UTC days: start floors to 00:00 of its UTC
/// date, end extends to the last instant before the following 00:00.
pub fn expand_to_utc_days(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = date_start_utc(start.date_naive());
    let next_day = date_start_utc(end.date_naive()) + Duration::days(1);
    (from, next_day - Duration::microseconds(1))
}

/// Newest forecast per date. Ties on `created_at` go to the later row.
pub fn latest_per_date(facts: &[Fact]) -> BTreeMap<NaiveDate, String> {
    group_by_date(facts)
        .into_iter()
        .filter_map(|(date, group)| {
            group
                .into_iter()
                .max_by_key(|f| (f.created_at, f.id))
                .map(|f| (date, f.content.clone()))
        })
        .collect()
}

/// Notice per date whose two newest forecasts differ in content.
///
/// Only the top two by recency are compared; older history is ignored. Any
/// textual difference counts as a revision.
pub fn revised_dates(facts: &[Fact]) -> BTreeMap<NaiveDate, String> {
    let mut notices = BTreeMap::new();
    for (date, mut group) in group_by_date(facts) {
        if group.len() < 2 {
            continue;
        }
        group.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        if group[0].content != group[1].content {
            notices.insert(date, revision_notice(date));
        }
    }
    notices
}

pub fn revision_notice(date: NaiveDate) -> String {
    format!("The forecast for {} was revised since the previous update", date.format("%Y-%m-%d"))
}

fn group_by_date(facts: &[Fact]) -> BTreeMap<NaiveDate, Vec<&Fact>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Fact>> = BTreeMap::new();
    for fact in facts {
        if let Some(relevance) = fact.relevance_date {
            groups.entry(relevance.date_naive()).or_default().push(fact);
        }
    }
    groups
}
