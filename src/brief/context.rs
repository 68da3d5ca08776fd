//! Context assembly: one call that gathers everything a brief prompt needs.
//!
//! The relevance query is fatal on failure. Forecasts and ongoing events are
//! best effort: a failure is logged and the brief goes ahead without them.
//! Attributes with no data are left out of the map, except
//! [`Attribute::WeatherToday`], which always carries a value.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::birthdays::BirthdayMatcher;
use super::forecast::ForecastReconciler;
use super::ongoing::OngoingEventDetector;
use super::relevance::RelevanceSelector;
use crate::config::{check_days_ahead, ResolvedConfig};
use crate::error::BriefError;
use crate::memory::types::date_start_utc;
use crate::memory::FactStore;

/// Value used for today's weather when no forecast is stored for today.
pub const WEATHER_NOT_AVAILABLE: &str = "not available";

/// Named situational values handed to the prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Date,
    Time,
    Timezone,
    Location,
    FamilyNames,
    OngoingEvents,
    WeatherToday,
    WeatherFuture,
    WeatherChanges,
    Birthdays,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Timezone => "timezone",
            Self::Location => "location",
            Self::FamilyNames => "family_names",
            Self::OngoingEvents => "ongoing_events",
            Self::WeatherToday => "weather_today",
            Self::WeatherFuture => "weather_future",
            Self::WeatherChanges => "weather_changes",
            Self::Birthdays => "birthdays",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the prompt builder receives. Built fresh per brief.
#[derive(Debug, Clone, Serialize)]
pub struct BriefContext {
    /// Fact lines first, then event lines.
    pub fact_strings: Vec<String>,
    pub attributes: BTreeMap<Attribute, String>,
    /// Output language tag, e.g. `en`.
    pub language: String,
}

impl BriefContext {
    pub fn get(&self, key: Attribute) -> Option<&str> {
        self.attributes.get(&key).map(String::as_str)
    }
}

pub struct ContextAssembler<'a> {
    store: &'a dyn FactStore,
    config: &'a ResolvedConfig,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(store: &'a dyn FactStore, config: &'a ResolvedConfig) -> Self {
        Self { store, config }
    }

    pub fn build_context(
        &self,
        now: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<BriefContext, BriefError> {
        check_days_ahead(days_ahead)?;
        let tz = self.config.timezone;
        let now_local = now.with_timezone(&tz);
        let end = now_local + Duration::days(i64::from(days_ahead));
        let today = now_local.date_naive();

        let fact_strings = RelevanceSelector::new(self.store, tz)
            .select(now_local, days_ahead)?
            .into_lines();

        let birthdays = BirthdayMatcher::new(&self.config.family).matches(today);

        let ongoing = OngoingEventDetector::new(self.store, tz)
            .detect(now_local)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ongoing events unavailable");
                Vec::new()
            });

        // Forecasts are keyed by local calendar date stored at 00:00 UTC.
        let reconciler = ForecastReconciler::new(self.store, &self.config.location.name);
        let (start_utc, end_utc) = (date_start_utc(today), date_start_utc(end.date_naive()));
        let forecasts = reconciler
            .latest_forecasts(start_utc, end_utc)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "forecasts unavailable");
                BTreeMap::new()
            });
        let changes = reconciler
            .forecast_changes(start_utc, end_utc)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "forecast changes unavailable");
                BTreeMap::new()
            });

        let mut attributes = BTreeMap::new();
        attributes.insert(Attribute::Date, now_local.format("%A %Y-%m-%d").to_string());
        attributes.insert(Attribute::Time, now_local.format("%H:%M").to_string());
        attributes.insert(Attribute::Timezone, tz.name().to_string());
        attributes.insert(Attribute::Location, self.config.location.name.clone());

        let names: Vec<&str> = self.config.family.iter().map(|m| m.name.as_str()).collect();
        insert_joined(&mut attributes, Attribute::FamilyNames, &names, ", ");
        insert_joined(&mut attributes, Attribute::OngoingEvents, &ongoing, "\n");

        let weather_today = forecasts
            .get(&today)
            .cloned()
            .unwrap_or_else(|| WEATHER_NOT_AVAILABLE.to_string());
        attributes.insert(Attribute::WeatherToday, weather_today);

        let future: Vec<String> = (1..=i64::from(days_ahead))
            .filter_map(|offset| {
                let date = today + Duration::days(offset);
                forecasts
                    .get(&date)
                    .map(|text| format!("{}: {}", date.format("%A %Y-%m-%d"), text))
            })
            .collect();
        insert_joined(&mut attributes, Attribute::WeatherFuture, &future, "\n");

        let notices: Vec<&String> = changes.values().collect();
        insert_joined(&mut attributes, Attribute::WeatherChanges, &notices, "\n");
        insert_joined(&mut attributes, Attribute::Birthdays, &birthdays, ", ");

        tracing::info!(
            lines = fact_strings.len(),
            attributes = attributes.len(),
            "brief context assembled"
        );

        Ok(BriefContext {
            fact_strings,
            attributes,
            language: self.config.language.clone(),
        })
    }
}

/// Insert `values` joined by `sep`, or nothing when `values` is empty.
fn insert_joined<S: AsRef<str>>(
    attributes: &mut BTreeMap<Attribute, String>,
    key: Attribute,
    values: &[S],
    sep: &str,
) {
    if values.is_empty() {
        return;
    }
    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(sep);
    attributes.insert(key, joined);
}
