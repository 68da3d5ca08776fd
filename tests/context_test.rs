mod helpers;

use chrono::{DateTime, Utc};
use daybrief::brief::context::WEATHER_NOT_AVAILABLE;
use daybrief::brief::{Attribute, ContextAssembler};
use daybrief::error::{BriefError, StoreError};
use daybrief::memory::sqlite::SqliteStore;
use daybrief::memory::types::{CalendarEvent, Fact, Source};
use daybrief::memory::FactStore;
use helpers::*;

/// Delegates to a real store, failing the queries it is told to.
struct FlakyStore {
    inner: SqliteStore,
    fail_relevance: bool,
    fail_forecasts: bool,
    fail_ongoing: bool,
}

impl FlakyStore {
    fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_relevance: false,
            fail_forecasts: false,
            fail_ongoing: false,
        }
    }
}

fn down() -> StoreError {
    StoreError::Query {
        query: "flaky",
        source: rusqlite::Error::InvalidQuery,
    }
}

impl FactStore for FlakyStore {
    fn query_facts_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError> {
        if self.fail_relevance {
            return Err(down());
        }
        self.inner.query_facts_in_window(start, end)
    }

    fn query_source_facts_in_window(
        &self,
        source: &Source,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fact>, StoreError> {
        if self.fail_forecasts {
            return Err(down());
        }
        self.inner.query_source_facts_in_window(source, start, end)
    }

    fn query_events_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        self.inner.query_events_overlapping(start, end)
    }

    fn query_events_ongoing(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        if self.fail_ongoing {
            return Err(down());
        }
        self.inner.query_events_ongoing(instant)
    }
}

/// Monday 2025-04-21 07:00 in Helsinki (EEST, UTC+3).
fn monday_morning() -> DateTime<Utc> {
    utc(2025, 4, 21, 4, 0)
}

fn populated_store() -> SqliteStore {
    let store = test_store();
    add_fact(&store, "Buy milk", None, Source::manual());
    add_fact(&store, "Parent-teacher evening", Some(date(2025, 4, 22)), Source::manual());

    let sunny = "sunny, 4 to 12 °C";
    add_forecast(&store, "Helsinki", date(2025, 4, 21), sunny, utc(2025, 4, 20, 18, 0));
    // No forecast for the 22nd.
    add_forecast(&store, "Helsinki", date(2025, 4, 23), "cloudy", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Helsinki", date(2025, 4, 23), "rainy", utc(2025, 4, 20, 18, 0));

    // 06:30-08:00 local.
    add_event(&store, "Breakfast meeting", utc(2025, 4, 21, 3, 30), Some(utc(2025, 4, 21, 5, 0)));
    store
}

#[test]
fn assembles_all_attributes() {
    let store = populated_store();
    let config = resolved_config(
        "Europe/Helsinki",
        vec![member("Aino", Some("1990-04-21")), member("Mikko", Some("2018-11-02"))],
    );

    let ctx = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 3)
        .unwrap();

    assert_eq!(ctx.get(Attribute::Date), Some("Monday 2025-04-21"));
    assert_eq!(ctx.get(Attribute::Time), Some("07:00"));
    assert_eq!(ctx.get(Attribute::Timezone), Some("Europe/Helsinki"));
    assert_eq!(ctx.get(Attribute::Location), Some("Helsinki"));
    assert_eq!(ctx.get(Attribute::FamilyNames), Some("Aino, Mikko"));
    assert_eq!(ctx.get(Attribute::Birthdays), Some("Aino (35 years)"));
    assert_eq!(ctx.get(Attribute::OngoingEvents), Some("Breakfast meeting (until 08:00)"));
    assert_eq!(ctx.get(Attribute::WeatherToday), Some("sunny, 4 to 12 °C"));
    // The 22nd has no forecast and is skipped, not padded.
    assert_eq!(ctx.get(Attribute::WeatherFuture), Some("Wednesday 2025-04-23: rainy"));
    assert_eq!(
        ctx.get(Attribute::WeatherChanges),
        Some("The forecast for 2025-04-23 was revised since the previous update")
    );
    assert_eq!(ctx.language, "en");

    assert!(ctx
        .fact_strings
        .contains(&"Parent-teacher evening (2025-04-22) [Source: manual]".to_string()));
    assert!(ctx.fact_strings.contains(&"Buy milk [Source: manual]".to_string()));
    assert_eq!(
        ctx.fact_strings.last().map(String::as_str),
        Some("Breakfast meeting: 2025-04-21 06:30 - 08:00 [Source: calendar:Family]")
    );
}

#[test]
fn empty_store_keeps_only_always_present_keys() {
    let store = test_store();
    let config = resolved_config("Europe/Helsinki", Vec::new());

    let ctx = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 3)
        .unwrap();

    let keys: Vec<Attribute> = ctx.attributes.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            Attribute::Date,
            Attribute::Time,
            Attribute::Timezone,
            Attribute::Location,
            Attribute::WeatherToday,
        ]
    );
    assert_eq!(ctx.get(Attribute::WeatherToday), Some(WEATHER_NOT_AVAILABLE));
    assert!(ctx.fact_strings.is_empty());
}

#[test]
fn today_is_the_local_date() {
    // 23:30 UTC on the 20th is already the 21st in Helsinki.
    let store = test_store();
    add_forecast(&store, "Helsinki", date(2025, 4, 20), "yesterday", utc(2025, 4, 19, 6, 0));
    add_forecast(&store, "Helsinki", date(2025, 4, 21), "today", utc(2025, 4, 19, 6, 0));
    let config = resolved_config("Europe/Helsinki", Vec::new());

    let ctx = ContextAssembler::new(&store, &config)
        .build_context(utc(2025, 4, 20, 23, 30), 1)
        .unwrap();
    assert_eq!(ctx.get(Attribute::Date), Some("Monday 2025-04-21"));
    assert_eq!(ctx.get(Attribute::WeatherToday), Some("today"));
}

#[test]
fn forecast_and_ongoing_failures_degrade_to_empty() {
    let mut store = FlakyStore::new(populated_store());
    store.fail_forecasts = true;
    store.fail_ongoing = true;
    let config = resolved_config("Europe/Helsinki", Vec::new());

    let ctx = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 3)
        .unwrap();

    assert_eq!(ctx.get(Attribute::WeatherToday), Some(WEATHER_NOT_AVAILABLE));
    assert!(ctx.get(Attribute::WeatherFuture).is_none());
    assert!(ctx.get(Attribute::WeatherChanges).is_none());
    assert!(ctx.get(Attribute::OngoingEvents).is_none());
    assert!(!ctx.fact_strings.is_empty());
}

#[test]
fn relevance_failure_is_fatal() {
    let mut store = FlakyStore::new(populated_store());
    store.fail_relevance = true;
    let config = resolved_config("Europe/Helsinki", Vec::new());

    let err = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 3)
        .unwrap_err();
    assert!(matches!(err, BriefError::Store(StoreError::Query { query: "flaky", .. })));
}

#[test]
fn invalid_birthday_does_not_block_the_brief() {
    let store = test_store();
    let config = resolved_config(
        "Europe/Helsinki",
        vec![member("Broken", Some("21/04/1990")), member("Aino", Some("1990-04-21"))],
    );

    let ctx = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 0)
        .unwrap();
    assert_eq!(ctx.get(Attribute::Birthdays), Some("Aino (35 years)"));
    assert_eq!(ctx.get(Attribute::FamilyNames), Some("Broken, Aino"));
}

#[test]
fn serializes_with_snake_case_keys() {
    let store = test_store();
    let config = resolved_config("UTC", Vec::new());
    let ctx = ContextAssembler::new(&store, &config)
        .build_context(monday_morning(), 1)
        .unwrap();

    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json["attributes"]["weather_today"], WEATHER_NOT_AVAILABLE);
    assert_eq!(json["attributes"]["timezone"], "UTC");
    assert_eq!(json["language"], "en");
}

#[test]
fn oversized_look_ahead_is_rejected() {
    let store = populated_store();
    let config = resolved_config("Europe/Helsinki", Vec::new());

    let err = ContextAssembler::new(&store, &config)
        .build_context(utc(2025, 4, 21, 8, 0), 200_000_000)
        .unwrap_err();
    assert!(matches!(err, BriefError::Config(_)));
}
