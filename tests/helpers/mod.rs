#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use daybrief::config::{BriefConfig, FamilyMember, ResolvedConfig};
use daybrief::memory::sqlite::{SqliteStore, UpsertOutcome};
use daybrief::memory::types::{NewEvent, NewFact, Source};

/// A fresh in-memory store with schema and migrations applied.
pub fn test_store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Insert a fact; `None` makes it evergreen. Returns the row id.
pub fn add_fact(store: &SqliteStore, content: &str, on: Option<NaiveDate>, source: Source) -> i64 {
    let fact = match on {
        Some(d) => NewFact::on_date(content, d, source),
        None => NewFact::evergreen(content, source),
    };
    store.insert_fact(&fact).unwrap()
}

/// Insert a forecast for `location` on `on`, fetched at `fetched_at`.
pub fn add_forecast(
    store: &SqliteStore,
    location: &str,
    on: NaiveDate,
    content: &str,
    fetched_at: DateTime<Utc>,
) -> i64 {
    let fact = NewFact::on_date(content, on, Source::weather(location));
    store.insert_fact_at(&fact, fetched_at).unwrap()
}

pub fn event(
    uid: &str,
    summary: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    calendar: &str,
) -> NewEvent {
    NewEvent {
        external_uid: uid.into(),
        summary: summary.into(),
        start_time: start,
        end_time: end,
        location: None,
        description: None,
        source: Source::calendar(calendar),
    }
}

pub fn add_event(
    store: &SqliteStore,
    summary: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> UpsertOutcome {
    let uid = format!("{summary}-{}", start.timestamp());
    store
        .upsert_event(&event(&uid, summary, start, end, "Family"))
        .unwrap()
}

pub fn member(name: &str, birthday: Option<&str>) -> FamilyMember {
    FamilyMember {
        name: name.into(),
        birthday: birthday.map(String::from),
        contact_id: None,
    }
}

/// A resolved config for location "Helsinki" in `timezone`.
pub fn resolved_config(timezone: &str, family: Vec<FamilyMember>) -> ResolvedConfig {
    let mut config = BriefConfig::default();
    config.location.name = "Helsinki".into();
    config.location.timezone = timezone.into();
    config.family = family;
    config.resolve().unwrap()
}
