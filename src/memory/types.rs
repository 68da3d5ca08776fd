//! Core record type definitions.
//!
//! Defines [`Source`] (who produced a record, and for which scope), [`Fact`] (a
//! dated-or-evergreen memory), and [`CalendarEvent`] (an interval-bearing event),
//! plus the insert shapes [`NewFact`] and [`NewEvent`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of producer that wrote a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Entered by hand.
    Manual,
    /// Imported from a calendar feed; scope is the calendar name.
    Calendar,
    /// Forecast from the MET Norway API; scope is the location name.
    WeatherMetNo,
    /// Any other producer prefix, preserved verbatim.
    Other(String),
}

impl SourceKind {
    /// Prefix used in the stored source tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::Calendar => "calendar",
            Self::WeatherMetNo => "weather-metno",
            Self::Other(prefix) => prefix,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SourceKind {
    fn from(s: &str) -> Self {
        match s {
            "manual" => Self::Manual,
            "calendar" => Self::Calendar,
            "weather-metno" => Self::WeatherMetNo,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Producer and scope of a record, e.g. `calendar` + `Family`.
///
/// Stored as a flat `kind:scope` tag; conversion happens only at the storage edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub kind: SourceKind,
    pub scope: Option<String>,
}

impl Source {
    pub fn manual() -> Self {
        Self {
            kind: SourceKind::Manual,
            scope: None,
        }
    }

    pub fn calendar(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Calendar,
            scope: Some(name.into()),
        }
    }

    pub fn weather(location: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::WeatherMetNo,
            scope: Some(location.into()),
        }
    }

    /// Parse a stored tag, splitting at the first colon. Unknown prefixes
    /// become [`SourceKind::Other`].
    pub fn from_tag(tag: &str) -> Self {
        let (kind, scope) = match tag.split_once(':') {
            Some((kind, scope)) => (kind, Some(scope.to_string())),
            None => (tag, None),
        };
        Self {
            kind: SourceKind::from(kind),
            scope,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}", self.kind, scope),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

impl std::str::FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&raw))
    }
}

/// A stored fact, matching the `facts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Row id; also the tie-breaker for equal `created_at`.
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// `None` means evergreen: relevant to every window.
    pub relevance_date: Option<DateTime<Utc>>,
    pub source: Source,
    pub external_uid: Option<String>,
}

impl Fact {
    pub fn is_evergreen(&self) -> bool {
        self.relevance_date.is_none()
    }
}

/// A fact to insert.
#[derive(Debug, Clone)]
pub struct NewFact {
    pub content: String,
    pub relevance_date: Option<DateTime<Utc>>,
    pub source: Source,
    pub external_uid: Option<String>,
}

impl NewFact {
    pub fn evergreen(content: impl Into<String>, source: Source) -> Self {
        Self {
            content: content.into(),
            relevance_date: None,
            source,
            external_uid: None,
        }
    }

    /// A fact relevant on `date`, stored at 00:00 UTC of that date.
    pub fn on_date(content: impl Into<String>, date: NaiveDate, source: Source) -> Self {
        Self {
            content: content.into(),
            relevance_date: Some(date_start_utc(date)),
            source,
            external_uid: None,
        }
    }
}

/// A stored calendar event, matching the `calendar_events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub external_uid: String,
    pub summary: String,
    pub start_time: DateTime<Utc>,
    /// `None` for a point-in-time event.
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub source: Source,
}

/// An event to upsert. Identity is `(source, external_uid, start_time)`.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub external_uid: String,
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub source: Source,
}

/// 00:00 UTC on `date`.
pub fn date_start_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
