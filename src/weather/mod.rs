//! Weather import: fetch a forecast, condense it to one line per local day, and
//! append those lines to the fact store.
//!
//! Each run adds new facts and leaves older forecasts alone; the brief picks
//! the newest per date when it reads them back.

pub mod metno;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

use crate::config::{ResolvedConfig, WeatherConfig};
use crate::memory::sqlite::SqliteStore;
use crate::memory::types::{NewFact, Source};
use metno::{Forecast, MetNoClient, TimeStep};

/// Aggregated forecast for one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Most frequent weather symbol of the day, e.g. `partlycloudy`.
    pub symbol: Option<String>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation_mm: f64,
    pub max_wind_ms: Option<f64>,
    pub max_uv: Option<f64>,
}

impl DaySummary {
    /// One-line description. Wind and UV only appear at or above their thresholds.
    pub fn describe(&self, config: &WeatherConfig) -> String {
        let mut parts = Vec::new();
        if let Some(ref symbol) = self.symbol {
            parts.push(symbol.clone());
        }
        match (self.min_temp, self.max_temp) {
            (Some(min), Some(max)) if min.round() == max.round() => {
                parts.push(format!("{} °C", min.round() as i64))
            }
            (Some(min), Some(max)) => {
                parts.push(format!("{} to {} °C", min.round() as i64, max.round() as i64))
            }
            _ => {}
        }
        if self.precipitation_mm >= 0.05 {
            parts.push(format!("precipitation {:.1} mm", self.precipitation_mm));
        } else {
            parts.push("no precipitation".to_string());
        }
        if let Some(wind) = self.max_wind_ms.filter(|w| *w >= config.wind_threshold_ms) {
            parts.push(format!("wind up to {} m/s", wind.round() as i64));
        }
        if let Some(uv) = self.max_uv.filter(|u| *u >= config.uv_threshold) {
            parts.push(format!("UV index up to {}", uv.round() as i64));
        }
        parts.join(", ")
    }
}

#[derive(Default)]
struct DayAccumulator {
    symbols: Vec<(String, usize)>,
    min_temp: Option<f64>,
    max_temp: Option<f64>,
    precipitation_mm: f64,
    max_wind_ms: Option<f64>,
    max_uv: Option<f64>,
}

impl DayAccumulator {
    fn add(&mut self, step: &TimeStep) {
        let details = &step.data.instant.details;
        if let Some(t) = details.air_temperature {
            self.min_temp = Some(self.min_temp.map_or(t, |m| m.min(t)));
            self.max_temp = Some(self.max_temp.map_or(t, |m| m.max(t)));
        }
        if let Some(w) = details.wind_speed {
            self.max_wind_ms = Some(self.max_wind_ms.map_or(w, |m| m.max(w)));
        }
        if let Some(uv) = details.ultraviolet_index_clear_sky {
            self.max_uv = Some(self.max_uv.map_or(uv, |m| m.max(uv)));
        }

        // Hourly steps carry next_1_hours; the 6-hourly tail only next_6_hours.
        let period = step
            .data
            .next_1_hours
            .as_ref()
            .or(step.data.next_6_hours.as_ref());
        if let Some(period) = period {
            if let Some(amount) = period.details.as_ref().and_then(|d| d.precipitation_amount) {
                self.precipitation_mm += amount;
            }
            if let Some(ref summary) = period.summary {
                self.count_symbol(normalize_symbol(&summary.symbol_code));
            }
        }
    }

    fn count_symbol(&mut self, symbol: String) {
        match self.symbols.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, count)) => *count += 1,
            None => self.symbols.push((symbol, 1)),
        }
    }

    fn finish(self, date: NaiveDate) -> DaySummary {
        // Ties go to the symbol seen first.
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.symbols {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        DaySummary {
            date,
            symbol: best.map(|(s, _)| s.clone()),
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            precipitation_mm: self.precipitation_mm,
            max_wind_ms: self.max_wind_ms,
            max_uv: self.max_uv,
        }
    }
}

/// `partlycloudy_day` -> `partlycloudy`, `lightrain_showers` -> `lightrain showers`.
fn normalize_symbol(code: &str) -> String {
    let base = code
        .strip_suffix("_day")
        .or_else(|| code.strip_suffix("_night"))
        .or_else(|| code.strip_suffix("_polartwilight"))
        .unwrap_or(code);
    base.replace('_', " ")
}

/// Group forecast steps by local date and summarize `days` days starting at `from`.
/// Days with no steps are left out.
pub fn summarize_days(
    forecast: &Forecast,
    timezone: Tz,
    from: NaiveDate,
    days: u32,
) -> Vec<DaySummary> {
    let until = from + Duration::days(i64::from(days));
    let mut by_day: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for step in &forecast.properties.timeseries {
        let date = step.time.with_timezone(&timezone).date_naive();
        if date < from || date >= until {
            continue;
        }
        by_day.entry(date).or_default().add(step);
    }
    by_day
        .into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect()
}

/// Append one forecast fact per summary under `weather-metno:<location>`.
pub fn store_forecasts(
    store: &SqliteStore,
    location: &str,
    summaries: &[DaySummary],
    config: &WeatherConfig,
) -> Result<usize> {
    let source = Source::weather(location);
    for summary in summaries {
        let text = summary.describe(config);
        store.insert_fact(&NewFact::on_date(text, summary.date, source.clone()))?;
    }
    tracing::info!(source = %source, days = summaries.len(), "forecasts stored");
    Ok(summaries.len())
}

/// Fetch, summarize and store the forecast for the configured location.
pub async fn import_forecast(
    store: &SqliteStore,
    config: &ResolvedConfig,
    now: DateTime<Utc>,
) -> Result<usize> {
    let (latitude, longitude) = config.location.coordinates()?;
    let client = MetNoClient::new(&config.weather)?;
    let forecast = client.fetch(latitude, longitude).await?;

    let today = now.with_timezone(&config.timezone).date_naive();
    let summaries = summarize_days(&forecast, config.timezone, today, config.weather.forecast_days);
    if summaries.is_empty() {
        tracing::warn!(location = %config.location.name, "forecast contained no usable days");
    }
    store_forecasts(store, &config.location.name, &summaries, &config.weather)
}
