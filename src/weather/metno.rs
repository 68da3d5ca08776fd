//! MET Norway locationforecast client.
//!
//! The API requires an identifying `User-Agent` and rejects requests without
//! one. Coordinates are rounded to four decimals as the terms of service ask.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::config::WeatherConfig;

#[derive(Debug, Deserialize)]
pub struct Forecast {
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub timeseries: Vec<TimeStep>,
}

#[derive(Debug, Deserialize)]
pub struct TimeStep {
    pub time: DateTime<Utc>,
    pub data: StepData,
}

#[derive(Debug, Deserialize)]
pub struct StepData {
    pub instant: Instant,
    #[serde(default)]
    pub next_1_hours: Option<Period>,
    #[serde(default)]
    pub next_6_hours: Option<Period>,
}

#[derive(Debug, Deserialize)]
pub struct Instant {
    pub details: InstantDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstantDetails {
    pub air_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub ultraviolet_index_clear_sky: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub summary: Option<PeriodSummary>,
    #[serde(default)]
    pub details: Option<PeriodDetails>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodSummary {
    pub symbol_code: String,
}

#[derive(Debug, Deserialize)]
pub struct PeriodDetails {
    pub precipitation_amount: Option<f64>,
}

pub struct MetNoClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetNoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch the full forecast for a coordinate.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast> {
        let url = forecast_url(&self.base_url, latitude, longitude);
        tracing::debug!(%url, "fetching forecast");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {url}"))?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "forecast request failed with HTTP {status}");

        response
            .json::<Forecast>()
            .await
            .context("failed to parse forecast JSON")
    }
}

fn forecast_url(base_url: &str, latitude: f64, longitude: f64) -> String {
    format!("{base_url}/complete?lat={latitude:.4}&lon={longitude:.4}")
}
