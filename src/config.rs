use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::BriefError;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BriefConfig {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub location: LocationConfig,
    pub brief: BriefSection,
    pub family: Vec<FamilyMember>,
    pub weather: WeatherConfig,
    pub llm: LlmConfig,
    pub outputs: Vec<OutputConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub language: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: String,
}

/// Longest look-ahead a brief accepts, in days.
pub const MAX_DAYS_AHEAD: u32 = 366;

/// Reject a look-ahead longer than [`MAX_DAYS_AHEAD`].
pub fn check_days_ahead(days_ahead: u32) -> Result<u32, BriefError> {
    if days_ahead > MAX_DAYS_AHEAD {
        return Err(BriefError::Config(format!(
            "days_ahead must be at most {MAX_DAYS_AHEAD}, got {days_ahead}"
        )));
    }
    Ok(days_ahead)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BriefSection {
    pub days_ahead: u32,
}

/// A person on the family roster. Read-only input to the birthday matcher.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FamilyMember {
    pub name: String,
    /// `YYYY-MM-DD`; the year is only used to compute age.
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub user_agent: String,
    pub forecast_days: u32,
    /// Max wind (m/s) at or above which the day's summary mentions wind.
    pub wind_threshold_ms: f64,
    /// Max UV index at or above which the day's summary mentions UV.
    pub uv_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub kind: String,
    pub url: Option<String>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            location: LocationConfig::default(),
            brief: BriefSection::default(),
            family: Vec::new(),
            weather: WeatherConfig::default(),
            llm: LlmConfig::default(),
            outputs: Vec::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            language: "en".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_daybrief_dir()
            .join("daybrief.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            latitude: None,
            longitude: None,
            timezone: "UTC".into(),
        }
    }
}

impl Default for BriefSection {
    fn default() -> Self {
        Self { days_ahead: 3 }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.met.no/weatherapi/locationforecast/2.0".into(),
            user_agent: concat!("daybrief/", env!("CARGO_PKG_VERSION")).into(),
            forecast_days: 5,
            wind_threshold_ms: 10.0,
            uv_threshold: 3.0,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.4,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

/// Returns `~/.daybrief/`
pub fn default_daybrief_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".daybrief")
}

/// Returns the default config file path: `~/.daybrief/config.toml`
pub fn default_config_path() -> PathBuf {
    default_daybrief_dir().join("config.toml")
}

impl BriefConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            BriefConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (DAYBRIEF_DB, DAYBRIEF_LOG_LEVEL, DAYBRIEF_TIMEZONE, DAYBRIEF_LANGUAGE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DAYBRIEF_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("DAYBRIEF_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Ok(val) = std::env::var("DAYBRIEF_TIMEZONE") {
            self.location.timezone = val;
        }
        if let Ok(val) = std::env::var("DAYBRIEF_LANGUAGE") {
            self.general.language = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Fill in every default and validate, producing the configuration the
    /// brief pipeline runs on. This is the only place defaults are applied.
    pub fn resolve(&self) -> Result<ResolvedConfig, BriefError> {
        let timezone: Tz = self.location.timezone.trim().parse().map_err(|_| {
            BriefError::Config(format!(
                "unknown timezone `{}` in [location]",
                self.location.timezone
            ))
        })?;

        let location_name = self.location.name.trim();
        if location_name.is_empty() {
            return Err(BriefError::Config(
                "[location] name is required".to_string(),
            ));
        }

        let language = match self.general.language.trim() {
            "" => "en".to_string(),
            lang => lang.to_string(),
        };

        let outputs = if self.outputs.is_empty() {
            vec![OutputTarget::Cli]
        } else {
            self.outputs
                .iter()
                .map(OutputTarget::from_config)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(ResolvedConfig {
            language,
            db_path: self.resolved_db_path(),
            location: Location {
                name: location_name.to_string(),
                latitude: self.location.latitude,
                longitude: self.location.longitude,
            },
            timezone,
            days_ahead: check_days_ahead(self.brief.days_ahead)?,
            family: self.family.clone(),
            weather: self.weather.clone(),
            llm: self.llm.clone(),
            outputs,
        })
    }
}

/// Fully populated configuration. Built once by [`BriefConfig::resolve`] and
/// passed by reference into each component.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub language: String,
    pub db_path: PathBuf,
    pub location: Location,
    pub timezone: Tz,
    pub days_ahead: u32,
    pub family: Vec<FamilyMember>,
    pub weather: WeatherConfig,
    pub llm: LlmConfig,
    pub outputs: Vec<OutputTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    /// Coordinates, or a config error naming the missing field.
    pub fn coordinates(&self) -> Result<(f64, f64), BriefError> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            (None, _) => Err(BriefError::Config(
                "[location] latitude is required for weather import".to_string(),
            )),
            (_, None) => Err(BriefError::Config(
                "[location] longitude is required for weather import".to_string(),
            )),
        }
    }
}

/// Where a finished brief is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    Cli,
    Webhook { url: String },
}

impl OutputTarget {
    fn from_config(output: &OutputConfig) -> Result<Self, BriefError> {
        match output.kind.trim() {
            "" | "cli" => Ok(Self::Cli),
            "webhook" => match output.url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => Ok(Self::Webhook {
                    url: url.to_string(),
                }),
                _ => Err(BriefError::Config(
                    "webhook output requires a `url`".to_string(),
                )),
            },
            other => Err(BriefError::Config(format!("unknown output kind `{other}`"))),
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helsinki() -> BriefConfig {
        let mut config = BriefConfig::default();
        config.location.name = "Helsinki".into();
        config.location.timezone = "Europe/Helsinki".into();
        config
    }

    #[test]
    fn default_config_is_valid() {
        let config = BriefConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.language, "en");
        assert_eq!(config.location.timezone, "UTC");
        assert_eq!(config.brief.days_ahead, 3);
        assert!(config.storage.db_path.ends_with("daybrief.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[general]
language = "fi"

[location]
name = "Helsinki"
latitude = 60.17
longitude = 24.94
timezone = "Europe/Helsinki"

[brief]
days_ahead = 5

[[family]]
name = "Aino"
birthday = "2015-06-01"

[[family]]
name = "Mikko"

[[outputs]]
kind = "webhook"
url = "https://example.com/hook"
"#;
        let config: BriefConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.language, "fi");
        assert_eq!(config.location.latitude, Some(60.17));
        assert_eq!(config.brief.days_ahead, 5);
        assert_eq!(config.family.len(), 2);
        assert_eq!(config.family[0].birthday.as_deref(), Some("2015-06-01"));
        assert!(config.family[1].birthday.is_none());
        // defaults still apply for unset fields
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.weather.forecast_days, 5);
    }

    #[test]
    fn resolve_fills_defaults() {
        let mut config = helsinki();
        config.general.language = "  ".into();

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.language, "en");
        assert_eq!(resolved.outputs, vec![OutputTarget::Cli]);
        assert_eq!(resolved.timezone, chrono_tz::Europe::Helsinki);
        assert_eq!(resolved.location.name, "Helsinki");
    }

    #[test]
    fn resolve_rejects_unknown_timezone() {
        let mut config = helsinki();
        config.location.timezone = "Mars/Olympus_Mons".into();

        let err = config.resolve().unwrap_err();
        assert!(matches!(err, BriefError::Config(_)));
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn resolve_requires_location_name() {
        let err = BriefConfig::default().resolve().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn resolve_bounds_days_ahead() {
        let mut config = helsinki();
        config.brief.days_ahead = MAX_DAYS_AHEAD;
        assert_eq!(config.resolve().unwrap().days_ahead, MAX_DAYS_AHEAD);

        config.brief.days_ahead = 200_000_000;
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, BriefError::Config(_)));
        assert!(err.to_string().contains("200000000"));
    }

    #[test]
    fn resolve_rejects_webhook_without_url() {
        let mut config = helsinki();
        config.outputs.push(OutputConfig {
            kind: "webhook".into(),
            url: None,
        });
        assert!(matches!(config.resolve(), Err(BriefError::Config(_))));
    }

    #[test]
    fn coordinates_require_both_fields() {
        let mut config = helsinki();
        config.location.latitude = Some(60.17);
        let resolved = config.resolve().unwrap();
        let err = resolved.location.coordinates().unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = BriefConfig::default();
        std::env::set_var("DAYBRIEF_DB", "/tmp/override.db");
        std::env::set_var("DAYBRIEF_LOG_LEVEL", "trace");
        std::env::set_var("DAYBRIEF_TIMEZONE", "Europe/Oslo");
        std::env::set_var("DAYBRIEF_LANGUAGE", "nb");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.general.log_level, "trace");
        assert_eq!(config.location.timezone, "Europe/Oslo");
        assert_eq!(config.general.language, "nb");

        // Clean up
        std::env::remove_var("DAYBRIEF_DB");
        std::env::remove_var("DAYBRIEF_LOG_LEVEL");
        std::env::remove_var("DAYBRIEF_TIMEZONE");
        std::env::remove_var("DAYBRIEF_LANGUAGE");
    }
}
