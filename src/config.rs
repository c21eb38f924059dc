use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

/// Max number of forecast days offered by Open-Meteo
pub const MAX_FORECAST_DAYS: usize = 16;

#[derive(Deserialize)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Location {
    pub default_place: String,
}

#[derive(Deserialize)]
pub struct ForecastParameters {
    #[serde(default = "default_days")]
    pub days: usize,
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
    #[serde(default = "default_cache_max_age_hours")]
    pub cache_max_age_hours: i64,
}

impl Default for ForecastParameters {
    fn default() -> Self {
        Self {
            days: default_days(),
            cache_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_age_hours: default_cache_max_age_hours(),
        }
    }
}

fn default_days() -> usize { 10 }
fn default_cache_ttl_secs() -> i64 { 300 }
fn default_cache_max_age_hours() -> i64 { 48 }

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub location: Location,
    #[serde(default)]
    pub forecast: ForecastParameters,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates a configuration document
///
/// # Arguments
///
/// * 'toml' - the configuration as a toml string
fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.forecast.days == 0 || config.forecast.days > MAX_FORECAST_DAYS {
        return Err(ConfigError::from("forecast days must be within 1..=16"));
    }
    if config.forecast.cache_ttl_secs < 0 || config.forecast.cache_max_age_hours < 0 {
        return Err(ConfigError::from("cache durations can't be negative"));
    }

    Ok(config)
}
