use std::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use log::{info, warn};
use ureq::Agent;
use crate::cache::{cache_key, load_forecast, purge_forecasts, save_forecast};
use crate::config::ForecastParameters;
use crate::errors::ForecastError;
use crate::manager_geocoding::Place;
use crate::models::open_meteo::ForecastDocument;

const HOURLY_PARAMETERS: &str =
    "temperature_2m,dew_point_2m,relative_humidity_2m,wind_speed_10m,cloud_cover_low,surface_pressure";
const DAILY_PARAMETERS: &str = "sunrise,sunset";

/// Struct for fetching weather forecasts from Open-Meteo
pub struct OpenMeteo {
    agent: Agent,
    days: usize,
    cache_dir: Option<String>,
    cache_ttl: TimeDelta,
    cache_max_age: TimeDelta,
}

impl OpenMeteo {
    /// Returns an OpenMeteo struct ready for fetching forecasts
    ///
    /// # Arguments
    ///
    /// * 'parameters' - forecast horizon and cache settings
    pub fn new(parameters: &ForecastParameters) -> OpenMeteo {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        let agent = config.into();

        Self {
            agent,
            days: parameters.days,
            cache_dir: parameters.cache_dir.clone(),
            cache_ttl: TimeDelta::seconds(parameters.cache_ttl_secs),
            cache_max_age: TimeDelta::hours(parameters.cache_max_age_hours),
        }
    }

    /// Returns the forecast horizon in days
    pub fn get_days(&self) -> usize {
        self.days
    }

    /// Retrieves an hourly and daily forecast for the given place.
    ///
    /// A cached forecast younger than the cache TTL is returned instead of fetching a new one.
    /// Cache failures are logged and otherwise ignored.
    ///
    /// # Arguments
    ///
    /// * 'place' - the place to get a forecast for
    pub fn new_forecast(&self, place: &Place) -> Result<ForecastDocument, ForecastError> {
        let now = Utc::now();
        let key = self.cache_key(place);

        if let Some(forecast) = self.load_cached(&key, now) {
            return Ok(forecast);
        }

        let forecast = self.fetch(place)?;
        info!("forecast OK for {}", place.label);

        self.store_cached(&key, now, &forecast);

        Ok(forecast)
    }

    /// Returns the cache key for a place given the requested horizon and time zone
    ///
    /// # Arguments
    ///
    /// * 'place' - the place the forecast is for
    fn cache_key(&self, place: &Place) -> String {
        cache_key(place.lat, place.long, self.days, place.timezone.as_deref().unwrap_or("auto"))
    }

    /// Returns a fresh cached forecast if there is one.
    /// Read failures are logged and treated as a cache miss.
    ///
    /// # Arguments
    ///
    /// * 'key' - cache key of the forecast
    /// * 'now' - current time
    fn load_cached(&self, key: &str, now: DateTime<Utc>) -> Option<ForecastDocument> {
        let cache_dir = self.cache_dir.as_deref()?;

        match load_forecast(cache_dir, key, now, self.cache_ttl) {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("failed to read forecast cache: {}", e);
                None
            },
        }
    }

    /// Saves a fetched forecast to the cache and purges old entries, failures are only logged
    ///
    /// # Arguments
    ///
    /// * 'key' - cache key of the forecast
    /// * 'now' - time of fetch
    /// * 'forecast' - the forecast to save
    fn store_cached(&self, key: &str, now: DateTime<Utc>, forecast: &ForecastDocument) {
        let Some(cache_dir) = self.cache_dir.as_deref() else {
            return;
        };

        if let Err(e) = save_forecast(cache_dir, key, now, forecast) {
            warn!("failed to save forecast to cache: {}", e);
        }
        if let Err(e) = purge_forecasts(cache_dir, now, self.cache_max_age) {
            warn!("failed to purge forecast cache: {}", e);
        }
    }

    /// Fetches a forecast from Open-Meteo
    ///
    /// # Arguments
    ///
    /// * 'place' - the place to get a forecast for
    fn fetch(&self, place: &Place) -> Result<ForecastDocument, ForecastError> {
        let lat = format!("{}", place.lat);
        let long = format!("{}", place.long);
        let days = format!("{}", self.days);
        let timezone = place.timezone.as_deref().unwrap_or("auto");

        let json = self.agent
            .get("https://api.open-meteo.com/v1/forecast")
            .query("latitude", &lat)
            .query("longitude", &long)
            .query("timezone", timezone)
            .query("forecast_days", &days)
            .query("hourly", HOURLY_PARAMETERS)
            .query("daily", DAILY_PARAMETERS)
            .query("timeformat", "iso8601")
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(serde_json::from_str(&json)?)
    }
}
