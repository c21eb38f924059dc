use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use glob::glob;
use log::debug;
use crate::errors::CacheError;
use crate::models::open_meteo::ForecastDocument;

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const STAMP_LEN: usize = 14;

/// Returns the cache key for a forecast request.
/// Coordinates are rounded to 3 decimals and path separators in the time zone are replaced.
///
/// # Arguments
///
/// * 'lat' - latitude
/// * 'long' - longitude
/// * 'days' - requested forecast horizon
/// * 'timezone' - requested time zone, "auto" when left to the service
pub fn cache_key(lat: f64, long: f64, days: usize, timezone: &str) -> String {
    format!("{:.3}_{:.3}_{}d_{}", lat, long, days, timezone.replace('/', "-"))
}

/// Saves a forecast document to the cache directory
///
/// # Arguments
///
/// * 'cache_dir' - the directory to save the file to
/// * 'key' - cache key of the forecast
/// * 'now' - time of fetch, used to stamp the file
/// * 'forecast' - the forecast document to save
pub fn save_forecast(cache_dir: &str, key: &str, now: DateTime<Utc>, forecast: &ForecastDocument) -> Result<(), CacheError> {
    fs::create_dir_all(cache_dir)?;
    let file_path = Path::new(cache_dir)
        .join(format!("{}_{}_forecast.json", now.format(STAMP_FORMAT), key));

    let json = serde_json::to_string(forecast)?;
    fs::write(file_path, json)?;

    Ok(())
}

/// Loads the most recent forecast document for the given key if it is still fresh
///
/// # Arguments
///
/// * 'cache_dir' - the directory to load the file from
/// * 'key' - cache key of the forecast
/// * 'now' - current time
/// * 'ttl' - max age of a usable forecast
pub fn load_forecast(cache_dir: &str, key: &str, now: DateTime<Utc>, ttl: TimeDelta) -> Result<Option<ForecastDocument>, CacheError> {
    let pattern = Path::new(cache_dir).join(format!("*_{}_forecast.json", key));

    let newest = cached_files(&pattern)?
        .into_iter()
        .filter(|(stamp, _)| now - *stamp <= ttl && *stamp <= now)
        .max_by_key(|(stamp, _)| *stamp);

    match newest {
        Some((stamp, path)) => {
            debug!("using cached forecast from {}", stamp);
            let json = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&json)?))
        },
        None => Ok(None),
    }
}

/// Removes cached forecast files older than max age
///
/// # Arguments
///
/// * 'cache_dir' - the cache directory
/// * 'now' - current time
/// * 'max_age' - age from which a file is removed
pub fn purge_forecasts(cache_dir: &str, now: DateTime<Utc>, max_age: TimeDelta) -> Result<usize, CacheError> {
    let pattern = Path::new(cache_dir).join("*_forecast.json");

    let mut removed = 0;
    for (stamp, path) in cached_files(&pattern)? {
        if now - stamp > max_age {
            fs::remove_file(path)?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Lists cache files matching the pattern together with the time stamp in their name.
/// Files without a valid stamp are ignored.
///
/// # Arguments
///
/// * 'pattern' - glob pattern to match
fn cached_files(pattern: &Path) -> Result<Vec<(DateTime<Utc>, PathBuf)>, CacheError> {
    let mut files = Vec::new();

    for entry in glob(&pattern.to_string_lossy())? {
        if let Ok(path) = entry {
            if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
                if let Some(stamp) = filename.get(0..STAMP_LEN) {
                    if let Ok(date_time) = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT) {
                        files.push((date_time.and_utc(), path));
                    }
                }
            }
        }
    }

    Ok(files)
}
