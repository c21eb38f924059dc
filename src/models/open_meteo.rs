use serde::{Deserialize, Serialize};

/// Hourly table as returned by Open-Meteo, one array per variable indexed in parallel with `time`.
/// Every array as well as every single value may be missing.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Hourly {
    pub time: Option<Vec<String>>,
    pub temperature_2m: Option<Vec<Option<f64>>>,
    pub dew_point_2m: Option<Vec<Option<f64>>>,
    pub relative_humidity_2m: Option<Vec<Option<f64>>>,
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
    pub cloud_cover_low: Option<Vec<Option<f64>>>,
    pub surface_pressure: Option<Vec<Option<f64>>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Daily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ForecastDocument {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub hourly: Option<Hourly>,
    pub daily: Option<Daily>,
}

/// Returns the value at index i of an optional array, treating short arrays and nulls as missing
///
/// # Arguments
///
/// * 'values' - the optional value array
/// * 'i' - index to get
pub fn value_at(values: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v.get(i).copied().flatten())
}
