use std::fmt;
use std::fmt::Formatter;

/// Base bias of the logistic fog model
const W_BASE: f64 = -2.2;
/// Weight per percent of relative humidity above 85%
const W_RH: f64 = 0.05;
/// Weight per degree of temperature/dew point spread
const W_SPREAD: f64 = -0.5;
/// Added when wind is calm (<= 3 km/h)
const W_CALM: f64 = 0.6;
/// Added when there is a light breeze (<= 6 km/h)
const W_BREEZE: f64 = 0.15;
/// Subtracted per 4 km/h of wind above 6 km/h
const W_WINDY: f64 = 0.25;
/// Weight per percent of low cloud cover above 40%
const W_LOW_CLOUD: f64 = 0.012;
/// Weight per hPa of surface pressure above 1015 hPa
const W_PRESSURE: f64 = 0.01;
const W_NIGHT: f64 = 0.7;
const W_FREEZE: f64 = 0.25;

/// Risk values at or above this level are considered high
pub const HIGH_RISK: f64 = 0.7;
/// Risk values at or above this level (and below HIGH_RISK) are considered medium
pub const MEDIUM_RISK: f64 = 0.4;

/// Instantaneous weather covariates for one hour at one location.
/// All values but the hour are optional, a missing value simply contributes nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeatherSample {
    /// Temperature in °C
    pub temperature: Option<f64>,
    /// Dew point in °C
    pub dew_point: Option<f64>,
    /// Relative humidity in %
    pub relative_humidity: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed: Option<f64>,
    /// Low cloud cover in %
    pub low_cloud_cover: Option<f64>,
    /// Surface pressure in hPa
    pub surface_pressure: Option<f64>,
    /// Local hour of day, 0-23
    pub hour: u32,
}

/// Risk buckets used when presenting a fog risk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Returns the bucket for the given risk value
    ///
    /// # Arguments
    ///
    /// * 'risk' - fog risk in the range 0-1
    pub fn from_risk(risk: f64) -> RiskLevel {
        if risk >= HIGH_RISK {
            RiskLevel::High
        } else if risk >= MEDIUM_RISK {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::High => "🌫️",
            RiskLevel::Medium => "☁️",
            RiskLevel::Low => "☀️",
        }
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RiskLevel::Low    => write!(f, "low "),
            RiskLevel::Medium => write!(f, "med "),
            RiskLevel::High   => write!(f, "high"),
        }
    }
}

/// Estimates the probability of fog given a weather sample.
///
/// The model is a logistic function over a linear combination of the available covariates.
/// Relative humidity is derived from the temperature/dew point spread when not given, and
/// night hours (21-06) as well as near freezing temperatures (<= 2°C) add to the score.
///
/// # Arguments
///
/// * 'sample' - the weather covariates to score
pub fn fog_probability(sample: &WeatherSample) -> f64 {
    let spread = match (sample.temperature, sample.dew_point) {
        (Some(t), Some(td)) => Some(t - td),
        _ => None,
    };
    let rh = sample.relative_humidity
        .or_else(|| spread.map(|s| clamp01(1.0 - s / 20.0) * 100.0));
    let night = sample.hour >= 21 || sample.hour <= 6;
    let near_freezing = sample.temperature.is_some_and(|t| t <= 2.0);

    let mut z = W_BASE;
    if let Some(rh) = rh {
        z += W_RH * (rh - 85.0);
    }
    if let Some(spread) = spread {
        z += W_SPREAD * spread.clamp(-2.0, 4.0);
    }
    if let Some(wind) = sample.wind_speed {
        z += wind_term(wind);
    }
    if let Some(low_cloud) = sample.low_cloud_cover {
        z += W_LOW_CLOUD * (low_cloud - 40.0);
    }
    if let Some(pressure) = sample.surface_pressure {
        z += W_PRESSURE * (pressure - 1015.0);
    }
    if night {
        z += W_NIGHT;
    }
    if near_freezing {
        z += W_FREEZE;
    }

    clamp01(sigmoid(z))
}

/// Wind contribution, calm air favours fog while stronger wind mixes it out
///
/// # Arguments
///
/// * 'wind' - wind speed in km/h
fn wind_term(wind: f64) -> f64 {
    if wind <= 3.0 {
        W_CALM
    } else if wind <= 6.0 {
        W_BREEZE
    } else {
        -W_WINDY * (wind - 6.0) / 4.0
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Clamps a value into the range 0-1, NaN is treated as 0
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}
