use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use log::{debug, warn};
use crate::errors::SeriesError;
use crate::models::open_meteo::{value_at, Daily, ForecastDocument, Hourly};
use crate::risk::{fog_probability, RiskLevel, WeatherSample};

/// Number of hourly slots in a day series
pub const HOURS: usize = 24;

/// Risk used for leading hours of a day that lack any forecast data
pub const DEFAULT_RISK: f64 = 0.2;

/// Fog risk per hour of one calendar day
#[derive(Clone, Debug, PartialEq)]
pub struct DaySeries {
    pub date: NaiveDate,
    /// Days after today, 0 being today
    pub offset: usize,
    pub hours: [f64; HOURS],
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    /// Number of distinct hours of this day that had forecast data
    pub samples: usize,
}

impl DaySeries {
    /// Returns the worst hour of the day as a tuple of hour and risk.
    /// On ties the earliest hour is returned.
    pub fn peak(&self) -> (usize, f64) {
        let mut peak = (0, self.hours[0]);
        for (h, &risk) in self.hours.iter().enumerate().skip(1) {
            if risk > peak.1 {
                peak = (h, risk);
            }
        }

        peak
    }

    /// The headline risk of the day, i.e. the peak hourly risk
    pub fn risk(&self) -> f64 {
        self.peak().1
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_risk(self.risk())
    }
}

/// Fog risk series for a number of consecutive days starting today
#[derive(Clone, Debug)]
pub struct ForecastWindow {
    pub label: String,
    pub today: NaiveDate,
    pub days: Vec<DaySeries>,
}

impl ForecastWindow {
    pub fn get_day(&self, offset: usize) -> Option<&DaySeries> {
        self.days.get(offset)
    }
}

/// Returns the current date at a location given its offset from UTC
///
/// # Arguments
///
/// * 'now' - current UTC time
/// * 'utc_offset_seconds' - the location's offset from UTC in seconds
pub fn local_today(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDate {
    (now + TimeDelta::seconds(utc_offset_seconds as i64)).date_naive()
}

/// Builds a forecast window of fog risk series from a forecast document.
///
/// Every hourly record is scored and put in the slot given by its day offset from today and its
/// hour. Records before today or beyond the horizon are dropped. Each day is then gap filled
/// and smoothed, so the resulting window always holds exactly `days` series of 24 values.
///
/// # Arguments
///
/// * 'forecast' - forecast document as returned by Open-Meteo
/// * 'label' - label of the place the forecast is for
/// * 'today' - the local date of the location
/// * 'days' - forecast horizon in days
pub fn build_window(forecast: &ForecastDocument, label: &str, today: NaiveDate, days: usize) -> Result<ForecastWindow, SeriesError> {
    let hourly = forecast.hourly.as_ref().ok_or(SeriesError::MissingHourly)?;
    let (slots, samples) = score_hourly(hourly, today, days)?;

    let empty = Daily::default();
    let daily = forecast.daily.as_ref().unwrap_or(&empty);

    let series = slots.into_iter()
        .zip(samples)
        .enumerate()
        .map(|(offset, (slots, samples))| {
            let date = today + TimeDelta::days(offset as i64);
            let (sunrise, sunset) = sun_times(daily, date, offset);
            let mut hours = fill_gaps(&slots);
            smooth(&mut hours);

            DaySeries { date, offset, hours, sunrise, sunset, samples }
        })
        .collect::<Vec<DaySeries>>();

    debug!("built {} day series for {}", series.len(), label);

    Ok(ForecastWindow { label: label.to_string(), today, days: series })
}

/// Scores every hourly record and places it in its day/hour slot
///
/// # Arguments
///
/// * 'hourly' - the hourly table
/// * 'today' - the local date of the location
/// * 'days' - forecast horizon in days
fn score_hourly(hourly: &Hourly, today: NaiveDate, days: usize) -> Result<(Vec<[Option<f64>; HOURS]>, Vec<usize>), SeriesError> {
    let times = hourly.time.as_ref().ok_or(SeriesError::MissingHourly)?;

    let mut slots: Vec<[Option<f64>; HOURS]> = vec![[None; HOURS]; days];
    let mut samples: Vec<usize> = vec![0; days];

    for (i, time) in times.iter().enumerate() {
        let Some(date_time) = parse_local_time(time) else {
            warn!("skipping hourly record with invalid time '{}'", time);
            continue;
        };

        let offset = (date_time.date() - today).num_days();
        if offset < 0 || offset >= days as i64 {
            continue;
        }

        let sample = WeatherSample {
            temperature: value_at(&hourly.temperature_2m, i),
            dew_point: value_at(&hourly.dew_point_2m, i),
            relative_humidity: value_at(&hourly.relative_humidity_2m, i),
            wind_speed: value_at(&hourly.wind_speed_10m, i),
            low_cloud_cover: value_at(&hourly.cloud_cover_low, i),
            surface_pressure: value_at(&hourly.surface_pressure, i),
            hour: date_time.hour(),
        };

        // a repeated local hour (DST fall back) overwrites the slot but counts once
        let slot = &mut slots[offset as usize][date_time.hour() as usize];
        if slot.is_none() {
            samples[offset as usize] += 1;
        }
        *slot = Some(fog_probability(&sample));
    }

    Ok((slots, samples))
}

/// Fills hours lacking data.
/// Gaps are first filled forward with the latest known value, starting from DEFAULT_RISK if the
/// first hour is unknown. Any hour still unknown is then filled backward from the next known hour.
///
/// # Arguments
///
/// * 'slots' - hourly risks where unknown hours are None
fn fill_gaps(slots: &[Option<f64>; HOURS]) -> [f64; HOURS] {
    let mut filled = *slots;

    let mut last = Some(DEFAULT_RISK);
    for slot in filled.iter_mut() {
        if slot.is_some() {
            last = *slot;
        } else {
            *slot = last;
        }
    }

    for h in (0..HOURS - 1).rev() {
        if filled[h].is_none() {
            filled[h] = filled[h + 1];
        }
    }

    filled.map(|v| v.unwrap_or(DEFAULT_RISK))
}

/// Three point moving average over hours 1 through 22.
/// The average is taken in place in ascending hour order, so each hour sees the already smoothed
/// value of the hour before. The first and last hour are kept as is.
///
/// # Arguments
///
/// * 'hours' - hourly risks to smooth
fn smooth(hours: &mut [f64; HOURS]) {
    for h in 1..HOURS - 1 {
        hours[h] = (hours[h - 1] + hours[h] + hours[h + 1]) / 3.0;
    }
}

/// Returns sunrise and sunset for a date.
/// Daily records are matched on date, falling back to position when the daily table has no
/// usable dates.
///
/// # Arguments
///
/// * 'daily' - the daily table
/// * 'date' - date to get sun times for
/// * 'offset' - the date's position in the window
fn sun_times(daily: &Daily, date: NaiveDate, offset: usize) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let index = daily.time.iter()
        .position(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").is_ok_and(|d| d == date))
        .or_else(|| if daily.time.is_empty() { Some(offset) } else { None });

    match index {
        Some(i) => {
            let get = |values: &Vec<Option<String>>| values.get(i)
                .and_then(|v| v.as_deref())
                .and_then(parse_local_time);
            (get(&daily.sunrise), get(&daily.sunset))
        },
        None => (None, None),
    }
}

/// Parses a local ISO 8601 time stamp as given by Open-Meteo, with or without seconds
///
/// # Arguments
///
/// * 'time' - the time stamp to parse
pub fn parse_local_time(time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn hourly_times(start: NaiveDate, hours: usize) -> Vec<String> {
        (0..hours)
            .map(|h| {
                let t = start.and_hms_opt(0, 0, 0).unwrap() + TimeDelta::hours(h as i64);
                t.format("%Y-%m-%dT%H:%M").to_string()
            })
            .collect()
    }

    fn document(times: Vec<String>) -> ForecastDocument {
        let n = times.len();
        let hourly = Hourly {
            time: Some(times),
            temperature_2m: Some((0..n).map(|i| Some(5.0 + (i % 24) as f64 / 4.0)).collect()),
            dew_point_2m: Some(vec![Some(4.0); n]),
            relative_humidity_2m: None,
            wind_speed_10m: Some((0..n).map(|i| Some((i % 13) as f64)).collect()),
            cloud_cover_low: Some(vec![Some(70.0); n]),
            surface_pressure: Some(vec![None; n]),
        };
        ForecastDocument { hourly: Some(hourly), ..Default::default() }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_missing_hourly_is_error() {
        let doc = ForecastDocument::default();
        assert_eq!(build_window(&doc, "x", today(), 10).unwrap_err(), SeriesError::MissingHourly);

        let doc = ForecastDocument { hourly: Some(Hourly::default()), ..Default::default() };
        assert_eq!(build_window(&doc, "x", today(), 10).unwrap_err(), SeriesError::MissingHourly);
    }

    #[test]
    fn test_window_has_every_day_with_24_values_in_range() {
        // starts the day before today and runs two days past the horizon
        let start = today() - TimeDelta::days(1);
        let doc = document(hourly_times(start, 24 * 13));
        let window = build_window(&doc, "Somewhere", today(), 10).unwrap();

        assert_eq!(window.days.len(), 10);
        for (i, day) in window.days.iter().enumerate() {
            assert_eq!(day.offset, i);
            assert_eq!(day.date, today() + TimeDelta::days(i as i64));
            assert_eq!(day.samples, 24);
            assert_eq!(day.hours.len(), HOURS);
            assert!(day.hours.iter().all(|r| (0.0..=1.0).contains(r)));
        }
    }

    #[test]
    fn test_days_without_samples_are_seeded() {
        let doc = document(hourly_times(today(), 24));
        let window = build_window(&doc, "x", today(), 3).unwrap();

        assert_eq!(window.days.len(), 3);
        assert_eq!(window.days[0].samples, 24);
        for day in &window.days[1..] {
            assert_eq!(day.samples, 0);
            assert!(day.hours.iter().all(|&r| approx(r, DEFAULT_RISK)));
        }
    }

    #[test]
    fn test_single_sample_is_broadcast_forward() {
        let mut slots = [None; HOURS];
        slots[10] = Some(0.8);

        let filled = fill_gaps(&slots);
        assert!(filled[..10].iter().all(|&r| r == DEFAULT_RISK));
        assert!(filled[10..].iter().all(|&r| r == 0.8));

        let mut hours = filled;
        smooth(&mut hours);
        assert_eq!(hours[0], DEFAULT_RISK);
        assert!(hours[1..9].iter().all(|&r| approx(r, DEFAULT_RISK)));
        assert!(approx(hours[9], (0.2 + 0.2 + 0.8) / 3.0));
        assert!(approx(hours[10], (hours[9] + 0.8 + 0.8) / 3.0));
        assert!(hours[10] < 0.8 && hours[11] > hours[10]);
        assert_eq!(hours[23], 0.8);
    }

    #[test]
    fn test_forward_fill_keeps_last_known_value() {
        let mut slots = [None; HOURS];
        slots[0] = Some(0.5);
        slots[5] = Some(0.9);

        let filled = fill_gaps(&slots);
        assert!(filled[..5].iter().all(|&r| r == 0.5));
        assert!(filled[5..].iter().all(|&r| r == 0.9));
    }

    #[test]
    fn test_smooth_is_in_place_and_keeps_edges() {
        let mut hours = [0.0; HOURS];
        hours[1] = 0.9;
        smooth(&mut hours);

        assert_eq!(hours[0], 0.0);
        assert!(approx(hours[1], 0.3));
        // hour 2 averages the already smoothed hour 1
        assert!(approx(hours[2], 0.1));
        assert_eq!(hours[23], 0.0);
    }

    #[test]
    fn test_peak_is_max_and_first_hour() {
        let mut hours = [0.1; HOURS];
        hours[7] = 0.75;
        hours[19] = 0.75;
        let day = DaySeries { date: today(), offset: 0, hours, sunrise: None, sunset: None, samples: 24 };

        assert_eq!(day.peak(), (7, 0.75));
        assert_eq!(day.risk(), 0.75);
        assert_eq!(day.level(), RiskLevel::High);
    }

    #[test]
    fn test_aggregate_is_max_of_smoothed_hours() {
        let doc = document(hourly_times(today(), 24 * 2));
        let window = build_window(&doc, "x", today(), 2).unwrap();
        for day in &window.days {
            let max = day.hours.iter().cloned().fold(f64::MIN, f64::max);
            assert_eq!(day.risk(), max);
            assert_eq!(day.hours[day.peak().0], max);
        }
    }

    #[test]
    fn test_repeated_local_hour_counts_once() {
        let mut times = hourly_times(today(), 4);
        times.insert(2, times[1].clone());
        let doc = document(times);
        let window = build_window(&doc, "x", today(), 1).unwrap();
        assert_eq!(window.days[0].samples, 4);
    }

    #[test]
    fn test_invalid_times_are_skipped() {
        let mut times = hourly_times(today(), 3);
        times[1] = "not a time".to_string();
        let doc = document(times);
        let window = build_window(&doc, "x", today(), 1).unwrap();
        assert_eq!(window.days[0].samples, 2);
    }

    #[test]
    fn test_sun_times_matched_on_date() {
        let mut doc = document(hourly_times(today(), 24));
        doc.daily = Some(Daily {
            time: vec!["2026-10-18".to_string(), "2026-10-19".to_string()],
            sunrise: vec![Some("2026-10-18T07:25".to_string()), Some("2026-10-19T07:27".to_string())],
            sunset: vec![Some("2026-10-18T17:55".to_string()), None],
        });
        let window = build_window(&doc, "x", today(), 2).unwrap();

        let day = &window.days[0];
        assert_eq!(day.sunrise, parse_local_time("2026-10-19T07:27"));
        assert_eq!(day.sunset, None);
        assert_eq!(window.days[1].sunrise, None);
    }

    #[test]
    fn test_sun_times_by_position_without_dates() {
        let daily = Daily {
            time: vec![],
            sunrise: vec![None, Some("2026-10-20T07:29".to_string())],
            sunset: vec![None, Some("2026-10-20T17:51".to_string())],
        };
        let (sunrise, sunset) = sun_times(&daily, today() + TimeDelta::days(1), 1);
        assert_eq!(sunrise, parse_local_time("2026-10-20T07:29"));
        assert_eq!(sunset, parse_local_time("2026-10-20T17:51"));
    }

    #[test]
    fn test_local_today_respects_offset() {
        let now = DateTime::parse_from_rfc3339("2026-10-19T23:30:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(local_today(now, 0), today());
        assert_eq!(local_today(now, 3600), today() + TimeDelta::days(1));
        assert_eq!(local_today(now, -5 * 3600), today());
    }

    #[test]
    fn test_parse_local_time_formats() {
        assert!(parse_local_time("2026-10-19T05:00").is_some());
        assert!(parse_local_time("2026-10-19T05:00:00").is_some());
        assert!(parse_local_time("2026-10-19").is_none());
    }
}
