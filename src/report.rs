use std::fmt;
use std::fmt::Formatter;
use chrono::{NaiveDateTime, Timelike};
use crate::risk::RiskLevel;
use crate::series::{DaySeries, ForecastWindow};

const CARD_BAR_WIDTH: usize = 20;
const CHART_BAR_WIDTH: usize = 40;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Sun position marker for an hour in the hourly chart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SunPhase {
    Sunrise,
    Sunset,
    Day,
    Night,
    Unknown,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for SunPhase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SunPhase::Sunrise => write!(f, "🌅"),
            SunPhase::Sunset  => write!(f, "🌇"),
            SunPhase::Day     => write!(f, "☀️"),
            SunPhase::Night   => write!(f, "🌙"),
            SunPhase::Unknown => write!(f, "  "),
        }
    }
}

/// Returns the sun phase of an hour in a day.
/// Without both sunrise and sunset the phase is unknown.
///
/// # Arguments
///
/// * 'day' - the day series holding sun times
/// * 'hour' - hour of the day
pub fn sun_phase(day: &DaySeries, hour: u32) -> SunPhase {
    match (day.sunrise, day.sunset) {
        (Some(sunrise), Some(sunset)) => {
            if hour == sunrise.hour() {
                SunPhase::Sunrise
            } else if hour == sunset.hour() {
                SunPhase::Sunset
            } else if hour > sunrise.hour() && hour < sunset.hour() {
                SunPhase::Day
            } else {
                SunPhase::Night
            }
        },
        _ => SunPhase::Unknown,
    }
}

/// One line summary of a day
pub struct DayCard<'a>(pub &'a DaySeries);

/// Implementation of the Display Trait for pretty print
impl fmt::Display for DayCard<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let day = self.0;
        let (peak_hour, risk) = day.peak();
        let level = day.level();

        write!(f, "{:>2} {} {} {:>3}% {} {:<w$} {} peak {:0>2}:00 ↑ {} ↓ {}",
               day.offset,
               day.date.format("%a %b %e"),
               level.icon(),
               percent(risk),
               level,
               bar(risk, CARD_BAR_WIDTH),
               sparkline(&day.hours),
               peak_hour,
               hm(day.sunrise),
               hm(day.sunset),
               w = CARD_BAR_WIDTH)?;

        if day.samples == 0 {
            write!(f, " (no data)")?;
        }

        Ok(())
    }
}

/// Hourly bar chart of one day
pub struct HourlyChart<'a> {
    pub label: &'a str,
    pub day: &'a DaySeries,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for HourlyChart<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let (peak_hour, peak) = self.day.peak();

        writeln!(f, "{} – {}", self.day.date.format("%a %b %e"), self.label)?;
        writeln!(f, "Peak {:0>2}:00 · {}% · ↑ {} ↓ {}",
                 peak_hour, percent(peak), hm(self.day.sunrise), hm(self.day.sunset))?;

        for (h, &risk) in self.day.hours.iter().enumerate() {
            writeln!(f, "{:0>2} {} {:>3}% {} {}",
                     h,
                     sun_phase(self.day, h as u32),
                     percent(risk),
                     RiskLevel::from_risk(risk),
                     bar(risk.max(0.05), CHART_BAR_WIDTH))?;
        }

        Ok(())
    }
}

/// Full fog outlook, one card per day
pub struct Outlook<'a>(pub &'a ForecastWindow);

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Outlook<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let caption = format!("Fog outlook {} from {} ", self.0.label, self.0.today);
        writeln!(f, "{:=<80}", caption)?;
        for day in &self.0.days {
            writeln!(f, "{}", DayCard(day))?;
        }

        Ok(())
    }
}

fn percent(risk: f64) -> u32 {
    (risk * 100.0).round() as u32
}

fn bar(risk: f64, width: usize) -> String {
    let len = ((risk * width as f64).round() as usize).min(width);
    "█".repeat(len)
}

/// One block character per hour, block height following the risk
fn sparkline(hours: &[f64]) -> String {
    hours.iter()
        .map(|risk| {
            let level = (risk.clamp(0.0, 1.0) * (SPARKS.len() - 1) as f64).round() as usize;
            SPARKS[level]
        })
        .collect()
}

fn hm(time: Option<NaiveDateTime>) -> String {
    time.map_or("—".to_string(), |t| t.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::series::parse_local_time;

    fn day(hours: [f64; 24], samples: usize) -> DaySeries {
        DaySeries {
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            offset: 0,
            hours,
            sunrise: parse_local_time("2026-10-19T07:27"),
            sunset: parse_local_time("2026-10-19T17:53"),
            samples,
        }
    }

    #[test]
    fn test_sun_phases() {
        let d = day([0.2; 24], 24);
        assert_eq!(sun_phase(&d, 3), SunPhase::Night);
        assert_eq!(sun_phase(&d, 7), SunPhase::Sunrise);
        assert_eq!(sun_phase(&d, 12), SunPhase::Day);
        assert_eq!(sun_phase(&d, 17), SunPhase::Sunset);
        assert_eq!(sun_phase(&d, 21), SunPhase::Night);

        let no_sun = DaySeries { sunset: None, ..d };
        assert_eq!(sun_phase(&no_sun, 12), SunPhase::Unknown);
    }

    #[test]
    fn test_day_card() {
        let mut hours = [0.1; 24];
        hours[5] = 0.72;
        let card = DayCard(&day(hours, 24)).to_string();

        assert!(card.starts_with(" 0 Mon Oct 19"));
        assert!(card.contains(" 72% high"));
        assert!(card.contains("peak 05:00"));
        assert!(card.contains("▂▂▂▂▂▆▂▂▂▂▂▂▂▂▂▂▂▂▂▂▂▂▂▂"));
        assert!(card.contains("↑ 07:27 ↓ 17:53"));
        assert!(!card.contains("no data"));
    }

    #[test]
    fn test_day_card_without_data() {
        let d = DaySeries { sunrise: None, sunset: None, ..day([0.2; 24], 0) };
        let card = DayCard(&d).to_string();

        assert!(card.contains(" 20% low"));
        assert!(card.contains("↑ — ↓ —"));
        assert!(card.ends_with("(no data)"));
    }

    #[test]
    fn test_hourly_chart_rows() {
        let mut hours = [0.0; 24];
        hours[22] = 0.5;
        let d = day(hours, 24);
        let chart = HourlyChart { label: "London", day: &d }.to_string();
        let lines = chart.lines().collect::<Vec<&str>>();

        assert_eq!(lines.len(), 26);
        assert_eq!(lines[0], "Mon Oct 19 – London");
        assert!(lines[1].starts_with("Peak 22:00 · 50%"));
        // minimum bar is drawn even at zero risk
        assert!(lines[2].ends_with("██"));
        assert!(lines[24].contains(" 50% med "));
    }

    #[test]
    fn test_outlook_has_caption_and_one_card_per_day() {
        let first = day([0.1; 24], 24);
        let second = DaySeries { offset: 1, date: first.date.succ_opt().unwrap(), ..first.clone() };
        let window = ForecastWindow { label: "London".to_string(), today: first.date, days: vec![first, second] };
        let outlook = Outlook(&window).to_string();
        let lines = outlook.lines().collect::<Vec<&str>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Fog outlook London from 2026-10-19 ="));
        assert!(lines[2].starts_with(" 1 Tue Oct 20"));
    }

    #[test]
    fn test_sparkline_has_one_mark_per_hour() {
        let mut hours = [0.0; 24];
        hours[0] = 1.0;
        hours[12] = 0.5;
        let line = sparkline(&hours);

        assert_eq!(line.chars().count(), 24);
        assert_eq!(line.chars().next(), Some('█'));
        assert_eq!(line.chars().nth(12), Some('▅'));
        assert_eq!(line.chars().nth(23), Some('▁'));
    }

    #[test]
    fn test_bar_width_is_bounded() {
        assert_eq!(bar(0.0, 10), "");
        assert_eq!(bar(0.5, 10).chars().count(), 5);
        assert_eq!(bar(1.5, 10).chars().count(), 10);
    }
}
