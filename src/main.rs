use std::env;
use std::process::ExitCode;
use anyhow::Context;
use chrono::Utc;
use log::{error, info};
use crate::config::load_config;
use crate::errors::FogCastError;
use crate::logging::setup_logger;
use crate::manager_geocoding::GeoCoding;
use crate::manager_open_meteo::OpenMeteo;
use crate::report::{HourlyChart, Outlook};
use crate::series::{build_window, local_today};

mod cache;
mod config;
mod errors;
mod logging;
mod manager_geocoding;
mod manager_open_meteo;
mod models;
mod report;
mod risk;
mod series;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration, resolves the requested place, fetches its forecast and prints
/// the fog outlook together with the hourly chart of the selected day
///
fn run() -> anyhow::Result<()> {
    let config_path = env::var("FOGCAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path)
        .map_err(FogCastError::from)
        .with_context(|| format!("failed to load config from {}", config_path))?;
    let _handle = setup_logger(&config.general).map_err(FogCastError::from)?;

    info!("fogcast version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = env::args().skip(1);
    let query = args.next().unwrap_or_else(|| config.location.default_place.clone());
    let selected = match args.next() {
        Some(day) => day.parse::<usize>()
            .map_err(|e| FogCastError::Argument(format!("invalid day '{}': {}", day, e)))?,
        None => 0,
    };
    if selected >= config.forecast.days {
        return Err(FogCastError::Argument(
            format!("day must be within 0..{}", config.forecast.days)).into());
    }

    let geo = GeoCoding::new();
    let place = geo.geocode(&query)
        .map_err(FogCastError::from)
        .context("geocoding failed, try a simpler place name")?;

    let open_meteo = OpenMeteo::new(&config.forecast);
    let forecast = open_meteo.new_forecast(&place)
        .map_err(FogCastError::from)
        .context("forecast failed")?;

    let today = local_today(Utc::now(), forecast.utc_offset_seconds);
    let window = build_window(&forecast, &place.label, today, open_meteo.get_days())
        .map_err(FogCastError::from)?;

    print!("{}", Outlook(&window));
    if let Some(day) = window.get_day(selected) {
        println!();
        print!("{}", HourlyChart { label: &window.label, day });
    }

    info!("done");

    Ok(())
}
