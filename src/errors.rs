use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ConfigError::File: {0}")]
    File(#[from] std::io::Error),
    #[error("ConfigError::Document: {0}")]
    Document(#[from] toml::de::Error),
    #[error("ConfigError::Value: {0}")]
    Value(String),
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError::Value(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("LoggingError::Appender: {0}")]
    Appender(#[from] std::io::Error),
    #[error("LoggingError::Config: {0}")]
    Config(String),
    #[error("LoggingError::Logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        LoggingError::Config(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("GeoError::EmptyQuery: enter a place")]
    EmptyQuery,
    #[error("GeoError::NotFound: place not found: {0}")]
    NotFound(String),
    #[error("GeoError::Network: {0}")]
    Network(String),
    #[error("GeoError::Document: {0}")]
    Document(#[from] serde_json::Error),
}
impl From<ureq::Error> for GeoError {
    fn from(e: ureq::Error) -> Self {
        GeoError::Network(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("ForecastError::Network: {0}")]
    Network(String),
    #[error("ForecastError::Document: {0}")]
    Document(#[from] serde_json::Error),
}
impl From<ureq::Error> for ForecastError {
    fn from(e: ureq::Error) -> Self {
        ForecastError::Network(e.to_string())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("SeriesError::MissingHourly: forecast carries no hourly time index")]
    MissingHourly,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("CacheError::File: {0}")]
    File(#[from] std::io::Error),
    #[error("CacheError::Document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("CacheError::Pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Error, Debug)]
pub enum FogCastError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("FogCastError::Argument: {0}")]
    Argument(String),
}
