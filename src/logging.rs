use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::General;
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {m}{n}";

/// Sets up log4rs as logging backend given the general configuration section
///
/// Logs go to stdout and/or to the configured log file. If neither is configured
/// logging is effectively turned off.
///
/// # Arguments
///
/// * 'general' - general configuration parameters
pub fn setup_logger(general: &General) -> Result<log4rs::Handle, LoggingError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let level = if general.log_to_stdout || general.log_path.is_some() {
        general.log_level
    } else {
        LevelFilter::Off
    };

    let config = builder.build(root.build(level))?;

    Ok(log4rs::init_config(config)?)
}
