//! Logger setup.
//!
//! `env_logger` with two line formats: colored plain text for terminals and
//! one JSON object per line for log collectors. The crate's own level comes
//! from the configuration; `RUST_LOG` still tunes everything else.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter, Record};

/// Dependencies whose logs drown out acquisition progress, with the most
/// verbose level still shown for each.
const NOISY_TARGETS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    // Reports every unknown CDP event as an error
    ("chromiumoxide", LevelFilter::Off),
];

/// Installs the global logger.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (target, filter) in NOISY_TARGETS {
        builder.filter_module(target, *filter);
    }
    builder.filter_module("site_audit", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(buf, "{}", json_line(chrono::Utc::now().timestamp_millis(), record))
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {:>5} {} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    colored_level(record.level()),
                    record.target().cyan(),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

fn colored_level(level: Level) -> ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}

/// One log record as a JSON object with `ts`, `level`, `target` and `msg`.
fn json_line(timestamp_ms: i64, record: &Record) -> String {
    serde_json::json!({
        "ts": timestamp_ms,
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}
