//! Logging utilities.
//!
//! Library code logs through the `log` facade. Binaries call [`init_logging`]
//! once at startup; it installs a `tracing_subscriber` formatter writing to
//! stderr, so that stdout stays free for reports, and bridges `log` records
//! into it with `tracing_log::LogTracer`.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;

use crate::error::{ConfigError, Error, Result};

/// Timestamp layout of every console line
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Log level.
///
/// This enum represents the different log levels in the system,
/// ordered by increasing severity. `Off` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose debug information.
    Trace,

    /// Debug information.
    Debug,

    /// Informational messages.
    Info,

    /// Warning messages.
    Warning,

    /// Error messages.
    Error,

    /// No output at all.
    Off,
}

impl LogLevel {
    /// Get the name of this log level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Off => "OFF",
        }
    }

    /// The `log` crate filter admitting this level and everything more severe.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::Trace,
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
            Self::Warning => LevelFilter::Warn,
            Self::Error => LevelFilter::Error,
            Self::Off => LevelFilter::Off,
        }
    }

    /// The matching filter for the tracing subscriber.
    pub fn to_tracing_filter(self) -> tracing_subscriber::filter::LevelFilter {
        use tracing_subscriber::filter::LevelFilter as Filter;

        match self {
            Self::Trace => Filter::TRACE,
            Self::Debug => Filter::DEBUG,
            Self::Info => Filter::INFO,
            Self::Warning => Filter::WARN,
            Self::Error => Filter::ERROR,
            Self::Off => Filter::OFF,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    /// Case-insensitive conversion from a level name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            "off" | "none" => Ok(Self::Off),
            _ => Err(ConfigError::Invalid(format!("unknown log level: {}", s)).into()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the console subscriber as the global logger.
///
/// Records at `level` and above are written to stderr as
/// `timestamp LEVEL thread target: message`. Fails if a logger or a tracing
/// subscriber has already been installed in this process.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.to_tracing_filter())
        .with_timer(ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_thread_names(true)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing_log::LogTracer::builder()
        .with_max_level(level.to_level_filter())
        .init()
        .map_err(|e| Error::LoggingInit(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::LoggingInit(e.to_string()))?;
    Ok(())
}
