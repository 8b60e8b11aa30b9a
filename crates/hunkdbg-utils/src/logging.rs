//! # Logging Utilities
//!
//! Logging infrastructure for hunkdbg using `tracing`.
//!
//! Command output goes to stdout, so every log line is written to stderr
//! (and optionally to a file). The decoder and resolver only emit events;
//! installing a subscriber is up to the host.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hunkdbg_utils::init_logging;
//!
//! // Reads RUST_LOG, HUNKDBG_LOG_FORMAT and HUNKDBG_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=hunkdbg_core=trace`)
//! - `HUNKDBG_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `HUNKDBG_LOG_FILE`: Optional log file; the current date is added to its name
//!
//! ## Examples
//!
//! ```rust,no_run
//! use hunkdbg_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! // An explicit level wins over RUST_LOG
//! let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
//!     .expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::{NaiveDate, Utc};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_VAR: &str = "HUNKDBG_LOG_FORMAT";
/// Environment variable naming an optional log file.
pub const LOG_FILE_VAR: &str = "HUNKDBG_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Resolved logging settings
///
/// Built from the environment by [`LogConfig::from_env`] or by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig
{
    /// Explicit level; overrides `directives` when set.
    pub level: Option<LogLevel>,
    /// `RUST_LOG` style filter directives.
    pub directives: Option<String>,
    /// Output format for every sink.
    pub format: LogFormat,
    /// Log file requested by the user (before the date is added).
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read `RUST_LOG`, `HUNKDBG_LOG_FORMAT` and `HUNKDBG_LOG_FILE`.
    ///
    /// ## Errors
    ///
    /// [`LoggingError::InvalidFormat`] if `HUNKDBG_LOG_FORMAT` is set to an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`LogConfig::from_env`] with a custom variable lookup.
    ///
    /// ## Errors
    ///
    /// [`LoggingError::InvalidFormat`] for an unknown format name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError>
    {
        let format = match lookup(LOG_FORMAT_VAR) {
            Some(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            level: None,
            directives: lookup(EnvFilter::DEFAULT_ENV).filter(|value| !value.trim().is_empty()),
            format,
            file: lookup(LOG_FILE_VAR).filter(|value| !value.is_empty()).map(PathBuf::from),
        })
    }

    /// Builder-style override of the level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    /// Build the event filter.
    ///
    /// Priority:
    /// 1. The explicit level (from a `--log-level` flag)
    /// 2. `RUST_LOG` directives (allow per-crate filters like `hunkdbg_core=trace`)
    /// 3. `warn`, so a plain run only shows problems with the binary
    ///
    /// ## Errors
    ///
    /// [`LoggingError::InvalidLevel`] if the directives do not parse.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError>
    {
        if let Some(level) = self.level {
            return Ok(EnvFilter::new(Level::from(level).to_string()));
        }
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| LoggingError::InvalidLevel(format!("{directives}: {err}")))
            }
            None => Ok(EnvFilter::new(Level::WARN.to_string())),
        }
    }
}

/// Keeps the file writer flushing until dropped
///
/// Hold it for the lifetime of the program; dropping it early loses buffered
/// file output.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from environment variables
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Filter directives (e.g., `debug`, `hunkdbg_core=debug`)
/// - `HUNKDBG_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `HUNKDBG_LOG_FILE`: Optional path to a log file
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - An environment variable holds an invalid value
/// - The log file cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_from(&LogConfig::from_env()?)
}

/// Initialize logging with explicit level and format
///
/// `HUNKDBG_LOG_FILE` is still honored.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let mut config = LogConfig::from_env().unwrap_or_default();
    config.level = Some(level);
    config.format = format;
    init_logging_from(&config)
}

/// Initialize logging from a prepared [`LogConfig`]
///
/// ## Errors
///
/// Returns an error if logging is already initialized, the filter is invalid
/// or the log file cannot be created.
pub fn init_logging_from(config: &LogConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(config.format, io::stderr, true, config.filter()?)];

    let mut file_guard = None;
    if let Some(requested) = &config.file {
        let path = dated_log_path(requested, Utc::now().date_naive());
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)?;
        let file_name = path.file_name().unwrap_or_default();

        let (non_blocking, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
        layers.push(fmt_layer(config.format, non_blocking, false, config.filter()?));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// `logs/hunkdbg.log` on 2024-03-01 becomes `logs/2024-03-01-hunkdbg.log`.
fn dated_log_path(requested: &Path, date: NaiveDate) -> PathBuf
{
    let name = requested
        .file_name()
        .map_or_else(|| "hunkdbg.log".to_string(), |name| name.to_string_lossy().into_owned());
    requested.with_file_name(format!("{}-{name}", date.format("%Y-%m-%d")))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level or filter directive
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
