//! Logging configuration and initialization
//!
//! Console output is compact text by default or JSON on request. A log file
//! can be enabled alongside it; the file is appended to across runs so
//! actuator errors from earlier sessions are kept.

use std::fs::OpenOptions;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log file name when file logging is enabled without a path
pub const DEFAULT_LOG_FILE: &str = "gesture-relay.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Enable file logging (default: false)
    pub file_enabled: bool,
    /// Path for the log file (default: `gesture-relay.log` in the working directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Default log level filter (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Resolved log file path
    pub fn file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }
}

/// Initialize the global subscriber with the given configuration
///
/// Returns a guard that must be kept alive for the duration of the program
/// so buffered file output is flushed.
///
/// # Environment Variables
///
/// - `GESTURE_RELAY_LOG`: level filter (e.g. "debug", "info,gesture_relay=trace")
/// - `GESTURE_RELAY_LOG_FORMAT`: set to "json" for JSON console output
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, std::io::Error> {
    let env_filter = EnvFilter::try_from_env("GESTURE_RELAY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let use_json = std::env::var("GESTURE_RELAY_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(config.json_format);

    let mut file_guard: Option<WorkerGuard> = None;

    let file_layer = if config.file_enabled {
        let log_path = config.file_path();
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        file_guard = Some(guard);

        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false),
        )
    } else {
        None
    };

    let (json_layer, text_layer) = match (config.console_enabled, use_json) {
        (true, true) => (
            Some(fmt::layer().json().with_target(true).with_file(true).with_line_number(true)),
            None,
        ),
        (true, false) => (None, Some(fmt::layer().with_target(true).compact())),
        (false, _) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!(
        target: "gesture_relay",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(file_guard)
}
