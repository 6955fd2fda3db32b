//! Logging setup for Cubelet.
//!
//! Everything goes to stdout and to a daily rolling `cubelet.log` under the
//! platform data directory; warnings and errors are also copied to `error.log`.
//!
//! ```no_run
//! cubelet::logging::init().expect("Failed to initialize logging");
//! tracing::info!("App started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Rotated files kept per log.
const MAX_LOG_FILES: usize = 10;

/// Log directory, created on first use.
///
/// - Windows: `%APPDATA%/cubelet/logs`
/// - macOS: `~/Library/Application Support/cubelet/logs`
/// - Linux: `~/.local/share/cubelet/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let log_dir = crate::utils::standard_paths().logs_dir;
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }
    Ok(log_dir)
}

fn daily_appender(prefix: &str, log_dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
///
/// # Errors
///
/// Returns error if the log directory or file appenders cannot be created.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;
    let all_logs_appender = daily_appender("cubelet", &log_dir)?;
    let error_logs_appender = daily_appender("error", &log_dir)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .pretty();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized, log directory: {:?}", log_dir);
    Ok(())
}

/// Path of today's main log file.
pub fn get_current_log_path() -> Result<PathBuf> {
    let log_dir = get_log_dir()?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Ok(log_dir.join(format!("cubelet.{today}.log")))
}
