//! Logging for chatlens.
//!
//! Events go to a daily-rotated file under `$XDG_STATE_HOME/chatlens/`.
//! Stdout belongs to report output, so the only terminal sink is an optional
//! stderr echo for `--verbose` runs.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_PREFIX: &str = "chatlens.log";

/// Keeps the non-blocking writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// `RUST_LOG` if set, else the configured level.
fn level_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("invalid logging.level {:?}: {}", config.level, e)))
}

fn file_appender(dir: &Path, max_files: usize) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(max_files.max(1))
        .build(dir)
        .map_err(|e| {
            Error::Config(format!(
                "failed to create log file in {}: {}",
                dir.display(),
                e
            ))
        })
}

/// Initialize logging into the XDG state directory.
///
/// With `verbose`, warnings and errors are also echoed to stderr.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard> {
    init_in(&Config::state_dir(), config, verbose)
}

/// Initialize logging into `dir`.
///
/// A subscriber that is already installed (tests, embedding applications)
/// is left in place.
pub fn init_in(dir: &Path, config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard> {
    let filter = level_filter(config)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender(dir, config.max_files)?);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(tracing_subscriber::filter::LevelFilter::WARN)
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(log_dir = %dir.display(), level = %config.level, "Logging initialized");
    }

    Ok(LoggingGuard { _guard: guard })
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Path of the current log file's prefix; rotated files carry a date suffix.
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}
