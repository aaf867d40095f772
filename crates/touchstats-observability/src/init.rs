// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the touchstats tools
//!
//! Console output always goes to stderr so that command output on stdout
//! stays machine-readable. With the `file-logging` feature a timestamped run
//! folder is created as well:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── touchstats.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::LoggingConfig;
use crate::ObservabilityError;

#[cfg(feature = "file-logging")]
use crate::config::FileLoggingConfig;

/// Keeps file writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder, when file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the `EnvFilter` for the given debug flags and default level
pub fn build_filter(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
) -> Result<EnvFilter, ObservabilityError> {
    let filter = debug_flags.to_filter_string_with_default(&default_level.to_lowercase());
    EnvFilter::try_new(&filter).map_err(|e| ObservabilityError::InvalidFilter {
        filter,
        reason: e.to_string(),
    })
}

/// Install the global subscriber
///
/// # Errors
/// Fails on an unparsable level, if the run folder cannot be created, or if a
/// subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter(debug_flags, &config.level)?);
    layers.push(console_layer.boxed());

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = match &config.file {
        Some(file_config) => {
            let run_folder = create_run_folder(file_config)?;
            let appender = tracing_appender::rolling::never(&run_folder, "touchstats.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(build_filter(debug_flags, &config.level)?)
                .boxed();
            layers.push(file_layer);

            (vec![guard], Some(run_folder))
        }
        None => (Vec::new(), None),
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|_| ObservabilityError::AlreadyInitialized)?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

#[cfg(feature = "file-logging")]
const RUN_FOLDER_FORMAT: &str = "%Y%m%d_%H%M%S";

#[cfg(feature = "file-logging")]
fn create_run_folder(file_config: &FileLoggingConfig) -> Result<PathBuf> {
    use anyhow::Context;

    let timestamp = chrono::Utc::now().format(RUN_FOLDER_FORMAT);
    let run_folder = file_config.log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(
        &file_config.log_dir,
        file_config.retention_days,
        file_config.retention_runs,
    )?;
    Ok(run_folder)
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`. Returns how many folders were removed.
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<usize> {
    use chrono::{DateTime, NaiveDateTime, Utc};

    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let started = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix("run_"))
            .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_FOLDER_FORMAT).ok());
        if let Some(started) = started {
            runs.push((path, started.and_utc()));
        }
    }

    // newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (index, (path, started)) in runs.iter().enumerate() {
        if *started >= cutoff_date && index < retention_runs {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}
