// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Observability configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,

    /// Show the event target (module path) on console lines
    pub with_target: bool,

    /// Per-run log files; only honoured with the `file-logging` feature
    pub file: Option<FileLoggingConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            with_target: false,
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            ..Default::default()
        }
    }
}

/// Where run folders go and how many are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub log_dir: PathBuf,
    /// Remove run folders older than this
    pub retention_days: u64,
    /// Keep at most this many run folders
    pub retention_runs: usize,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        FileLoggingConfig {
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
