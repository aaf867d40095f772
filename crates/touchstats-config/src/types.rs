// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `touchstats.toml`. Every field has a
//! default, so an empty file is a complete configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TouchstatsConfig {
    pub analysis: AnalysisConfig,
    pub archive: ArchiveConfig,
    pub plotting: PlottingConfig,
    pub logging: LoggingConfig,
}

/// Histogram and sensor selection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Equal-width bins per distribution
    pub n_bins: usize,
    /// Sensor analysed in multi-sensor archives (0-2)
    pub trq_sensor_no: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_bins: 30,
            trq_sensor_no: 0,
        }
    }
}

/// Where trial archives live
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub data_dir: PathBuf,
    /// Archive file extension, without the dot
    pub extension: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            extension: "json".to_string(),
        }
    }
}

/// Axis limits passed through to plotting front ends
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlottingConfig {
    pub y_axis_limit: f64,
    /// 0 lets the front end choose
    pub x_axis_limit: f64,
}

impl Default for PlottingConfig {
    fn default() -> Self {
        Self {
            y_axis_limit: 1.0,
            x_axis_limit: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no debug flags are given (trace, debug, info, warn, error)
    pub level: String,
    /// `[logging.file]`; absent means console only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Per-run log folders (needs the `file-logging` feature of the binary)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileLogConfig {
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config: TouchstatsConfig = toml::from_str("").unwrap();
        assert_eq!(config, TouchstatsConfig::default());
        assert_eq!(config.analysis.n_bins, 30);
        assert_eq!(config.archive.extension, "json");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: TouchstatsConfig =
            toml::from_str("[analysis]\ntrq_sensor_no = 2\n\n[plotting]\nx_axis_limit = 0.05\n")
                .unwrap();
        assert_eq!(config.analysis.trq_sensor_no, 2);
        assert_eq!(config.analysis.n_bins, 30);
        assert_eq!(config.plotting.x_axis_limit, 0.05);
        assert_eq!(config.plotting.y_axis_limit, 1.0);
    }

    #[test]
    fn test_file_logging_section() {
        let config: TouchstatsConfig =
            toml::from_str("[logging]\nlevel = \"debug\"\n\n[logging.file]\nretention_runs = 3\n")
                .unwrap();
        let file = config.logging.file.unwrap();
        assert_eq!(file.retention_runs, 3);
        assert_eq!(file.retention_days, 30);
        assert_eq!(file.log_dir, PathBuf::from("./logs"));

        let config: TouchstatsConfig = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_serializes_by_section() {
        let json = serde_json::to_value(TouchstatsConfig::default()).unwrap();
        assert_eq!(json["analysis"]["n_bins"], 30);
        assert_eq!(json["logging"]["level"], "info");
    }
}
