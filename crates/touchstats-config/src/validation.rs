// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! All problems are collected and reported together in one
//! `ConfigError::ValidationError`.

use crate::{ConfigError, ConfigResult, TouchstatsConfig};

/// Highest sensor number in a multi-sensor archive
pub const MAX_TRQ_SENSOR_NO: usize = 2;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &TouchstatsConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &TouchstatsConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.archive.extension.trim_start_matches('.').is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "archive.extension".to_string(),
        });
    }
    if config.archive.data_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "archive.data_dir".to_string(),
        });
    }
    if let Some(file) = &config.logging.file {
        if file.log_dir.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "logging.file.log_dir".to_string(),
            });
        }
    }
}

fn validate_value_ranges(config: &TouchstatsConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.analysis.n_bins == 0 {
        errors.push(invalid("analysis.n_bins", "must be at least 1"));
    }
    if config.analysis.trq_sensor_no > MAX_TRQ_SENSOR_NO {
        errors.push(invalid(
            "analysis.trq_sensor_no",
            format!(
                "{} is out of range (0-{})",
                config.analysis.trq_sensor_no, MAX_TRQ_SENSOR_NO
            ),
        ));
    }
    for (field, limit) in [
        ("plotting.y_axis_limit", config.plotting.y_axis_limit),
        ("plotting.x_axis_limit", config.plotting.x_axis_limit),
    ] {
        if !limit.is_finite() || limit < 0.0 {
            errors.push(invalid(field, format!("{} must be a non-negative number", limit)));
        }
    }
    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(invalid(
            "logging.level",
            format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        ));
    }
    if let Some(file) = &config.logging.file {
        if file.retention_runs == 0 {
            errors.push(invalid(
                "logging.file.retention_runs",
                "must keep at least the current run",
            ));
        }
    }
}
