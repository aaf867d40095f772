// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers winning:
//! 1. TOML file (base values)
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, TouchstatsConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the touchstats configuration file
///
/// Search order:
/// 1. `TOUCHSTATS_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("TOUCHSTATS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by TOUCHSTATS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet TOUCHSTATS_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// * `config_path` - Optional path to config file. If `None`, will search for one.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<TouchstatsConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: TouchstatsConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `TOUCHSTATS_DATA_DIR` -> `archive.data_dir`
/// - `TOUCHSTATS_ARCHIVE_EXTENSION` -> `archive.extension`
/// - `TOUCHSTATS_N_BINS` -> `analysis.n_bins`
/// - `TOUCHSTATS_TRQ_SENSOR` -> `analysis.trq_sensor_no`
/// - `TOUCHSTATS_LOG_LEVEL` -> `logging.level`
/// - `TOUCHSTATS_LOG_DIR` -> `logging.file.log_dir` (enables the section)
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut TouchstatsConfig) {
    if let Ok(value) = env::var("TOUCHSTATS_DATA_DIR") {
        config.archive.data_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("TOUCHSTATS_ARCHIVE_EXTENSION") {
        config.archive.extension = value;
    }
    if let Ok(value) = env::var("TOUCHSTATS_N_BINS") {
        if let Ok(n_bins) = value.parse::<usize>() {
            config.analysis.n_bins = n_bins;
        }
    }
    if let Ok(value) = env::var("TOUCHSTATS_TRQ_SENSOR") {
        if let Ok(sensor_no) = value.parse::<usize>() {
            config.analysis.trq_sensor_no = sensor_no;
        }
    }
    if let Ok(value) = env::var("TOUCHSTATS_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("TOUCHSTATS_LOG_DIR") {
        config.logging.file.get_or_insert_with(Default::default).log_dir = PathBuf::from(value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// * `cli_args` - e.g. `{"n_bins": "40", "data_dir": "/data/noise_0"}`
pub fn apply_cli_overrides(config: &mut TouchstatsConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("data_dir") {
        config.archive.data_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("n_bins") {
        if let Ok(n_bins) = value.parse::<usize>() {
            config.analysis.n_bins = n_bins;
        }
    }
    if let Some(value) = cli_args.get("trq_sensor_no") {
        if let Ok(sensor_no) = value.parse::<usize>() {
            config.analysis.trq_sensor_no = sensor_no;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
