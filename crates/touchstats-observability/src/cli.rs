// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-touchstats-spike` and `--debug-all`.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to debug (comma-separated, or `all`)
pub const DEBUG_ENV_VAR: &str = "TOUCHSTATS_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use touchstats_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(std::env::args());
/// if flags.is_enabled("touchstats-trials") {
///     // debug logging for archive loading
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Looks for `--debug-{crate-name}` arguments; `--debug-all` enables
    /// every known crate
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }
            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Merge a `TOUCHSTATS_DEBUG` style value: `all` or comma-separated names
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            self.enable(crate_name);
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    pub fn enabled_crates(&self) -> Vec<&String> {
        self.enabled_crates.keys().collect()
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` if enabled, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives with `info` as the default level
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }

    /// `EnvFilter` directives, e.g. `touchstats_spike=debug,warn`.
    ///
    /// Tracing targets are module paths, so crate names are written with
    /// underscores.
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        let mut crate_names: Vec<&String> = self.enabled_crates.keys().collect();
        crate_names.sort();

        let mut filters: Vec<String> = crate_names
            .into_iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `TOUCHSTATS_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        flags.merge_env_value(&value);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {var}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {var}=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", "),
        var = DEBUG_ENV_VAR
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-touchstats-spike".to_string()]);
        assert!(flags.is_enabled("touchstats-spike"));
        assert!(!flags.is_enabled("touchstats-trials"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_env_value() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(" touchstats-trials , ,touchstats-config");
        assert!(flags.is_enabled("touchstats-trials"));
        assert!(flags.is_enabled("touchstats-config"));
        assert_eq!(flags.enabled_crates().len(), 2);
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-touchstats-trials".to_string(),
            "--debug-touchstats-spike".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string_with_default("warn"),
            "touchstats_spike=debug,touchstats_trials=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string(), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-touchstats-spike".to_string()]);
        assert_eq!(flags.log_level("touchstats-spike"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("touchstats-trials"), tracing::Level::INFO);
    }
}
