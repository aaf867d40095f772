// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # touchstats-observability
//!
//! Logging setup shared by the touchstats tools, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: per-run log folders with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known touchstats crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "touchstats-spike",
    "touchstats-trials",
    "touchstats-config",
    "touchstats-compare",
];

/// Observability errors
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}
