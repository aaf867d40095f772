// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Touchstats Trials
//!
//! Archive-facing half of touchstats: decodes trial archives, selects trials
//! by file-name tokens, reduces each trial to per-afferent statistics and
//! compares the resulting ISI or distance distributions.
//!
//! ```no_run
//! use std::path::Path;
//! use touchstats_trials::{Comparator, ComparisonOptions, JsonArchiveLoader};
//! use touchstats_spike::AfferentType;
//!
//! # fn main() -> Result<(), touchstats_trials::TrialError> {
//! let loader = JsonArchiveLoader::new();
//! let comparator = Comparator::new(&loader, ComparisonOptions::default());
//! let comparison = comparator.compare_afferent(
//!     Path::new("data/noise_0"),
//!     &[],
//!     AfferentType::Sa,
//!     AfferentType::Pc,
//! )?;
//! println!("{} vs {}: {}", comparison.left.label, comparison.right.label, comparison.divergence);
//! # Ok(())
//! # }
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod archive;
pub mod collect;
pub mod compare;
pub mod error;
pub mod select;

pub use archive::{ArchiveLoader, JsonArchiveLoader, SensorLayout, MULTI_SENSOR_COUNT, MULTI_SENSOR_MARKER};
pub use collect::{collect_trial_stats, TrialStats};
pub use compare::{compare_sides, Comparator, Comparison, ComparisonOptions, ComparisonSide};
pub use error::{TrialError, TrialResult};
pub use select::{select_trials, NoiseLevel, TrialFilter, TrialSelection};
