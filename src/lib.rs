// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # touchstats
//!
//! Inter-spike-interval statistics for simulated tactile afferents (SA, RA
//! and PC populations), and symmetrised KL divergence between the resulting
//! distributions across trials, stimuli, noise levels and neuron locations.
//!
//! ## Feature Flags
//!
//! - **`full`** (default): everything below
//! - **`trials`**: archive loading, trial selection, comparisons
//! - **`config`**: `touchstats.toml` loader
//! - **`observability`**: logging setup and debug flags
//! - **`cli`**: the `touchstats-compare` binary
//! - **`file-logging`**: per-run log folders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use touchstats::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let loader = touchstats::archive_loader(&config);
//! let comparator = Comparator::new(&loader, touchstats::comparison_options(&config));
//!
//! let comparison = comparator.compare_afferent(
//!     &config.archive.data_dir,
//!     &[],
//!     AfferentType::Sa,
//!     AfferentType::Ra,
//! )?;
//! println!("KL divergence: {}", comparison.divergence);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  touchstats-spike                                       │
//! │  (raster, ISI stats, aggregation, distributions, KL)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  touchstats-trials                                      │
//! │  (archives, trial selection, comparisons)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  touchstats-compare                                     │
//! │  (CLI: config + logging + comparisons)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use touchstats_spike as spike;

#[cfg(feature = "trials")]
pub use touchstats_trials as trials;

#[cfg(feature = "config")]
pub use touchstats_config as config;

#[cfg(feature = "observability")]
pub use touchstats_observability as observability;

/// Comparison options from the `[analysis]` and `[plotting]` sections
#[cfg(all(feature = "trials", feature = "config"))]
pub fn comparison_options(config: &config::TouchstatsConfig) -> trials::ComparisonOptions {
    trials::ComparisonOptions {
        bins: spike::BinSpec::Count(config.analysis.n_bins),
        trq_sensor_no: config.analysis.trq_sensor_no,
        y_axis_limit: config.plotting.y_axis_limit,
        x_axis_limit: config.plotting.x_axis_limit,
    }
}

/// JSON archive loader for the configured extension
#[cfg(all(feature = "trials", feature = "config"))]
pub fn archive_loader(config: &config::TouchstatsConfig) -> trials::JsonArchiveLoader {
    trials::JsonArchiveLoader::with_extension(config.archive.extension.as_str())
}

/// Logger settings from the `[logging]` section, including `[logging.file]`
#[cfg(all(feature = "config", feature = "observability"))]
pub fn logging_config(config: &config::TouchstatsConfig) -> observability::LoggingConfig {
    observability::LoggingConfig {
        file: config
            .logging
            .file
            .as_ref()
            .map(|file| observability::FileLoggingConfig {
                log_dir: file.log_dir.clone(),
                retention_days: file.retention_days,
                retention_runs: file.retention_runs,
            }),
        ..observability::LoggingConfig::with_level(config.logging.level.as_str())
    }
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::spike::{
        aggregate_trials, probability_distribution, sensor_stats, symmetric_kl_divergence,
        AfferentStats, AfferentType, AggregatedSample, BinSpec, EmpiricalDistribution, Location,
        SampleMetric, Selection, SensorRecord, SpikeStatsError,
    };

    #[cfg(feature = "trials")]
    pub use crate::trials::{
        collect_trial_stats, select_trials, ArchiveLoader, Comparator, Comparison,
        ComparisonOptions, JsonArchiveLoader, NoiseLevel, TrialError, TrialFilter,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, TouchstatsConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags};
}
