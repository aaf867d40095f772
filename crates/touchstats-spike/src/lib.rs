// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Touchstats Spike Statistics
//!
//! Inter-spike-interval statistics for simulated tactile afferents:
//!
//! ```text
//! SensorRecord ──► SpikeRaster ──► AfferentStats ──► AggregatedSample
//!                                                          │
//!            divergence score ◄── EmpiricalDistribution ◄──┘
//! ```
//!
//! - **record**: consumed shape of one sensor (timestamps, rates, metadata)
//! - **raster**: dense neuron x time binary matrix at 1/10000 s
//! - **stats**: per-neuron ISI, fire counts and SA/RA/PC classification
//! - **aggregate**: multi-trial sample aggregation (afferent / neuron / general)
//! - **distribution**: normalised histograms
//! - **divergence**: symmetrised KL divergence
//!
//! Everything here is pure and synchronous; archive I/O lives in
//! `touchstats-trials`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod afferent;
pub mod aggregate;
pub mod distribution;
pub mod divergence;
pub mod error;
pub mod raster;
pub mod record;
pub mod stats;

pub use afferent::{AfferentPopulation, AfferentStats, AfferentType, Location, PopulationMember};
pub use aggregate::{aggregate_by_options, aggregate_trials, AggregatedSample, SampleMetric, Selection};
pub use distribution::{
    histogram, probability_distribution, BinSpec, EmpiricalDistribution, Histogram,
    DEFAULT_FALLBACK_BINS,
};
pub use divergence::{kl_divergence, symmetric_kl_divergence, PROBABILITY_FLOOR};
pub use error::{SpikeStatsError, StatsResult};
pub use raster::{
    raster_columns, SpikeRaster, MAX_TRIAL_DURATION, RASTER_MARGIN_BINS, SPIKE_TIMESTAMP_RESOLUTION,
};
pub use record::{NeuronMetadata, SensorRecord, SpikeTimes};
pub use stats::{calculate_spike_deltas, compute_afferent_stats, mean_isi, sensor_stats};
