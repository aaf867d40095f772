// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for spike statistics operations

use crate::afferent::AfferentType;

/// Result type for spike statistics operations
pub type StatsResult<T> = Result<T, SpikeStatsError>;

/// Errors raised by the raster, statistics, aggregation and divergence stages.
///
/// Neurons that match no afferent flag are not an error: they are recorded in
/// [`crate::AfferentStats::unclassified`] and logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpikeStatsError {
    #[error(
        "cannot aggregate by both neuron_id={neuron_id} and afferent_type={afferent_type}; \
         expecting at least one to be unset"
    )]
    InvalidSelection {
        neuron_id: usize,
        afferent_type: AfferentType,
    },

    #[error("neuron {neuron_id} does not belong to any SA, RA or PC population (sensor #{sensor_no})")]
    NeuronNotClassified { neuron_id: usize, sensor_no: usize },

    #[error("distribution is empty: every histogram bin normalised to NaN")]
    EmptyDistribution,

    #[error("distribution shape mismatch: {left} bins vs {right} bins")]
    DistributionShapeMismatch { left: usize, right: usize },

    #[error("invalid bin specification: {0}")]
    InvalidBinSpec(String),

    #[error("spike of neuron {neuron_id} lands in bin {bin}, raster only has {columns} columns")]
    SpikeOutOfBounds {
        neuron_id: usize,
        bin: i64,
        columns: usize,
    },

    #[error("invalid trial duration: {0}")]
    InvalidDuration(f64),

    #[error("invalid spike timestamp {timestamp} for neuron {neuron_id}")]
    InvalidTimestamp { neuron_id: usize, timestamp: f64 },

    #[error("sensor record shape mismatch: {field} has {actual} entries, expected {expected}")]
    RecordShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
