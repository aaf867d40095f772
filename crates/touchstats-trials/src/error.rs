// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for trial loading and comparison

use std::path::PathBuf;

use touchstats_spike::SpikeStatsError;

/// Result type for trial operations
pub type TrialResult<T> = Result<T, TrialError>;

/// Trial loading and comparison errors.
///
/// Any of these aborts the whole comparison; no partial aggregate is returned.
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    #[error("archive directory not found: {0}")]
    MissingArchiveDirectory(PathBuf),

    #[error("no matching archive files found in {0}")]
    EmptyArchiveDirectory(PathBuf),

    #[error("trial {file_name} not found under {data_dir}")]
    MissingTrial { data_dir: PathBuf, file_name: String },

    #[error("failed to read archive {path}: {source}")]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse archive {path}: {message}")]
    ArchiveParse { path: PathBuf, message: String },

    #[error("sensor #{sensor_no} requested but {path} only has {available} sensor(s)")]
    SensorOutOfRange {
        path: PathBuf,
        sensor_no: usize,
        available: usize,
    },

    #[error("failed to compute statistics for {path}: {source}")]
    TrialStats {
        path: PathBuf,
        #[source]
        source: SpikeStatsError,
    },

    #[error(transparent)]
    Stats(#[from] SpikeStatsError),
}
