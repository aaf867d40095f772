// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial archive decoding
//!
//! One archive file holds one trial. Files produced by the multi-sensor
//! simulator (`trq` in the file name) carry an array of three sensor
//! records; single-sensor files carry one record. The decoder behind
//! [`ArchiveLoader`] is swappable so that other container formats can be
//! plugged in without touching the statistics pipeline.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use touchstats_spike::SensorRecord;

use crate::error::{TrialError, TrialResult};

/// File name marker of multi-sensor trial archives
pub const MULTI_SENSOR_MARKER: &str = "trq";

/// Sensors carried by a multi-sensor archive
pub const MULTI_SENSOR_COUNT: usize = 3;

/// Sensor arrangement of an archive, inferred from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorLayout {
    /// Three sensors, selected by sensor number
    MultiSensor,
    /// Exactly one sensor, always index 0
    SingleSensor,
}

impl SensorLayout {
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.contains(MULTI_SENSOR_MARKER) {
            SensorLayout::MultiSensor
        } else {
            SensorLayout::SingleSensor
        }
    }

    /// Index of the record to analyse for a requested multi-sensor number
    pub fn sensor_index(&self, trq_sensor_no: usize) -> usize {
        match self {
            SensorLayout::MultiSensor => trq_sensor_no,
            SensorLayout::SingleSensor => 0,
        }
    }

    /// Suffix appended to sample labels
    pub fn label_suffix(&self, trq_sensor_no: usize) -> String {
        match self {
            SensorLayout::MultiSensor => format!(" | (sensor #{})", trq_sensor_no),
            SensorLayout::SingleSensor => String::new(),
        }
    }
}

/// Decodes one trial archive into its sensor records
pub trait ArchiveLoader: Send + Sync {
    /// File extension (without the dot) of archives this loader reads
    fn extension(&self) -> &str;

    fn load(&self, path: &Path) -> TrialResult<Vec<SensorRecord>>;

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArchiveDocument {
    Sensors(Vec<SensorRecord>),
    Single(SensorRecord),
}

/// Reads trial archives stored as JSON
#[derive(Debug, Clone)]
pub struct JsonArchiveLoader {
    extension: String,
}

impl JsonArchiveLoader {
    pub fn new() -> Self {
        Self::with_extension("json")
    }

    pub fn with_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Decode an archive held in memory
    pub fn parse(&self, path: &Path, contents: &str) -> TrialResult<Vec<SensorRecord>> {
        let document: ArchiveDocument =
            serde_json::from_str(contents).map_err(|e| TrialError::ArchiveParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let records = match document {
            ArchiveDocument::Sensors(records) => records,
            ArchiveDocument::Single(record) => vec![record],
        };

        for record in &records {
            record.validate().map_err(|source| TrialError::TrialStats {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(records)
    }
}

impl Default for JsonArchiveLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveLoader for JsonArchiveLoader {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, path: &Path) -> TrialResult<Vec<SensorRecord>> {
        let contents = fs::read_to_string(path).map_err(|source| TrialError::ArchiveIo {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &contents)
    }
}
