// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory shape of one sensor of a simulated touch trial
//!
//! The archive decoder lives outside this crate. Whatever produces a
//! [`SensorRecord`] only has to fill these fields; the statistics engine never
//! looks at the on-disk encoding.

use serde::{Deserialize, Deserializer, Serialize};

use crate::afferent::{AfferentType, Location};
use crate::error::{SpikeStatsError, StatsResult};

/// Spike timestamps (seconds) of a single neuron.
///
/// The simulator collapses one-spike responses into a bare scalar, so both
/// forms are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpikeTimes {
    Single(f64),
    Many(Vec<f64>),
}

impl SpikeTimes {
    /// View the timestamps as a sequence, wrapping the scalar form
    pub fn as_slice(&self) -> &[f64] {
        match self {
            SpikeTimes::Single(t) => std::slice::from_ref(t),
            SpikeTimes::Many(times) => times,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl Default for SpikeTimes {
    fn default() -> Self {
        SpikeTimes::Many(Vec::new())
    }
}

impl From<Vec<f64>> for SpikeTimes {
    fn from(times: Vec<f64>) -> Self {
        SpikeTimes::Many(times)
    }
}

/// Per-neuron metadata carried by the afferent population
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NeuronMetadata {
    /// Slowly adapting (type 1) flag
    #[serde(rename = "iSA1", default, deserialize_with = "deserialize_flag")]
    pub is_sa: bool,

    /// Rapidly adapting flag
    #[serde(rename = "iRA", default, deserialize_with = "deserialize_flag")]
    pub is_ra: bool,

    /// Pacinian flag
    #[serde(rename = "iPC", default, deserialize_with = "deserialize_flag")]
    pub is_pc: bool,

    /// Position on the hand surface
    #[serde(default)]
    pub location: Location,
}

impl NeuronMetadata {
    pub fn new(afferent_type: AfferentType, location: Location) -> Self {
        Self {
            is_sa: afferent_type == AfferentType::Sa,
            is_ra: afferent_type == AfferentType::Ra,
            is_pc: afferent_type == AfferentType::Pc,
            location,
        }
    }

    /// Classify by flag, testing SA, then RA, then PC.
    ///
    /// Returns `None` when no flag is set.
    pub fn afferent_type(&self) -> Option<AfferentType> {
        AfferentType::ALL
            .into_iter()
            .find(|afferent_type| self.flag(*afferent_type))
    }

    pub fn flag(&self, afferent_type: AfferentType) -> bool {
        match afferent_type {
            AfferentType::Sa => self.is_sa,
            AfferentType::Ra => self.is_ra,
            AfferentType::Pc => self.is_pc,
        }
    }

    /// Number of flags set; anything other than 1 is a malformed population
    pub fn flag_count(&self) -> usize {
        AfferentType::ALL
            .into_iter()
            .filter(|afferent_type| self.flag(*afferent_type))
            .count()
    }
}

/// One sensor's worth of simulator output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Trial duration in seconds
    pub duration: f64,

    /// Firing rate per neuron; zero iff the neuron never fired
    #[serde(alias = "rates")]
    pub rate: Vec<f64>,

    /// Spike timestamps per neuron
    pub spikes: Vec<SpikeTimes>,

    /// Afferent metadata per neuron
    pub afferents: Vec<NeuronMetadata>,
}

impl SensorRecord {
    pub fn neuron_count(&self) -> usize {
        self.afferents.len()
    }

    /// Check that every per-neuron array has one entry per afferent
    pub fn validate(&self) -> StatsResult<()> {
        let expected = self.afferents.len();
        if self.rate.len() != expected {
            return Err(SpikeStatsError::RecordShapeMismatch {
                field: "rate",
                expected,
                actual: self.rate.len(),
            });
        }
        if self.spikes.len() != expected {
            return Err(SpikeStatsError::RecordShapeMismatch {
                field: "spikes",
                expected,
                actual: self.spikes.len(),
            });
        }
        crate::raster::raster_columns(self.duration)?;
        Ok(())
    }
}

/// Accept `true`/`false` as well as the numeric 0/1 flags the simulator exports
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value == 1.0,
    })
}
