// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense spike raster construction
//!
//! Sparse per-neuron timestamps become a `neurons x bins` binary matrix at a
//! fixed resolution of 1/10000 s. Timestamps are assumed to carry at most four
//! decimal places.

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{SpikeStatsError, StatsResult};
use crate::record::{SensorRecord, SpikeTimes};

/// Raster bins per second
pub const SPIKE_TIMESTAMP_RESOLUTION: f64 = 1e4;

/// Extra columns past the trial duration to absorb rounding at the boundary
pub const RASTER_MARGIN_BINS: usize = 10;

/// Longest trial a raster is built for, in seconds
pub const MAX_TRIAL_DURATION: f64 = 3600.0;

/// Number of raster columns for a trial of `duration` seconds.
///
/// Negative, non-finite or longer than [`MAX_TRIAL_DURATION`] durations are
/// rejected with [`SpikeStatsError::InvalidDuration`].
pub fn raster_columns(duration: f64) -> StatsResult<usize> {
    if !duration.is_finite() || !(0.0..=MAX_TRIAL_DURATION).contains(&duration) {
        return Err(SpikeStatsError::InvalidDuration(duration));
    }
    let bins = (duration * SPIKE_TIMESTAMP_RESOLUTION).ceil() as usize;
    bins.checked_add(RASTER_MARGIN_BINS)
        .ok_or(SpikeStatsError::InvalidDuration(duration))
}

/// Bin index of a timestamp, before bounds checking
pub fn timestamp_to_bin(timestamp: f64) -> i64 {
    (timestamp * SPIKE_TIMESTAMP_RESOLUTION).round() as i64
}

/// Binary spike matrix: rows are neurons, columns are time bins
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeRaster {
    spikes: Array2<u8>,
}

impl SpikeRaster {
    /// Build the raster for one sensor.
    ///
    /// Neurons with a zero rate are skipped entirely. A spike whose bin falls
    /// outside the raster is reported as [`SpikeStatsError::SpikeOutOfBounds`]
    /// rather than clamped.
    pub fn build(spikes: &[SpikeTimes], rates: &[f64], duration: f64) -> StatsResult<Self> {
        if rates.len() != spikes.len() {
            return Err(SpikeStatsError::RecordShapeMismatch {
                field: "rate",
                expected: spikes.len(),
                actual: rates.len(),
            });
        }
        let columns = raster_columns(duration)?;
        let mut raster = Array2::<u8>::zeros((spikes.len(), columns));

        for (neuron_id, (times, rate)) in spikes.iter().zip(rates).enumerate() {
            if *rate == 0.0 {
                continue;
            }
            for &timestamp in times.as_slice() {
                if !timestamp.is_finite() || timestamp < 0.0 {
                    return Err(SpikeStatsError::InvalidTimestamp {
                        neuron_id,
                        timestamp,
                    });
                }
                let bin = timestamp_to_bin(timestamp);
                if bin < 0 || bin as usize >= columns {
                    return Err(SpikeStatsError::SpikeOutOfBounds {
                        neuron_id,
                        bin,
                        columns,
                    });
                }
                raster[[neuron_id, bin as usize]] = 1;
            }
        }

        Ok(Self { spikes: raster })
    }

    /// Validate the record and build its raster
    pub fn from_record(record: &SensorRecord) -> StatsResult<Self> {
        record.validate()?;
        Self::build(&record.spikes, &record.rate, record.duration)
    }

    pub fn neuron_count(&self) -> usize {
        self.spikes.nrows()
    }

    pub fn columns(&self) -> usize {
        self.spikes.ncols()
    }

    pub fn row(&self, neuron_id: usize) -> ArrayView1<'_, u8> {
        self.spikes.index_axis(Axis(0), neuron_id)
    }

    /// Bins in which `neuron_id` spiked, ascending
    pub fn spike_bins(&self, neuron_id: usize) -> Vec<usize> {
        self.row(neuron_id)
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != 0)
            .map(|(bin, _)| bin)
            .collect()
    }

    /// Spike times (seconds) recovered from the bins, ascending
    pub fn spike_times(&self, neuron_id: usize) -> Vec<f64> {
        self.spike_bins(neuron_id)
            .into_iter()
            .map(|bin| bin as f64 / SPIKE_TIMESTAMP_RESOLUTION)
            .collect()
    }

    /// Total number of set cells
    pub fn spike_total(&self) -> usize {
        self.spikes.iter().filter(|cell| **cell != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_spikes_land_in_bins_one_and_two() {
        let raster = SpikeRaster::build(&[vec![0.0001, 0.0002].into()], &[1.0], 0.001).unwrap();

        assert!(raster.columns() >= 20);
        assert_eq!(raster.spike_total(), 2);
        assert_eq!(raster.spike_bins(0), vec![1, 2]);
    }

    #[test]
    fn test_scalar_timestamp() {
        let raster = SpikeRaster::build(&[SpikeTimes::Single(0.0005)], &[3.0], 0.001).unwrap();
        assert_eq!(raster.spike_bins(0), vec![5]);
    }

    #[test]
    fn test_zero_rate_row_stays_empty() {
        let spikes = vec![vec![0.0003].into(), vec![0.0004].into()];
        let raster = SpikeRaster::build(&spikes, &[0.0, 2.0], 0.001).unwrap();
        assert!(raster.spike_bins(0).is_empty());
        assert_eq!(raster.spike_bins(1), vec![4]);
    }

    #[test]
    fn test_rounding_not_truncation() {
        // 0.0003 * 1e4 is 2.9999999999999996 in binary floating point
        let raster = SpikeRaster::build(&[vec![0.0003].into()], &[1.0], 0.001).unwrap();
        assert_eq!(raster.spike_bins(0), vec![3]);
    }

    #[test]
    fn test_out_of_bounds_spike_is_rejected() {
        let err = SpikeRaster::build(&[vec![0.5].into()], &[1.0], 0.001).unwrap_err();
        assert_eq!(
            err,
            SpikeStatsError::SpikeOutOfBounds {
                neuron_id: 0,
                bin: 5000,
                columns: 20
            }
        );
    }

    #[test]
    fn test_column_count() {
        assert_eq!(raster_columns(0.001), Ok(20));
        assert_eq!(raster_columns(0.0), Ok(RASTER_MARGIN_BINS));
        assert_eq!(
            raster_columns(MAX_TRIAL_DURATION),
            Ok(36_000_000 + RASTER_MARGIN_BINS)
        );
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        for duration in [1e300, MAX_TRIAL_DURATION + 1.0, f64::INFINITY, f64::NAN, -1.0] {
            assert!(matches!(
                raster_columns(duration),
                Err(SpikeStatsError::InvalidDuration(_))
            ));
        }

        let record = SensorRecord {
            duration: 1e300,
            rate: vec![1.0],
            spikes: vec![vec![0.001].into()],
            afferents: vec![Default::default()],
        };
        assert!(matches!(
            record.validate(),
            Err(SpikeStatsError::InvalidDuration(_))
        ));
        assert!(matches!(
            SpikeRaster::from_record(&record),
            Err(SpikeStatsError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_spike_inside_margin_is_kept() {
        let raster = SpikeRaster::build(&[vec![0.0015].into()], &[1.0], 0.001).unwrap();
        assert_eq!(raster.spike_bins(0), vec![15]);
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let err = SpikeRaster::build(&[vec![-0.1].into()], &[1.0], 0.001).unwrap_err();
        assert!(matches!(err, SpikeStatsError::InvalidTimestamp { neuron_id: 0, .. }));
    }
}
