// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-neuron ISI statistics and afferent classification

use tracing::{debug, warn};

use crate::afferent::AfferentStats;
use crate::error::{SpikeStatsError, StatsResult};
use crate::raster::SpikeRaster;
use crate::record::{NeuronMetadata, SensorRecord};

/// Consecutive differences of the first `neuron_fire_count` spike times.
///
/// Yields `neuron_fire_count - 1` deltas, or none when fewer than two spikes.
pub fn calculate_spike_deltas(neuron_fire_count: usize, spike_times: &[f64]) -> Vec<f64> {
    let used = neuron_fire_count.min(spike_times.len());
    spike_times[..used]
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect()
}

/// Arithmetic mean of the deltas, zero-filled when there are none
pub fn mean_isi(spike_deltas: &[f64]) -> f64 {
    if spike_deltas.is_empty() {
        0.0
    } else {
        spike_deltas.iter().sum::<f64>() / spike_deltas.len() as f64
    }
}

/// Classify every neuron of a raster and compute its firing statistics.
///
/// `metadata` must have one entry per raster row. Neurons with no afferent
/// flag are left out of all populations and listed in
/// [`AfferentStats::unclassified`].
pub fn compute_afferent_stats(
    raster: &SpikeRaster,
    metadata: &[NeuronMetadata],
    sensor_no: usize,
) -> StatsResult<AfferentStats> {
    let neuron_total = raster.neuron_count();
    if metadata.len() != neuron_total {
        return Err(SpikeStatsError::RecordShapeMismatch {
            field: "afferents",
            expected: neuron_total,
            actual: metadata.len(),
        });
    }

    let mut stats = AfferentStats::new(sensor_no, neuron_total);

    for (neuron_id, meta) in metadata.iter().enumerate() {
        let spike_times = raster.spike_times(neuron_id);
        let fire_count = spike_times.len();
        let deltas = calculate_spike_deltas(fire_count, &spike_times);
        let average_isi = mean_isi(&deltas);

        if meta.flag_count() > 1 {
            debug!(
                "[SPIKE-STATS] Neuron {} on sensor #{} has {} afferent flags set, using {:?}",
                neuron_id,
                sensor_no,
                meta.flag_count(),
                meta.afferent_type()
            );
        }

        match meta.afferent_type() {
            Some(afferent_type) => {
                stats.population_mut(afferent_type).insert(
                    neuron_id,
                    fire_count,
                    average_isi,
                    deltas,
                    meta.location,
                );
            }
            None => {
                warn!(
                    "[SPIKE-STATS] Neuron {} on sensor #{} matches no SA/RA/PC flag, excluding it",
                    neuron_id, sensor_no
                );
                stats.mark_unclassified(neuron_id);
            }
        }
    }

    let [sa, ra, pc] = stats.neuron_counts();
    debug!(
        "[SPIKE-STATS] Sensor #{}: {} neurons (sa={}, ra={}, pc={}, unclassified={})",
        sensor_no,
        neuron_total,
        sa,
        ra,
        pc,
        stats.unclassified().len()
    );

    Ok(stats)
}

/// Raster a sensor record and reduce it to [`AfferentStats`].
///
/// The raster only lives for the duration of this call.
pub fn sensor_stats(record: &SensorRecord, sensor_no: usize) -> StatsResult<AfferentStats> {
    let raster = SpikeRaster::from_record(record)?;
    compute_afferent_stats(&raster, &record.afferents, sensor_no)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::afferent::{AfferentType, Location, PopulationMember};
    use crate::record::SpikeTimes;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_calculate_spike_deltas() {
        assert_close(&calculate_spike_deltas(3, &[0.1, 0.15, 0.4]), &[0.05, 0.25]);
        assert!(calculate_spike_deltas(1, &[0.1]).is_empty());
        assert!(calculate_spike_deltas(0, &[]).is_empty());
    }

    #[test]
    fn test_mean_isi_zero_fill() {
        assert_eq!(mean_isi(&[]), 0.0);
        assert!((mean_isi(&[0.1, 0.3]) - 0.2).abs() < 1e-12);
    }

    fn record() -> SensorRecord {
        SensorRecord {
            duration: 0.01,
            rate: vec![3.0, 1.0, 0.0, 2.0, 5.0],
            spikes: vec![
                vec![0.001, 0.002, 0.004].into(),
                SpikeTimes::Single(0.005),
                SpikeTimes::default(),
                vec![0.003, 0.008].into(),
                vec![0.0001, 0.0002].into(),
            ],
            afferents: vec![
                NeuronMetadata::new(AfferentType::Sa, Location::new(1.0, 0.0)),
                NeuronMetadata::new(AfferentType::Ra, Location::new(0.0, 2.0)),
                NeuronMetadata::new(AfferentType::Sa, Location::new(3.0, 4.0)),
                NeuronMetadata::new(AfferentType::Pc, Location::new(-1.0, 0.0)),
                NeuronMetadata::default(),
            ],
        }
    }

    #[test]
    fn test_populations_from_record() {
        let stats = sensor_stats(&record(), 0).unwrap();

        let sa = stats.population(AfferentType::Sa);
        assert_eq!(sa.id_range, vec![0, 2]);
        assert_eq!(sa.fire_count[&0], 3);
        assert_eq!(sa.fire_count[&2], 0);
        assert_close(sa.deltas(0).unwrap(), &[0.001, 0.002]);
        assert!((sa.isi[&0] - 0.0015).abs() < 1e-12);
        assert_eq!(sa.isi[&2], 0.0);
        assert_eq!(sa.spike_deltas[2], PopulationMember::InPopulation(Vec::new()));
        assert_eq!(sa.spike_deltas[1], PopulationMember::NotInPopulation);
        assert_eq!(sa.locations[2], Location::new(3.0, 4.0));

        let ra = stats.population(AfferentType::Ra);
        assert_eq!(ra.id_range, vec![1]);
        assert_eq!(ra.fire_count[&1], 1);
        assert_eq!(ra.isi[&1], 0.0);

        let pc = stats.population(AfferentType::Pc);
        assert_eq!(pc.id_range, vec![3]);
        assert_close(pc.deltas(3).unwrap(), &[0.005]);
    }

    #[test]
    fn test_unclassified_neuron_is_observable() {
        let stats = sensor_stats(&record(), 2).unwrap();
        assert_eq!(stats.sensor_no(), 2);
        assert_eq!(stats.unclassified(), &[4]);
        assert_eq!(stats.neuron_counts(), [2, 1, 1]);
        assert_eq!(stats.neuron_counts().iter().sum::<usize>() + 1, stats.neuron_total());
        assert_eq!(stats.afferent_type_of(4), None);
    }

    #[test]
    fn test_key_sets_agree() {
        let stats = sensor_stats(&record(), 0).unwrap();
        for afferent_type in AfferentType::ALL {
            let population = stats.population(afferent_type);
            assert_eq!(population.isi.len(), population.neuron_count());
            assert_eq!(population.fire_count.len(), population.neuron_count());
            for id in &population.id_range {
                assert!(population.isi.contains_key(id));
                assert!(population.fire_count.contains_key(id));
            }
        }
    }

    #[test]
    fn test_metadata_length_must_match_raster() {
        let raster = SpikeRaster::build(&[SpikeTimes::default()], &[0.0], 0.01).unwrap();
        let err = compute_afferent_stats(&raster, &[], 0).unwrap_err();
        assert!(matches!(err, SpikeStatsError::RecordShapeMismatch { field: "afferents", .. }));
    }
}
