// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multi-trial sample aggregation
//!
//! Flattens the per-trial statistics selected by a [`Selection`] into one
//! sample, either of raw inter-spike deltas or of distances from a reference
//! point. Concatenation order is deterministic (trial order, then SA, RA, PC,
//! then ascending neuron id) though nothing downstream depends on it.
//!
//! Aggregating across the sensors of one trial is not supported; callers
//! iterate sensors themselves.

use std::fmt;

use crate::afferent::{AfferentStats, AfferentType, Location};
use crate::error::{SpikeStatsError, StatsResult};

/// Which neurons contribute to a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every member of one population
    Afferent(AfferentType),
    /// A single neuron id
    Neuron(usize),
    /// Every classified neuron
    General,
}

impl Selection {
    /// Build a selection from the two optional selectors.
    ///
    /// Setting both is rejected with [`SpikeStatsError::InvalidSelection`].
    pub fn from_options(
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> StatsResult<Self> {
        match (neuron_id, afferent_type) {
            (Some(neuron_id), Some(afferent_type)) => Err(SpikeStatsError::InvalidSelection {
                neuron_id,
                afferent_type,
            }),
            (Some(neuron_id), None) => Ok(Selection::Neuron(neuron_id)),
            (None, Some(afferent_type)) => Ok(Selection::Afferent(afferent_type)),
            (None, None) => Ok(Selection::General),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Afferent(afferent_type) => write!(f, "{} neurons", afferent_type),
            Selection::Neuron(neuron_id) => write!(f, "ID = {}", neuron_id),
            Selection::General => f.write_str("All afferent types"),
        }
    }
}

/// What each selected neuron contributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleMetric {
    /// All of the neuron's inter-spike deltas
    Isi,
    /// One distance from `reference`, only if the neuron fired
    Distance { reference: Location },
}

/// Flat sample plus a label describing where it came from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedSample {
    pub values: Vec<f64>,
    pub label: String,
}

impl AggregatedSample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Aggregate `trials` under `selection`.
///
/// Fails without a partial sample if a neuron selection names a neuron that
/// is unclassified (or absent) in any trial.
pub fn aggregate_trials<'a, I>(
    trials: I,
    selection: Selection,
    metric: SampleMetric,
) -> StatsResult<AggregatedSample>
where
    I: IntoIterator<Item = &'a AfferentStats>,
{
    let mut values = Vec::new();
    for stats in trials {
        extend_from_trial(stats, selection, metric, &mut values)?;
    }

    let label = sample_label(selection, values.len());
    Ok(AggregatedSample { values, label })
}

/// Convenience wrapper that validates the optional selectors first
pub fn aggregate_by_options<'a, I>(
    trials: I,
    neuron_id: Option<usize>,
    afferent_type: Option<AfferentType>,
    metric: SampleMetric,
) -> StatsResult<AggregatedSample>
where
    I: IntoIterator<Item = &'a AfferentStats>,
{
    let selection = Selection::from_options(neuron_id, afferent_type)?;
    aggregate_trials(trials, selection, metric)
}

fn sample_label(selection: Selection, sample_size: usize) -> String {
    match selection {
        Selection::General => format!("[{} | spikes = {}]", selection, sample_size),
        _ => format!("[{}] | spikes = {}", selection, sample_size),
    }
}

/// (population, neuron id) pairs selected in one trial
fn selected_members(
    stats: &AfferentStats,
    selection: Selection,
) -> StatsResult<Vec<(AfferentType, usize)>> {
    match selection {
        Selection::Afferent(afferent_type) => Ok(stats
            .population(afferent_type)
            .id_range
            .iter()
            .map(|id| (afferent_type, *id))
            .collect()),
        Selection::Neuron(neuron_id) => stats
            .afferent_type_of(neuron_id)
            .map(|afferent_type| vec![(afferent_type, neuron_id)])
            .ok_or(SpikeStatsError::NeuronNotClassified {
                neuron_id,
                sensor_no: stats.sensor_no(),
            }),
        Selection::General => Ok(AfferentType::ALL
            .into_iter()
            .flat_map(|afferent_type| {
                stats
                    .population(afferent_type)
                    .id_range
                    .iter()
                    .map(move |id| (afferent_type, *id))
            })
            .collect()),
    }
}

fn extend_from_trial(
    stats: &AfferentStats,
    selection: Selection,
    metric: SampleMetric,
    values: &mut Vec<f64>,
) -> StatsResult<()> {
    for (afferent_type, neuron_id) in selected_members(stats, selection)? {
        let population = stats.population(afferent_type);
        match metric {
            SampleMetric::Isi => {
                if let Some(deltas) = population.deltas(neuron_id) {
                    values.extend_from_slice(deltas);
                }
            }
            SampleMetric::Distance { reference } => {
                let fired = population
                    .fire_count
                    .get(&neuron_id)
                    .is_some_and(|count| *count > 0);
                if fired {
                    values.push(population.locations[neuron_id].distance_to(&reference));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{NeuronMetadata, SensorRecord, SpikeTimes};
    use crate::stats::sensor_stats;

    fn trial(spikes: Vec<SpikeTimes>, afferents: Vec<NeuronMetadata>) -> AfferentStats {
        let rate = spikes
            .iter()
            .map(|times| if times.is_empty() { 0.0 } else { 1.0 })
            .collect();
        let record = SensorRecord {
            duration: 0.01,
            rate,
            spikes,
            afferents,
        };
        sensor_stats(&record, 0).unwrap()
    }

    fn trials() -> Vec<AfferentStats> {
        let afferents = vec![
            NeuronMetadata::new(AfferentType::Sa, Location::new(3.0, 4.0)),
            NeuronMetadata::new(AfferentType::Ra, Location::new(0.0, 1.0)),
            NeuronMetadata::new(AfferentType::Sa, Location::new(6.0, 8.0)),
            NeuronMetadata::new(AfferentType::Pc, Location::new(0.0, 2.0)),
        ];
        vec![
            trial(
                vec![
                    vec![0.001, 0.003].into(),
                    vec![0.002, 0.006, 0.007].into(),
                    SpikeTimes::default(),
                    vec![0.004, 0.009].into(),
                ],
                afferents.clone(),
            ),
            trial(
                vec![
                    vec![0.001, 0.002, 0.005].into(),
                    SpikeTimes::Single(0.004),
                    vec![0.002, 0.008].into(),
                    SpikeTimes::default(),
                ],
                afferents,
            ),
        ]
    }

    fn rounded(values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v * 1e6).round() / 1e6).collect()
    }

    #[test]
    fn test_both_selectors_is_invalid() {
        let trials = trials();
        let err = aggregate_by_options(&trials, Some(0), Some(AfferentType::Sa), SampleMetric::Isi)
            .unwrap_err();
        assert_eq!(
            err,
            SpikeStatsError::InvalidSelection {
                neuron_id: 0,
                afferent_type: AfferentType::Sa
            }
        );
    }

    #[test]
    fn test_afferent_mode_isi() {
        let sample =
            aggregate_trials(&trials(), Selection::Afferent(AfferentType::Sa), SampleMetric::Isi)
                .unwrap();
        assert_eq!(rounded(&sample.values), vec![0.002, 0.001, 0.003, 0.006]);
        assert_eq!(sample.label, "[sa neurons] | spikes = 4");
    }

    #[test]
    fn test_neuron_mode_isi() {
        let sample = aggregate_trials(&trials(), Selection::Neuron(1), SampleMetric::Isi).unwrap();
        assert_eq!(rounded(&sample.values), vec![0.004, 0.001]);
        assert_eq!(sample.label, "[ID = 1] | spikes = 2");
    }

    #[test]
    fn test_general_mode_isi_orders_populations() {
        let sample = aggregate_trials(&trials(), Selection::General, SampleMetric::Isi).unwrap();
        assert_eq!(
            rounded(&sample.values),
            vec![0.002, 0.004, 0.001, 0.005, 0.001, 0.003, 0.006]
        );
        assert_eq!(sample.label, "[All afferent types | spikes = 7]");
    }

    #[test]
    fn test_distance_skips_silent_neurons() {
        let metric = SampleMetric::Distance {
            reference: Location::ORIGIN,
        };
        let sample =
            aggregate_trials(&trials(), Selection::Afferent(AfferentType::Sa), metric).unwrap();
        // neuron 2 is silent in the first trial only
        assert_eq!(sample.values, vec![5.0, 5.0, 10.0]);

        let sample = aggregate_trials(&trials(), Selection::Neuron(3), metric).unwrap();
        assert_eq!(sample.values, vec![2.0]);

        let sample = aggregate_trials(&trials(), Selection::General, metric).unwrap();
        assert_eq!(sample.values, vec![5.0, 1.0, 2.0, 5.0, 10.0, 1.0]);
    }

    #[test]
    fn test_unclassified_neuron_selection_fails() {
        let stats = trial(
            vec![vec![0.001, 0.002].into()],
            vec![NeuronMetadata::default()],
        );
        let err = aggregate_trials([&stats], Selection::Neuron(0), SampleMetric::Isi).unwrap_err();
        assert_eq!(
            err,
            SpikeStatsError::NeuronNotClassified {
                neuron_id: 0,
                sensor_no: 0
            }
        );

        let err = aggregate_trials([&stats], Selection::Neuron(7), SampleMetric::Isi).unwrap_err();
        assert!(matches!(err, SpikeStatsError::NeuronNotClassified { neuron_id: 7, .. }));
    }
}
