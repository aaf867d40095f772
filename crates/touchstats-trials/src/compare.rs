// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Distribution comparisons between trial sets, neurons and afferent types
//!
//! Every comparison follows the same path:
//!
//! ```text
//! trial archives ──► TrialStats ──► AggregatedSample ──► EmpiricalDistribution
//!                                                               │
//!                             Comparison { divergence } ◄───────┘ (x2)
//! ```
//!
//! Selector errors are reported before any archive is read.

use std::path::Path;

use tracing::info;
use touchstats_spike::{
    aggregate_trials, probability_distribution, AfferentType, BinSpec, EmpiricalDistribution,
    Location, SampleMetric, Selection,
};

use crate::archive::{ArchiveLoader, SensorLayout};
use crate::collect::{collect_trial_stats, TrialStats};
use crate::error::TrialResult;

/// Tuning shared by every comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOptions {
    pub bins: BinSpec,
    /// Sensor analysed in multi-sensor archives
    pub trq_sensor_no: usize,
    /// Upper y limit handed to plotting front ends
    pub y_axis_limit: f64,
    /// Upper x limit for plotting; 0 means automatic
    pub x_axis_limit: f64,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            bins: BinSpec::Count(30),
            trq_sensor_no: 0,
            y_axis_limit: 1.0,
            x_axis_limit: 0.0,
        }
    }
}

impl ComparisonOptions {
    pub fn with_bins(mut self, bins: impl Into<BinSpec>) -> Self {
        self.bins = bins.into();
        self
    }

    pub fn with_trq_sensor(mut self, trq_sensor_no: usize) -> Self {
        self.trq_sensor_no = trq_sensor_no;
        self
    }
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSide {
    pub label: String,
    pub sample_size: usize,
    pub distribution: EmpiricalDistribution,
}

/// Two distributions and their symmetrised KL divergence
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub divergence: f64,
    pub left: ComparisonSide,
    pub right: ComparisonSide,
}

/// Runs comparisons against archives read by one loader
pub struct Comparator<'a> {
    loader: &'a dyn ArchiveLoader,
    options: ComparisonOptions,
}

impl<'a> Comparator<'a> {
    pub fn new(loader: &'a dyn ArchiveLoader, options: ComparisonOptions) -> Self {
        Self { loader, options }
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    /// ISI distribution of one trial set under one selection
    pub fn isi_distribution(
        &self,
        data_dir: &Path,
        trials: &[String],
        selection: Selection,
    ) -> TrialResult<ComparisonSide> {
        self.side(data_dir, trials, selection, SampleMetric::Isi)
    }

    /// Distribution of firing-neuron distances from `reference`
    pub fn distance_distribution(
        &self,
        data_dir: &Path,
        trials: &[String],
        selection: Selection,
        reference: Location,
    ) -> TrialResult<ComparisonSide> {
        self.side(data_dir, trials, selection, SampleMetric::Distance { reference })
    }

    /// Same trials, two neuron ids
    pub fn compare_neuron(
        &self,
        data_dir: &Path,
        trials: &[String],
        neuron1: usize,
        neuron2: usize,
    ) -> TrialResult<Comparison> {
        let left = self.isi_distribution(data_dir, trials, Selection::Neuron(neuron1))?;
        let right = self.isi_distribution(data_dir, trials, Selection::Neuron(neuron2))?;
        compare_sides(left, right)
    }

    /// Same trials, two afferent types
    pub fn compare_afferent(
        &self,
        data_dir: &Path,
        trials: &[String],
        afferent1: AfferentType,
        afferent2: AfferentType,
    ) -> TrialResult<Comparison> {
        let left = self.isi_distribution(data_dir, trials, Selection::Afferent(afferent1))?;
        let right = self.isi_distribution(data_dir, trials, Selection::Afferent(afferent2))?;
        compare_sides(left, right)
    }

    /// Two trial sets (typically different stimuli), one selection
    pub fn compare_response(
        &self,
        data_dir: &Path,
        set1: &[String],
        set2: &[String],
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> TrialResult<Comparison> {
        self.compare_sets(data_dir, data_dir, set1, set2, neuron_id, afferent_type)
    }

    /// Two trial sets (typically repeats of one stimulus), one selection
    pub fn compare_trial(
        &self,
        data_dir: &Path,
        set1: &[String],
        set2: &[String],
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> TrialResult<Comparison> {
        self.compare_sets(data_dir, data_dir, set1, set2, neuron_id, afferent_type)
    }

    /// Two trial sets read from different noise-level directories
    pub fn compare_noise(
        &self,
        dir1: &Path,
        dir2: &Path,
        set1: &[String],
        set2: &[String],
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> TrialResult<Comparison> {
        self.compare_sets(dir1, dir2, set1, set2, neuron_id, afferent_type)
    }

    /// One trial set, distances from two reference points
    pub fn compare_location(
        &self,
        data_dir: &Path,
        trials: &[String],
        reference1: Location,
        reference2: Location,
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> TrialResult<Comparison> {
        let selection = Selection::from_options(neuron_id, afferent_type)?;
        let stats = self.collect(data_dir, trials)?;
        let left = self.side_from_stats(
            &stats,
            selection,
            SampleMetric::Distance {
                reference: reference1,
            },
        )?;
        let right = self.side_from_stats(
            &stats,
            selection,
            SampleMetric::Distance {
                reference: reference2,
            },
        )?;
        compare_sides(left, right)
    }

    fn compare_sets(
        &self,
        dir1: &Path,
        dir2: &Path,
        set1: &[String],
        set2: &[String],
        neuron_id: Option<usize>,
        afferent_type: Option<AfferentType>,
    ) -> TrialResult<Comparison> {
        let selection = Selection::from_options(neuron_id, afferent_type)?;
        let left = self.isi_distribution(dir1, set1, selection)?;
        let right = self.isi_distribution(dir2, set2, selection)?;
        compare_sides(left, right)
    }

    fn collect(&self, data_dir: &Path, trials: &[String]) -> TrialResult<Vec<TrialStats>> {
        collect_trial_stats(data_dir, trials, self.options.trq_sensor_no, self.loader)
    }

    fn side(
        &self,
        data_dir: &Path,
        trials: &[String],
        selection: Selection,
        metric: SampleMetric,
    ) -> TrialResult<ComparisonSide> {
        let stats = self.collect(data_dir, trials)?;
        self.side_from_stats(&stats, selection, metric)
    }

    fn side_from_stats(
        &self,
        trials: &[TrialStats],
        selection: Selection,
        metric: SampleMetric,
    ) -> TrialResult<ComparisonSide> {
        let sample = aggregate_trials(trials.iter().map(|trial| &trial.stats), selection, metric)?;
        let distribution = probability_distribution(&sample.values, &self.options.bins)?;

        let mut label = sample.label;
        if trials
            .iter()
            .any(|trial| trial.layout == SensorLayout::MultiSensor)
        {
            label.push_str(&SensorLayout::MultiSensor.label_suffix(self.options.trq_sensor_no));
        }

        Ok(ComparisonSide {
            label,
            sample_size: sample.values.len(),
            distribution,
        })
    }
}

/// Score two sides; an empty side is an error rather than a NaN divergence
pub fn compare_sides(left: ComparisonSide, right: ComparisonSide) -> TrialResult<Comparison> {
    let divergence = left.distribution.divergence(&right.distribution)?;
    info!(
        "[COMPARE] {} vs {}: KL divergence = {}",
        left.label, right.label, divergence
    );
    Ok(Comparison {
        divergence,
        left,
        right,
    })
}
