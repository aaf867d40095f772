// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Empirical probability distributions from flat samples
//!
//! Binning follows the usual histogram convention: every bin is half-open
//! `[lo, hi)` except the last, which also includes its right edge. Values
//! outside the edges are not counted.

use tracing::warn;

use crate::error::{SpikeStatsError, StatsResult};

/// Bin count used when explicit edges would leave every value uncounted
pub const DEFAULT_FALLBACK_BINS: usize = 10;

/// How to bin a sample
#[derive(Debug, Clone, PartialEq)]
pub enum BinSpec {
    /// Equal-width bins spanning the sample's range
    Count(usize),
    /// Explicit, strictly increasing bin edges
    Edges(Vec<f64>),
}

impl From<usize> for BinSpec {
    fn from(count: usize) -> Self {
        BinSpec::Count(count)
    }
}

impl From<Vec<f64>> for BinSpec {
    fn from(edges: Vec<f64>) -> Self {
        BinSpec::Edges(edges)
    }
}

/// Raw bin counts together with the edges they were counted against
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<usize>,
    pub bin_edges: Vec<f64>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Normalised bin probabilities.
///
/// `probabilities` may be shorter than `bin_edges.len() - 1` (empty, in
/// practice) when normalisation produced NaN bins that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalDistribution {
    pub probabilities: Vec<f64>,
    pub bin_edges: Vec<f64>,
}

impl EmpiricalDistribution {
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Symmetrised KL divergence against `other`
    pub fn divergence(&self, other: &EmpiricalDistribution) -> StatsResult<f64> {
        crate::divergence::symmetric_kl_divergence(&self.probabilities, &other.probabilities)
    }
}

fn finite_values(sample: &[f64]) -> impl Iterator<Item = f64> + '_ {
    sample.iter().copied().filter(|value| value.is_finite())
}

/// `count + 1` evenly spaced edges over `[first, last]`, last edge exact
fn uniform_edges(first: f64, last: f64, count: usize) -> Vec<f64> {
    let step = (last - first) / count as f64;
    let mut edges: Vec<f64> = (0..=count).map(|i| first + i as f64 * step).collect();
    edges[count] = last;
    edges
}

fn sample_range(sample: &[f64]) -> (f64, f64) {
    let (min, max) = finite_values(sample).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        // nothing to span
        (0.0, 1.0)
    } else if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn validate_edges(edges: &[f64]) -> StatsResult<()> {
    if edges.len() < 2 {
        return Err(SpikeStatsError::InvalidBinSpec(format!(
            "need at least 2 bin edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|edge| !edge.is_finite()) {
        return Err(SpikeStatsError::InvalidBinSpec(
            "bin edges must be finite".to_string(),
        ));
    }
    if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(SpikeStatsError::InvalidBinSpec(
            "bin edges must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

fn count_uniform(sample: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[bins];
    let norm = bins as f64 / (last - first);
    let mut counts = vec![0usize; bins];

    for value in finite_values(sample) {
        if value < first || value > last {
            continue;
        }
        let mut index = ((value - first) * norm) as usize;
        if index >= bins {
            index = bins - 1;
        }
        // fix up floating point error against the actual edges
        if value < edges[index] {
            index = index.saturating_sub(1);
        } else if value >= edges[index + 1] && index != bins - 1 {
            index += 1;
        }
        counts[index] += 1;
    }
    counts
}

fn count_explicit(sample: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[bins];
    let mut counts = vec![0usize; bins];

    for value in finite_values(sample) {
        if value < first || value > last {
            continue;
        }
        let index = if value == last {
            bins - 1
        } else {
            edges.partition_point(|edge| *edge <= value) - 1
        };
        counts[index] += 1;
    }
    counts
}

/// Bin a sample.
///
/// With explicit edges where no value lies below the last edge, falls back
/// to [`DEFAULT_FALLBACK_BINS`] equal-width bins.
pub fn histogram(sample: &[f64], bins: &BinSpec) -> StatsResult<Histogram> {
    match bins {
        BinSpec::Count(0) => Err(SpikeStatsError::InvalidBinSpec(
            "bin count must be positive".to_string(),
        )),
        BinSpec::Count(count) => {
            let (first, last) = sample_range(sample);
            let bin_edges = uniform_edges(first, last, *count);
            let counts = count_uniform(sample, &bin_edges);
            Ok(Histogram { counts, bin_edges })
        }
        BinSpec::Edges(edges) => {
            validate_edges(edges)?;
            let upper = edges[edges.len() - 1];
            if !finite_values(sample).any(|value| value < upper) {
                warn!(
                    "[DISTRIBUTION] All {} sample values reach or exceed the upper bin edge {}, switching to {} bins",
                    sample.len(),
                    upper,
                    DEFAULT_FALLBACK_BINS
                );
                return histogram(sample, &BinSpec::Count(DEFAULT_FALLBACK_BINS));
            }
            let counts = count_explicit(sample, edges);
            Ok(Histogram {
                counts,
                bin_edges: edges.clone(),
            })
        }
    }
}

/// Bin a sample and normalise the counts to probabilities.
///
/// An empty histogram normalises to NaN in every bin; those bins are dropped,
/// so the result is an empty distribution rather than an error.
pub fn probability_distribution(sample: &[f64], bins: &BinSpec) -> StatsResult<EmpiricalDistribution> {
    let Histogram { counts, bin_edges } = histogram(sample, bins)?;
    let total = counts.iter().sum::<usize>() as f64;

    let heights: Vec<f64> = counts.iter().map(|count| *count as f64 / total).collect();
    let probabilities: Vec<f64> = heights.iter().copied().filter(|h| !h.is_nan()).collect();

    if probabilities.len() != heights.len() {
        warn!(
            "[DISTRIBUTION] NaN detected in normalisation ({} of {} bins); this most likely means no selected neuron fired. Removing NaNs.",
            heights.len() - probabilities.len(),
            heights.len()
        );
    }

    Ok(EmpiricalDistribution {
        probabilities,
        bin_edges,
    })
}
