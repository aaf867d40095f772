// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Symmetrised Kullback-Leibler divergence between binned distributions
//!
//! ```text
//! D(p, q) = Σ p·(ln p − ln q) + Σ q·(ln q − ln p)
//! ```
//!
//! Exact zeros are replaced by [`PROBABILITY_FLOOR`] before taking logs; the
//! vectors are not renormalised afterwards.

use crate::error::{SpikeStatsError, StatsResult};

/// Stand-in for exact-zero probabilities
pub const PROBABILITY_FLOOR: f64 = 1e-10;

fn floored(distribution: &[f64]) -> Vec<f64> {
    distribution
        .iter()
        .map(|p| if *p == 0.0 { PROBABILITY_FLOOR } else { *p })
        .collect()
}

fn check_shapes(p: &[f64], q: &[f64]) -> StatsResult<()> {
    if p.is_empty() || q.is_empty() {
        return Err(SpikeStatsError::EmptyDistribution);
    }
    if p.len() != q.len() {
        return Err(SpikeStatsError::DistributionShapeMismatch {
            left: p.len(),
            right: q.len(),
        });
    }
    Ok(())
}

fn relative_entropy_floored(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(pi, qi)| pi * (pi.ln() - qi.ln()))
        .sum()
}

/// One-directional KL(p, q) after zero-flooring
pub fn kl_divergence(p: &[f64], q: &[f64]) -> StatsResult<f64> {
    check_shapes(p, q)?;
    Ok(relative_entropy_floored(&floored(p), &floored(q)))
}

/// KL(p, q) + KL(q, p) after zero-flooring.
///
/// Inputs are left untouched. Different bin counts are rejected with
/// [`SpikeStatsError::DistributionShapeMismatch`]; an empty side (all bins
/// dropped as NaN) with [`SpikeStatsError::EmptyDistribution`].
pub fn symmetric_kl_divergence(p: &[f64], q: &[f64]) -> StatsResult<f64> {
    check_shapes(p, q)?;
    let p = floored(p);
    let q = floored(q);
    Ok(relative_entropy_floored(&p, &q) + relative_entropy_floored(&q, &p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_distributions_regression() {
        let divergence = symmetric_kl_divergence(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((divergence - 46.051701855275745).abs() < 1e-9, "{}", divergence);
    }

    #[test]
    fn test_identical_distributions_are_zero() {
        let p = [0.2, 0.0, 0.5, 0.3];
        assert_eq!(symmetric_kl_divergence(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetric_and_non_negative() {
        let p = [0.1, 0.4, 0.5, 0.0];
        let q = [0.3, 0.3, 0.2, 0.2];
        let pq = symmetric_kl_divergence(&p, &q).unwrap();
        let qp = symmetric_kl_divergence(&q, &p).unwrap();
        assert!((pq - qp).abs() < 1e-12);
        assert!(pq > 0.0);
        assert!(kl_divergence(&p, &q).unwrap() >= 0.0);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let p = vec![1.0, 0.0];
        let q = vec![0.0, 1.0];
        symmetric_kl_divergence(&p, &q).unwrap();
        assert_eq!(p, vec![1.0, 0.0]);
        assert_eq!(q, vec![0.0, 1.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(
            symmetric_kl_divergence(&[0.5, 0.5], &[1.0]),
            Err(SpikeStatsError::DistributionShapeMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            symmetric_kl_divergence(&[], &[1.0]),
            Err(SpikeStatsError::EmptyDistribution)
        );
    }
}
