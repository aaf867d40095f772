// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-trial statistics over an archive directory

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use touchstats_spike::{sensor_stats, AfferentStats};

use crate::archive::{ArchiveLoader, SensorLayout};
use crate::error::{TrialError, TrialResult};
use crate::select::walk_archive_tree;

/// Statistics of one trial archive, for the analysed sensor
#[derive(Debug, Clone)]
pub struct TrialStats {
    pub file_name: String,
    pub path: PathBuf,
    pub layout: SensorLayout,
    pub stats: AfferentStats,
}

/// Archive paths under `data_dir` named in `trial_filenames`, or every
/// archive the loader accepts when the list is empty.
///
/// Every named trial must exist somewhere under `data_dir`.
fn candidate_paths(
    data_dir: &Path,
    trial_filenames: &[String],
    loader: &dyn ArchiveLoader,
) -> TrialResult<Vec<PathBuf>> {
    let tree = walk_archive_tree(data_dir)?;

    if trial_filenames.is_empty() {
        return Ok(tree
            .into_iter()
            .map(|(dir, file_name)| dir.join(file_name))
            .filter(|path| loader.accepts(path))
            .collect());
    }

    if let Some(missing) = trial_filenames
        .iter()
        .find(|wanted| !tree.iter().any(|(_, file_name)| file_name == *wanted))
    {
        return Err(TrialError::MissingTrial {
            data_dir: data_dir.to_path_buf(),
            file_name: missing.clone(),
        });
    }

    Ok(tree
        .into_iter()
        .filter(|(_, file_name)| trial_filenames.contains(file_name))
        .map(|(dir, file_name)| dir.join(file_name))
        .collect())
}

fn load_trial(
    path: &Path,
    trq_sensor_no: usize,
    loader: &dyn ArchiveLoader,
) -> TrialResult<TrialStats> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    let layout = SensorLayout::from_file_name(&file_name);
    let sensor_no = layout.sensor_index(trq_sensor_no);

    let records = loader.load(path)?;
    let record = records.get(sensor_no).ok_or_else(|| TrialError::SensorOutOfRange {
        path: path.to_path_buf(),
        sensor_no,
        available: records.len(),
    })?;

    let stats = sensor_stats(record, sensor_no).map_err(|source| TrialError::TrialStats {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "[TRIAL-COLLECT] {} sensor #{}: {} neurons, {} unclassified",
        file_name,
        sensor_no,
        stats.neuron_total(),
        stats.unclassified().len()
    );

    Ok(TrialStats {
        file_name,
        path: path.to_path_buf(),
        layout,
        stats,
    })
}

/// Load and reduce every selected trial under `data_dir`.
///
/// An empty `trial_filenames` selects every archive the loader accepts.
/// Trials are decoded in parallel; the result keeps the sorted walk order.
/// The first failing trial aborts the whole collection.
pub fn collect_trial_stats(
    data_dir: &Path,
    trial_filenames: &[String],
    trq_sensor_no: usize,
    loader: &dyn ArchiveLoader,
) -> TrialResult<Vec<TrialStats>> {
    if !data_dir.is_dir() {
        return Err(TrialError::MissingArchiveDirectory(data_dir.to_path_buf()));
    }

    let paths = candidate_paths(data_dir, trial_filenames, loader)?;
    if paths.is_empty() {
        return Err(TrialError::EmptyArchiveDirectory(data_dir.to_path_buf()));
    }

    info!(
        "[TRIAL-COLLECT] Loading {} trial archive(s) from {}",
        paths.len(),
        data_dir.display()
    );

    paths
        .par_iter()
        .map(|path| load_trial(path, trq_sensor_no, loader))
        .collect()
}
