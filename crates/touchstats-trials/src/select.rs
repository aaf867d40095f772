// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial selection by file-name tokens
//!
//! Archive names follow `spikes_<sensor>_object_<n>_dim_<n>_trial_<n>.<ext>`
//! and sit somewhere under a noise-level directory (`minus<n>` for negative
//! levels, `noise_<n>` otherwise). A [`TrialFilter`] pins any subset of those
//! tokens; unset fields match any value, but the token itself must be present.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TrialError, TrialResult};

/// Noise level of a simulation run, as encoded in its directory name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoiseLevel(pub i32);

impl NoiseLevel {
    pub fn directory_token(&self) -> String {
        if self.0 < 0 {
            format!("minus{}", self.0.unsigned_abs())
        } else {
            format!("noise_{}", self.0)
        }
    }

    /// True if a single path component names this level.
    ///
    /// The token must not run on into further digits, so `noise_1` does not
    /// match `noise_10`.
    pub fn matches_component(&self, component: &str) -> bool {
        let token = self.directory_token();
        component.match_indices(&token).any(|(start, _)| {
            !component[start + token.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        path.components()
            .filter_map(|component| component.as_os_str().to_str())
            .any(|component| self.matches_component(component))
    }
}

impl fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.directory_token())
    }
}

/// File-name filter over trial archives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialFilter {
    pub sensor: Option<String>,
    pub object: Option<u32>,
    pub dim: Option<u32>,
    pub trial: Option<u32>,
    pub noise: Option<NoiseLevel>,
}

/// Archives picked by a [`TrialFilter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialSelection {
    /// Matching file names, in walk order
    pub files: Vec<String>,
    /// Last directory in walk order matching the noise level, if one was
    /// requested; set even when that directory holds no archives
    pub noise_dir: Option<PathBuf>,
}

impl TrialSelection {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Value following `key` in `file_name`, made of characters accepted by `allowed`
fn token_value<'a>(file_name: &'a str, key: &str, allowed: fn(char) -> bool) -> Option<&'a str> {
    file_name.match_indices(key).find_map(|(start, _)| {
        let rest = &file_name[start + key.len()..];
        let end = rest.find(|c: char| !allowed(c)).unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

fn number_matches(file_name: &str, key: &str, wanted: Option<u32>) -> bool {
    match token_value(file_name, key, |c| c.is_ascii_digit()) {
        None => false,
        Some(value) => wanted.map_or(true, |wanted| value.parse::<u32>() == Ok(wanted)),
    }
}

impl TrialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    pub fn object(mut self, object: u32) -> Self {
        self.object = Some(object);
        self
    }

    pub fn dim(mut self, dim: u32) -> Self {
        self.dim = Some(dim);
        self
    }

    pub fn trial(mut self, trial: u32) -> Self {
        self.trial = Some(trial);
        self
    }

    pub fn noise(mut self, noise: NoiseLevel) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Check the file-name tokens (the noise level is matched on directories)
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let sensor_ok = match token_value(file_name, "spikes_", |c| c.is_ascii_alphanumeric()) {
            None => false,
            Some(value) => self.sensor.as_deref().map_or(true, |wanted| value == wanted),
        };

        sensor_ok
            && number_matches(file_name, "object_", self.object)
            && number_matches(file_name, "dim_", self.dim)
            && number_matches(file_name, "trial_", self.trial)
    }
}

/// Directories and files under `root`, both in sorted depth-first order
#[derive(Debug, Default)]
pub(crate) struct ArchiveTree {
    /// Every visited directory, `root` first
    pub dirs: Vec<PathBuf>,
    /// (directory, file name) pairs
    pub files: Vec<(PathBuf, String)>,
}

/// Every file under `root`, as (directory, file name), in sorted walk order
pub(crate) fn walk_archive_tree(root: &Path) -> TrialResult<Vec<(PathBuf, String)>> {
    Ok(scan_archive_tree(root)?.files)
}

pub(crate) fn scan_archive_tree(root: &Path) -> TrialResult<ArchiveTree> {
    let mut tree = ArchiveTree::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        tree.dirs.push(dir.clone());
        let read_dir = fs::read_dir(&dir).map_err(|source| TrialError::ArchiveIo {
            path: dir.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| TrialError::ArchiveIo {
                path: dir.clone(),
                source,
            })?;
            entries.push(entry.path());
        }
        entries.sort();

        let mut subdirs = Vec::new();
        for path in entries {
            if path.is_dir() {
                subdirs.push(path);
            } else if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                tree.files.push((dir.clone(), name.to_string()));
            }
        }
        // depth-first, visiting subdirectories in sorted order
        pending.extend(subdirs.into_iter().rev());
    }

    Ok(tree)
}

/// Walk `data_dir` and return the archives matching `filter`
pub fn select_trials(data_dir: &Path, filter: &TrialFilter) -> TrialResult<TrialSelection> {
    if !data_dir.is_dir() {
        return Err(TrialError::MissingArchiveDirectory(data_dir.to_path_buf()));
    }

    let tree = scan_archive_tree(data_dir)?;
    let mut selection = TrialSelection::default();
    if let Some(noise) = &filter.noise {
        selection.noise_dir = tree.dirs.iter().rev().find(|dir| noise.matches_path(dir)).cloned();
    }

    for (dir, file_name) in tree.files {
        if filter.noise.as_ref().is_some_and(|noise| !noise.matches_path(&dir)) {
            continue;
        }
        if filter.matches_file_name(&file_name) {
            selection.files.push(file_name);
        }
    }

    debug!(
        "[TRIAL-SELECT] {} archive(s) in {} match {:?}",
        selection.files.len(),
        data_dir.display(),
        filter
    );
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "spikes_trq_object_12_dim_2_trial_3.json";

    #[test]
    fn test_noise_tokens() {
        assert_eq!(NoiseLevel(-5).directory_token(), "minus5");
        assert_eq!(NoiseLevel(0).directory_token(), "noise_0");
        assert_eq!(NoiseLevel(10).to_string(), "noise_10");
        assert!(NoiseLevel(-5).matches_component("snr_minus5dB"));
        assert!(!NoiseLevel(1).matches_component("noise_10"));
        assert!(NoiseLevel(1).matches_component("noise_1"));
    }

    #[test]
    fn test_noise_dir_tracks_directories_not_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("noise_5/object_1")).unwrap();
        fs::create_dir_all(root.join("noise_5/object_2")).unwrap();
        fs::create_dir_all(root.join("noise_50")).unwrap();
        fs::write(root.join("noise_5/object_1/spikes_ftsn_object_1_dim_1_trial_1.json"), "{}").unwrap();
        fs::write(root.join("noise_50/spikes_ftsn_object_1_dim_1_trial_1.json"), "{}").unwrap();

        let selection = select_trials(root, &TrialFilter::new().noise(NoiseLevel(5))).unwrap();
        assert_eq!(selection.files, vec!["spikes_ftsn_object_1_dim_1_trial_1.json"]);
        // the empty object_2 folder is visited last
        assert_eq!(selection.noise_dir, Some(root.join("noise_5/object_2")));

        let selection = select_trials(root, &TrialFilter::new().noise(NoiseLevel(-3))).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.noise_dir, None);
    }

    #[test]
    fn test_walk_visits_every_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/empty")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/x.json"), "{}").unwrap();

        let tree = scan_archive_tree(dir.path()).unwrap();
        assert_eq!(
            tree.dirs,
            vec![
                dir.path().to_path_buf(),
                dir.path().join("a"),
                dir.path().join("b"),
                dir.path().join("b/empty"),
            ]
        );
        assert_eq!(tree.files, vec![(dir.path().join("a"), "x.json".to_string())]);
    }

    #[test]
    fn test_wildcards_require_tokens() {
        assert!(TrialFilter::new().matches_file_name(NAME));
        assert!(!TrialFilter::new().matches_file_name("notes.txt"));
        assert!(!TrialFilter::new().matches_file_name("spikes_trq_object_1_trial_3.json"));
    }

    #[test]
    fn test_exact_values() {
        assert!(TrialFilter::new().sensor("trq").object(12).matches_file_name(NAME));
        assert!(!TrialFilter::new().sensor("ftsn").matches_file_name(NAME));
        assert!(!TrialFilter::new().object(1).matches_file_name(NAME));
        assert!(TrialFilter::new().dim(2).trial(3).matches_file_name(NAME));
        assert!(!TrialFilter::new().trial(30).matches_file_name(NAME));
    }
}
