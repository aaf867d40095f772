// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration-driven comparisons through the umbrella crate

use std::fs;
use std::path::Path;

use touchstats::prelude::*;
use touchstats::spike::{NeuronMetadata, SpikeTimes};

fn sensor(spikes: Vec<SpikeTimes>) -> SensorRecord {
    let rate = spikes.iter().map(|times| times.len() as f64).collect();
    SensorRecord {
        duration: 0.02,
        rate,
        spikes,
        afferents: vec![
            NeuronMetadata::new(AfferentType::Sa, Location::new(0.0, 1.0)),
            NeuronMetadata::new(AfferentType::Ra, Location::new(1.0, 0.0)),
            NeuronMetadata::new(AfferentType::Pc, Location::new(2.0, 2.0)),
        ],
    }
}

fn write_trial(dir: &Path, name: &str, sensors: &[SensorRecord]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), serde_json::to_string(sensors).unwrap()).unwrap();
}

fn write_config(dir: &Path, data_dir: &Path) -> std::path::PathBuf {
    let path = dir.join("touchstats.toml");
    let contents = format!(
        "[analysis]\nn_bins = 8\ntrq_sensor_no = 2\n\n[archive]\ndata_dir = {:?}\n\n[logging]\nlevel = \"warn\"\n",
        data_dir.display().to_string()
    );
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_drives_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("noise_0");

    let quiet = sensor(vec![SpikeTimes::default(), SpikeTimes::default(), SpikeTimes::default()]);
    let busy = sensor(vec![
        vec![0.001, 0.002, 0.004, 0.008].into(),
        vec![0.003, 0.006, 0.009].into(),
        vec![0.001, 0.011].into(),
    ]);
    for trial in 1..=3 {
        write_trial(
            &data_dir,
            &format!("spikes_trq_object_1_dim_1_trial_{}.json", trial),
            &[quiet.clone(), quiet.clone(), busy.clone()],
        );
    }

    let config_path = write_config(dir.path(), &data_dir);
    let config = load_config(Some(&config_path), None).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.archive.data_dir, data_dir);

    let loader = touchstats::archive_loader(&config);
    let comparator = Comparator::new(&loader, touchstats::comparison_options(&config));

    let comparison = comparator
        .compare_afferent(&config.archive.data_dir, &[], AfferentType::Sa, AfferentType::Ra)
        .unwrap();
    // sensor #2 is the busy one: 3 SA deltas and 2 RA deltas per trial
    assert_eq!(comparison.left.sample_size, 9);
    assert_eq!(comparison.right.sample_size, 6);
    assert_eq!(comparison.left.distribution.len(), 8);
    assert!(comparison.left.label.ends_with("| (sensor #2)"));
    assert!(comparison.divergence >= 0.0);

    let selection = select_trials(dir.path(), &TrialFilter::new().trial(2).noise(NoiseLevel(0))).unwrap();
    assert_eq!(selection.files, vec!["spikes_trq_object_1_dim_1_trial_2.json".to_string()]);
}

#[test]
fn test_quiet_sensor_cannot_be_compared() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("noise_0");
    let quiet = sensor(vec![SpikeTimes::default(), SpikeTimes::default(), SpikeTimes::default()]);
    write_trial(&data_dir, "spikes_trq_object_1_dim_1_trial_1.json", &[quiet.clone(), quiet.clone(), quiet]);

    let mut config = TouchstatsConfig::default();
    config.archive.data_dir = data_dir.clone();

    let loader = touchstats::archive_loader(&config);
    let comparator = Comparator::new(&loader, touchstats::comparison_options(&config));
    let err = comparator
        .compare_trial(&data_dir, &[], &[], None, None)
        .unwrap_err();
    assert!(matches!(err, TrialError::Stats(SpikeStatsError::EmptyDistribution)));
}
