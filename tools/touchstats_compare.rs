// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end for touchstats comparisons.
//!
//! Settings come from `touchstats.toml` (if found), `TOUCHSTATS_*`
//! environment variables and the global options below, in increasing order
//! of precedence. Per-crate debug logging is enabled with `--debug-<crate>`,
//! `--debug-all` or `TOUCHSTATS_DEBUG`.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use touchstats::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    TouchstatsConfig,
};
use touchstats::observability::{init_logging, CrateDebugFlags, DEBUG_ENV_VAR};
use touchstats::spike::{AfferentType, BinSpec, Location};
use touchstats::trials::{
    select_trials, Comparator, Comparison, ComparisonSide, NoiseLevel, TrialFilter,
};

/// Compare inter-spike-interval distributions of simulated tactile afferents
#[derive(Parser, Debug)]
#[command(name = "touchstats-compare", version, author, long_about = None)]
struct Cli {
    /// Path to touchstats.toml (searched for when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the trial archives
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Number of equal-width histogram bins
    #[arg(long, global = true)]
    n_bins: Option<usize>,

    /// Explicit, increasing bin edges (comma-separated); overrides --n-bins
    #[arg(long, global = true, value_delimiter = ',', allow_hyphen_values = true)]
    edges: Vec<f64>,

    /// Sensor analysed in multi-sensor (trq) archives
    #[arg(long, global = true)]
    trq_sensor_no: Option<usize>,

    /// Default log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Same trials, two neuron ids
    Neuron {
        #[arg(long, value_delimiter = ',')]
        trials: Vec<String>,
        #[arg(long)]
        neuron1: usize,
        #[arg(long)]
        neuron2: usize,
    },
    /// Same trials, two afferent types
    Afferent {
        #[arg(long, value_delimiter = ',')]
        trials: Vec<String>,
        #[arg(long)]
        afferent1: AfferentType,
        #[arg(long)]
        afferent2: AfferentType,
    },
    /// Two trial sets from different stimuli
    Response(SetPair),
    /// Two trial sets from repeats of one stimulus
    Trial(SetPair),
    /// Two trial sets from different noise-level directories
    Noise {
        #[arg(long)]
        dir1: PathBuf,
        #[arg(long)]
        dir2: PathBuf,
        #[command(flatten)]
        sets: SetPair,
    },
    /// One trial set, distances from two reference points
    Location {
        #[arg(long, value_delimiter = ',')]
        trials: Vec<String>,
        /// First reference point as x,y
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        ref1: Location,
        /// Second reference point as x,y
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        ref2: Location,
        #[command(flatten)]
        selector: Selector,
    },
    /// List archives matching file-name tokens
    Select {
        #[arg(long)]
        sensor: Option<String>,
        #[arg(long)]
        object: Option<u32>,
        #[arg(long)]
        dim: Option<u32>,
        #[arg(long)]
        trial: Option<u32>,
        /// Noise level; negative values map to `minus<n>` directories
        #[arg(long, allow_hyphen_values = true)]
        noise: Option<i32>,
    },
}

#[derive(Args, Debug)]
struct SetPair {
    /// First trial set (empty = every archive)
    #[arg(long, value_delimiter = ',')]
    set1: Vec<String>,
    /// Second trial set (empty = every archive)
    #[arg(long, value_delimiter = ',')]
    set2: Vec<String>,
    #[command(flatten)]
    selector: Selector,
}

/// Neither option selects every classified neuron
#[derive(Args, Debug)]
struct Selector {
    #[arg(long)]
    neuron: Option<usize>,
    #[arg(long)]
    afferent: Option<AfferentType>,
}

fn parse_location(value: &str) -> Result<Location, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", value))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", part, e))
    };
    Ok(Location::new(parse(x)?, parse(y)?))
}

#[derive(Serialize)]
struct SideReport<'a> {
    label: &'a str,
    sample_size: usize,
    probabilities: &'a [f64],
    bin_edges: &'a [f64],
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    divergence: f64,
    left: SideReport<'a>,
    right: SideReport<'a>,
    y_axis_limit: f64,
    x_axis_limit: f64,
}

fn side_report(side: &ComparisonSide) -> SideReport<'_> {
    SideReport {
        label: &side.label,
        sample_size: side.sample_size,
        probabilities: &side.distribution.probabilities,
        bin_edges: &side.distribution.bin_edges,
    }
}

/// Settings map for `apply_cli_overrides`
fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if let Some(data_dir) = &cli.data_dir {
        overrides.insert("data_dir".to_string(), data_dir.display().to_string());
    }
    if let Some(n_bins) = cli.n_bins {
        overrides.insert("n_bins".to_string(), n_bins.to_string());
    }
    if let Some(sensor_no) = cli.trq_sensor_no {
        overrides.insert("trq_sensor_no".to_string(), sensor_no.to_string());
    }
    if let Some(level) = &cli.log_level {
        overrides.insert("log_level".to_string(), level.clone());
    }
    overrides
}

fn resolve_config(cli: &Cli) -> Result<TouchstatsConfig> {
    let overrides = cli_overrides(cli);
    let config = match load_config(cli.config.as_deref(), Some(&overrides)) {
        Ok(config) => config,
        // no file anywhere: defaults plus overrides
        Err(ConfigError::FileNotFound(_)) if cli.config.is_none() => {
            let mut config = TouchstatsConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            config
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    validate_config(&config)?;
    Ok(config)
}

fn print_comparison(comparison: &Comparison, config: &TouchstatsConfig, json: bool) -> Result<()> {
    if json {
        let report = ComparisonReport {
            divergence: comparison.divergence,
            left: side_report(&comparison.left),
            right: side_report(&comparison.right),
            y_axis_limit: config.plotting.y_axis_limit,
            x_axis_limit: config.plotting.x_axis_limit,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", comparison.left.label);
        println!("{}", comparison.right.label);
        println!("KL divergence: {}", comparison.divergence);
    }
    Ok(())
}

fn run(cli: &Cli, config: &TouchstatsConfig) -> Result<()> {
    let data_dir: &Path = &config.archive.data_dir;
    let loader = touchstats::archive_loader(config);
    let mut options = touchstats::comparison_options(config);
    if !cli.edges.is_empty() {
        options.bins = BinSpec::Edges(cli.edges.clone());
    }
    let comparator = Comparator::new(&loader, options);

    let comparison = match &cli.command {
        Command::Neuron {
            trials,
            neuron1,
            neuron2,
        } => comparator.compare_neuron(data_dir, trials, *neuron1, *neuron2)?,
        Command::Afferent {
            trials,
            afferent1,
            afferent2,
        } => comparator.compare_afferent(data_dir, trials, *afferent1, *afferent2)?,
        Command::Response(sets) => comparator.compare_response(
            data_dir,
            &sets.set1,
            &sets.set2,
            sets.selector.neuron,
            sets.selector.afferent,
        )?,
        Command::Trial(sets) => comparator.compare_trial(
            data_dir,
            &sets.set1,
            &sets.set2,
            sets.selector.neuron,
            sets.selector.afferent,
        )?,
        Command::Noise { dir1, dir2, sets } => comparator.compare_noise(
            dir1,
            dir2,
            &sets.set1,
            &sets.set2,
            sets.selector.neuron,
            sets.selector.afferent,
        )?,
        Command::Location {
            trials,
            ref1,
            ref2,
            selector,
        } => comparator.compare_location(
            data_dir,
            trials,
            *ref1,
            *ref2,
            selector.neuron,
            selector.afferent,
        )?,
        Command::Select {
            sensor,
            object,
            dim,
            trial,
            noise,
        } => {
            let filter = TrialFilter {
                sensor: sensor.clone(),
                object: *object,
                dim: *dim,
                trial: *trial,
                noise: noise.map(NoiseLevel),
            };
            let selection = select_trials(data_dir, &filter)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&selection.files)?);
            } else {
                for file in &selection.files {
                    println!("{}", file);
                }
            }
            if let Some(noise_dir) = &selection.noise_dir {
                info!("📂 [CLI] Noise directory: {}", noise_dir.display());
            }
            return Ok(());
        }
    };

    print_comparison(&comparison, config, cli.json)
}

fn main() -> Result<()> {
    // `--debug-*` flags are handled here rather than by clap
    let (debug_args, clap_args): (Vec<String>, Vec<String>) =
        env::args().partition(|arg| arg.starts_with("--debug-"));
    let mut debug_flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        debug_flags.merge_env_value(&value);
    }

    let cli = Cli::parse_from(clap_args);
    let config = resolve_config(&cli)?;

    let logging = init_logging(&debug_flags, &touchstats::logging_config(&config))?;
    debug!("🔧 [CLI] Resolved configuration: {:?}", config);
    match (logging.log_dir(), &config.logging.file) {
        (Some(run_folder), _) => info!("📁 [CLI] Writing logs to {}", run_folder.display()),
        (None, Some(_)) => warn!("⚠️ [CLI] [logging.file] is set but this build lacks the file-logging feature"),
        (None, None) => {}
    }

    run(&cli, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("3,-4").unwrap(), Location::new(3.0, -4.0));
        assert_eq!(parse_location(" 1.5 , 2 ").unwrap(), Location::new(1.5, 2.0));
        assert!(parse_location("3").is_err());
        assert!(parse_location("a,b").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from([
            "touchstats-compare",
            "--n-bins",
            "12",
            "response",
            "--set1",
            "a.json,b.json",
            "--afferent",
            "pc",
        ]);
        assert_eq!(cli.n_bins, Some(12));
        match cli.command {
            Command::Response(sets) => {
                assert_eq!(sets.set1, vec!["a.json", "b.json"]);
                assert!(sets.set2.is_empty());
                assert_eq!(sets.selector.afferent, Some(AfferentType::Pc));
                assert_eq!(sets.selector.neuron, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides_map() {
        let cli = Cli::parse_from([
            "touchstats-compare",
            "--data-dir",
            "/data/noise_0",
            "--trq-sensor-no",
            "1",
            "select",
            "--noise",
            "-5",
        ]);
        let overrides = cli_overrides(&cli);
        assert_eq!(overrides["data_dir"], "/data/noise_0");
        assert_eq!(overrides["trq_sensor_no"], "1");
        assert!(!overrides.contains_key("n_bins"));
        assert!(matches!(cli.command, Command::Select { noise: Some(-5), .. }));
    }
}
