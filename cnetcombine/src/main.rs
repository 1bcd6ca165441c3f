//! Command-line front end for cnetcombine.
//!
//! Usage:
//!   cnetcombine --cnet-base base.json --cnet-from new.json --onet out.json
//!   cnetcombine --cnet-list nets.lis --image-tolerance 1.5 --log-file merges.csv
//!
//! Boolean flags take an optional value, so `--clean-net=false` turns off a
//! setting from the `--config` parameter file.
//!
//! Enable per-merge detail:
//!   RUST_LOG=cnetcombine=debug cnetcombine ...

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};

use cnetcombine::{CombineConfig, RunConfig, io, run};

/// Merge control points that denote the same feature across control networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base input control network
    #[arg(long)]
    cnet_base: Option<PathBuf>,

    /// Secondary input control network
    #[arg(long)]
    cnet_from: Option<PathBuf>,

    /// File listing further input networks, one path per line
    #[arg(long)]
    cnet_list: Option<PathBuf>,

    /// Parameter file (YAML or JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pixel tolerance for neighbor search and merge acceptance
    #[arg(long)]
    image_tolerance: Option<f64>,

    /// Maximum points per k-d tree leaf
    #[arg(long)]
    kd_nodes: Option<usize>,

    /// Points with fewer valid measures are ignored
    #[arg(long)]
    min_measures: Option<usize>,

    /// Remove ignored and rejected measures from the output
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    clean_measures: Option<bool>,

    /// Omit ignored and invalid points from the output network
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    clean_net: Option<bool>,

    /// Replace apriori positions with the best available position
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    set_apriori_best: Option<bool>,

    /// Output control network
    #[arg(long)]
    onet: Option<PathBuf>,

    /// Output list of the cube serial numbers seen
    #[arg(long)]
    tosn: Option<PathBuf>,

    /// Output merge log (CSV)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output network ID
    #[arg(long)]
    network_id: Option<String>,

    /// Output network description
    #[arg(long)]
    description: Option<String>,

    /// Base log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_run_config(self) -> anyhow::Result<RunConfig> {
        let mut combine = match &self.config {
            Some(path) => io::load_combine_config(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?,
            None => CombineConfig::default(),
        };

        if let Some(tolerance) = self.image_tolerance {
            combine.image_tolerance = tolerance;
        }
        if let Some(kd_nodes) = self.kd_nodes {
            combine.kd_leaf_size = kd_nodes;
        }
        if let Some(min_measures) = self.min_measures {
            combine.min_measures = min_measures;
        }
        if let Some(clean_measures) = self.clean_measures {
            combine.clean_measures = clean_measures;
        }
        if let Some(clean_net) = self.clean_net {
            combine.clean_net = clean_net;
        }
        if let Some(set_apriori_best) = self.set_apriori_best {
            combine.set_apriori_best = set_apriori_best;
        }
        if self.network_id.is_some() {
            combine.network_id = self.network_id;
        }
        if self.description.is_some() {
            combine.description = self.description;
        }

        Ok(RunConfig {
            cnet_base: self.cnet_base,
            cnet_from: self.cnet_from,
            cnet_list: self.cnet_list,
            onet: self.onet,
            tosn: self.tosn,
            log_file: self.log_file,
            combine,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    common::setup_logging(&args.log_level, "cnetcombine", args.log_dir.as_deref())?;

    let config = args.into_run_config()?;
    if !config.has_inputs() {
        anyhow::bail!("at least one of --cnet-base, --cnet-from or --cnet-list is required");
    }

    let result = run(&config).context("combining control networks failed")?;

    tracing::info!(
        points_merged = result.stats.points_merged,
        output_points = result.stats.output_points,
        "Done"
    );
    println!("{}", result.stats);
    Ok(())
}
