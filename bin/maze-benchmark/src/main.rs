/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Run the Tremaux and modified Tremaux agents over a maze benchmark dataset and append one CSV
//! row per run.

mod batch;
mod config;
mod dataset;
mod logging;
mod results;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;

use crate::batch::run_batch;
use crate::config::{load_config, BenchmarkConfig};
use crate::results::ResultWriter;

#[derive(Debug, Default, Parser)]
#[command(about = "Evaluate both exploration policies on every maze of a dataset")]
struct Args {
    /// TOML file with benchmark settings. Flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the dataset folders.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Only visit folders whose name starts with this.
    #[arg(long)]
    prefix: Option<String>,

    /// CSV file to append results to.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Seed for the junction tie-breaks.
    #[arg(long)]
    seed: Option<u64>,

    /// Abandon a run after this many moves.
    #[arg(long)]
    max_steps: Option<usize>,
}

impl Args {
    fn apply(self, mut config: BenchmarkConfig) -> BenchmarkConfig {
        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if let Some(prefix) = self.prefix {
            config.folder_prefix = prefix;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.max_steps.is_some() {
            config.max_steps = self.max_steps;
        }
        config
    }
}

fn main() {
    logging::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BenchmarkConfig::default(),
    };
    let config = args.apply(config);
    config.validate()?;
    tracing::debug!(?config, "benchmark config");

    let mut writer = ResultWriter::append(&config.output)
        .with_context(|| format!("open {}", config.output.display()))?;
    let mut rng = tremaux::Rng::seed_from_u64(config.seed);
    let tally = run_batch(&config, &mut writer, &mut rng)?;

    println!(
        "{} runs written to {} ({} failed; {} folders, {} mazes, {} starts skipped)",
        tally.runs,
        config.output.display(),
        tally.failed_runs,
        tally.skipped_folders,
        tally.skipped_mazes,
        tally.skipped_starts
    );
    Ok(())
}
