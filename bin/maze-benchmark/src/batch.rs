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

//! Every maze in every dataset folder, from every start, with both policies.
//!
//! Bad folders, mazes and starts are logged and skipped so one broken file does not stop the
//! batch. A run that breaks an invariant is logged and counted, and every other run of the maze
//! still goes ahead. Only failing to write results is fatal.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use maze_logic::{load_maze, Position};
use tremaux::{MazeRun, Policy, RandomSource, RunConfig, RunError};

use crate::config::BenchmarkConfig;
use crate::dataset::{dataset_folders, load_start_locations, maze_files, maze_id};
use crate::results::ResultWriter;

/// What happened over a whole batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub runs: usize,
    pub skipped_folders: usize,
    pub skipped_mazes: usize,
    pub skipped_starts: usize,
    pub failed_runs: usize,
}

pub fn run_batch<W, R>(
    config: &BenchmarkConfig,
    writer: &mut ResultWriter<W>,
    rng: &mut R,
) -> anyhow::Result<Tally>
where
    W: Write,
    R: RandomSource + ?Sized,
{
    let mut tally = Tally::default();
    let folders = dataset_folders(&config.dataset, &config.folder_prefix)?;
    if folders.is_empty() {
        tracing::warn!(
            dataset = %config.dataset.display(),
            prefix = %config.folder_prefix,
            "no dataset folders found"
        );
    }

    for folder in folders {
        let starts = match load_start_locations(&folder.join(&config.locations_file)) {
            Ok(starts) => starts,
            Err(err) => {
                tracing::warn!(folder = %folder.display(), %err, "skipping folder");
                tally.skipped_folders += 1;
                continue;
            }
        };
        let mazes = match maze_files(&folder.join(&config.mazes_dir)) {
            Ok(mazes) => mazes,
            Err(err) => {
                tracing::warn!(folder = %folder.display(), err = %format!("{err:#}"), "skipping folder");
                tally.skipped_folders += 1;
                continue;
            }
        };
        tracing::debug!(folder = %folder.display(), starts = starts.len(), mazes = mazes.len(), "folder");

        for maze in mazes {
            run_maze(config, &maze, &starts, writer, rng, &mut tally)?;
        }
    }

    writer.flush().context("flush results")?;
    Ok(tally)
}

fn run_maze<W, R>(
    config: &BenchmarkConfig,
    maze: &Path,
    starts: &[Position],
    writer: &mut ResultWriter<W>,
    rng: &mut R,
    tally: &mut Tally,
) -> anyhow::Result<()>
where
    W: Write,
    R: RandomSource + ?Sized,
{
    let grid = match load_maze(maze) {
        Ok(grid) => grid,
        Err(err) => {
            tracing::warn!(maze = %maze.display(), %err, "skipping maze");
            tally.skipped_mazes += 1;
            return Ok(());
        }
    };
    let run_config = RunConfig {
        max_steps: config.max_steps,
        pace: None,
    };
    let mut maze_run = MazeRun::new(maze_id(maze), grid, run_config);

    for &start in starts {
        for outcome in maze_run.evaluate(start, &Policy::ALL, &mut *rng) {
            match outcome {
                Ok(record) => {
                    writer
                        .write(&record)
                        .with_context(|| format!("write result for {}", record.maze_id))?;
                    tally.runs += 1;
                }
                Err(err @ RunError::Setup { .. }) => {
                    // every policy would fail the same way from this start.
                    tracing::warn!(%start, %err, "skipping start");
                    tally.skipped_starts += 1;
                    break;
                }
                Err(err) => {
                    tracing::error!(%start, %err, "run failed");
                    tally.failed_runs += 1;
                }
            }
        }
    }
    Ok(())
}
