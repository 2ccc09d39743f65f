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

//! Explore one maze from one start with each policy, optionally watching every move.

mod display;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use maze_logic::{load_maze, Position, TracingObserver};
use rand::SeedableRng;
use tremaux::{MazeRun, Policy, RunConfig};

use crate::display::TerminalDisplay;

#[derive(Debug, Parser)]
#[command(about = "Run the Tremaux and modified Tremaux agents once on a single maze")]
struct Args {
    /// Maze description file.
    maze: PathBuf,

    /// Start row.
    #[arg(long, default_value_t = 0)]
    row: usize,

    /// Start column.
    #[arg(long, default_value_t = 0)]
    col: usize,

    /// Seed for the junction tie-breaks.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Only run this policy (tremaux or modified).
    #[arg(long)]
    policy: Option<Policy>,

    /// Print every move, and the marked maze after each run.
    #[arg(long)]
    display: bool,

    /// Pause between moves while displaying, in milliseconds.
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Give up after this many moves.
    #[arg(long)]
    max_steps: Option<usize>,
}

fn main() {
    logging::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let grid = load_maze(&args.maze)
        .with_context(|| format!("failed to load maze {}", args.maze.display()))?;
    let maze_id = args
        .maze
        .file_name()
        .map_or_else(|| args.maze.display().to_string(), |name| name.to_string_lossy().into_owned());

    let config = RunConfig {
        max_steps: args.max_steps,
        pace: args.pace_ms.map(Duration::from_millis),
    };
    let mut maze_run = MazeRun::new(maze_id, grid, config);
    if args.display {
        maze_run.add_observer(Box::new(TerminalDisplay::new(std::io::stdout())));
    }
    if tracing::enabled!(tracing::Level::TRACE) {
        maze_run.add_observer(Box::new(TracingObserver));
    }

    let start = Position::new(args.row, args.col);
    let policies = args.policy.map_or_else(|| Policy::ALL.to_vec(), |p| vec![p]);
    let mut rng = tremaux::Rng::seed_from_u64(args.seed);
    for policy in policies {
        maze_run.start(start)?;
        let result = maze_run.run(policy, &mut rng);
        if args.display {
            println!("{}", maze_run.grid());
        }
        maze_run.reset();

        let record = result?;
        println!(
            "{}: {} steps from {} (maze {}, connectivity {})",
            record.policy, record.steps, record.start, record.maze_id, record.connectivity
        );
    }
    Ok(())
}
