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

//! Benchmark settings, read from an optional TOML file and overridden from the command line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Where the dataset lives and where results go. Missing keys take their default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Directory holding the dataset folders.
    pub dataset: PathBuf,

    /// Only folders whose name starts with this are visited.
    pub folder_prefix: String,

    /// Name of the start-location file inside each folder.
    pub locations_file: String,

    /// Name of the directory of maze files inside each folder.
    pub mazes_dir: String,

    /// CSV file that results are appended to.
    pub output: PathBuf,

    pub seed: u64,

    /// Abandon a run after this many moves.
    pub max_steps: Option<usize>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("dataset"),
            folder_prefix: "SCMP".to_string(),
            locations_file: "starting_locations.loc".to_string(),
            mazes_dir: "mazes".to_string(),
            output: PathBuf::from("results.csv"),
            seed: 42,
            max_steps: None,
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.locations_file.trim().is_empty() {
            bail!("locations_file must not be empty");
        }
        if self.mazes_dir.trim().is_empty() {
            bail!("mazes_dir must not be empty");
        }
        if self.max_steps == Some(0) {
            bail!("max_steps must be > 0");
        }
        Ok(())
    }
}

/// Load a config file. Unlike the defaults, an explicitly named file must exist.
pub fn load_config(path: &Path) -> anyhow::Result<BenchmarkConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: BenchmarkConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(config)
}
