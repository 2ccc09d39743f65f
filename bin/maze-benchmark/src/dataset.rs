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

//! Dataset layout: a directory of folders, each with a start-location file and a directory of
//! mazes. The start-location file is
//!
//! ```text
//! <width> <height>
//! <count>
//! <row> <col>    (count times)
//! ```
//!
//! Width and height are ignored; the maze files carry their own.

use std::path::{Path, PathBuf};

use anyhow::Context;
use maze_logic::Position;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationsError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("token {index} is not a non-negative integer: {token:?}")]
    InvalidInteger { index: usize, token: String },

    #[error("expected {expected} start positions, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("failed to read start locations: {0}")]
    Io(String),
}

pub fn parse_start_locations(input: &str) -> Result<Vec<Position>, LocationsError> {
    let mut tokens = input.split_whitespace().enumerate();
    let mut next = || -> Result<Option<usize>, LocationsError> {
        let Some((index, token)) = tokens.next() else {
            return Ok(None);
        };
        token
            .parse::<usize>()
            .map(Some)
            .map_err(|_| LocationsError::InvalidInteger {
                index,
                token: token.to_string(),
            })
    };

    for field in ["width", "height"] {
        next()?.ok_or(LocationsError::Missing(field))?;
    }
    let count = next()?.ok_or(LocationsError::Missing("count"))?;

    let mut starts = Vec::with_capacity(count.min(1 << 16));
    for found in 0..count {
        let truncated = LocationsError::Truncated {
            expected: count,
            found,
        };
        let row = next()?.ok_or_else(|| truncated.clone())?;
        let col = next()?.ok_or(truncated)?;
        starts.push(Position::new(row, col));
    }
    Ok(starts)
}

pub fn load_start_locations(path: &Path) -> Result<Vec<Position>, LocationsError> {
    let input = std::fs::read_to_string(path)
        .map_err(|e| LocationsError::Io(format!("{}: {}", path.display(), e)))?;
    parse_start_locations(&input)
}

/// Folders directly under `dataset` whose name starts with `prefix`, in name order.
pub fn dataset_folders(dataset: &Path, prefix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in
        std::fs::read_dir(dataset).with_context(|| format!("read {}", dataset.display()))?
    {
        let entry = entry.with_context(|| format!("read {}", dataset.display()))?;
        let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
        if is_dir && entry.file_name().to_string_lossy().starts_with(prefix) {
            folders.push(entry.path());
        }
    }
    folders.sort();
    Ok(folders)
}

/// Every regular file in `dir`, in name order.
pub fn maze_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        if entry.file_type().map_or(false, |t| t.is_file()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// The name a maze goes by in the results: its file name.
pub fn maze_id(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
