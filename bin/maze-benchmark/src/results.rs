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

//! Result CSV: one row per run, `Algorithm,Connectivity,Steps,MazeID,Start`.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tremaux::RunRecord;

pub const HEADER: [&str; 5] = ["Algorithm", "Connectivity", "Steps", "MazeID", "Start"];

/// Quote a field if it holds a comma, a quote or a line break, doubling any quotes inside.
pub fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|f| quote(f)).collect();
    writeln!(out, "{}", line.join(","))
}

pub struct ResultWriter<W: Write> {
    out: W,
}

impl ResultWriter<File> {
    /// Append to `path`, creating it if needed. The header goes in only when the file is empty.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        Self::new(file, is_empty)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(mut out: W, write_header: bool) -> io::Result<Self> {
        if write_header {
            write_row(&mut out, &HEADER)?;
        }
        Ok(Self { out })
    }

    pub fn write(&mut self, record: &RunRecord) -> io::Result<()> {
        let policy = record.policy.to_string();
        let connectivity = record.connectivity.to_string();
        let steps = record.steps.to_string();
        let start = record.start.to_string();
        write_row(
            &mut self.out,
            &[
                policy.as_str(),
                connectivity.as_str(),
                steps.as_str(),
                record.maze_id.as_str(),
                start.as_str(),
            ],
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
