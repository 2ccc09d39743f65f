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

//! Maze description loader.
//!
//! A maze description is a list of whitespace-separated integers:
//!
//! ```text
//! <width> <height> <connectivity>
//! <width * height cell values, row-major>
//! ```
//!
//! `width` is the number of rows and `height` the number of columns. Each cell value carries
//! its walls in the low 4 bits (north, east, south, west) and flags the goal when above 15.

use std::path::Path;
use std::str::FromStr;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::ParseError;

struct Tokens<'a> {
    inner: std::iter::Enumerate<std::str::SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace().enumerate(),
        }
    }

    fn next_int(&mut self) -> Option<Result<i64, ParseError>> {
        let (index, token) = self.inner.next()?;
        Some(
            token
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidInteger {
                    index,
                    token: token.to_string(),
                }),
        )
    }

    fn header(&mut self, field: &'static str) -> Result<i64, ParseError> {
        self.next_int()
            .unwrap_or(Err(ParseError::MissingHeader(field)))
    }
}

/// Parse a maze description into a grid.
pub fn parse_maze(input: &str) -> Result<Grid, ParseError> {
    let mut tokens = Tokens::new(input);
    let width = tokens.header("width")?;
    let height = tokens.header("height")?;
    let connectivity = tokens.header("connectivity")?;
    if width <= 0 || height <= 0 {
        return Err(ParseError::InvalidDimensions {
            rows: width,
            cols: height,
        });
    }
    let connectivity = i32::try_from(connectivity).map_err(|_| ParseError::InvalidInteger {
        index: 2,
        token: connectivity.to_string(),
    })?;

    let (rows, cols) = (width as usize, height as usize);
    let expected = rows
        .checked_mul(cols)
        .ok_or(ParseError::InvalidDimensions {
            rows: width,
            cols: height,
        })?;
    let mut cells = Vec::with_capacity(expected.min(1 << 20));
    for index in 0..expected {
        let value = match tokens.next_int() {
            Some(value) => value?,
            None => {
                return Err(ParseError::Truncated {
                    expected,
                    found: index,
                })
            }
        };
        let code = u32::try_from(value).map_err(|_| ParseError::InvalidCell { index, value })?;
        cells.push(Cell::from_code(code));
    }

    tracing::trace!(rows, cols, connectivity, "parsed maze");
    Grid::new(rows, cols, connectivity, cells)
}

impl FromStr for Grid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_maze(s)
    }
}

/// Read and parse a maze description file.
pub fn load_maze(path: impl AsRef<Path>) -> Result<Grid, ParseError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)
        .map_err(|e| ParseError::Io(format!("{}: {}", path.display(), e)))?;
    parse_maze(&input)
}
