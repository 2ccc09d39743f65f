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

#![warn(missing_docs)]

//! Rectilinear maze logic.
//!
//! This is a library for mazes made of square cells, where every cell records the state of its
//! own four edges. It is intended to be used by an agent that explores the maze one cell at a
//! time and marks the passages it walks through.

pub mod cell;
pub mod grid;
pub mod observer;
pub mod parse;

pub use cell::{Cell, CellKind, Direction, EdgeState};
pub use grid::{Grid, Position};
pub use observer::{MazeEvent, MazeObserver, Observers, TracingObserver};
pub use parse::{load_maze, parse_maze};

/// Maze parse error. The input is malformed or truncated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A header field is missing.
    #[error("missing header field: {0}")]
    MissingHeader(&'static str),

    /// A token is not an integer.
    #[error("token {index} is not an integer: {token:?}")]
    InvalidInteger {
        /// Zero-based index of the token in the input.
        index: usize,

        /// The offending token.
        token: String,
    },

    /// A cell value is negative or does not fit in 32 bits.
    #[error("cell {index} has an out-of-range value: {value}")]
    InvalidCell {
        /// Zero-based index of the cell in row-major order.
        index: usize,

        /// The offending value.
        value: i64,
    },

    /// A dimension is zero or negative.
    #[error("maze dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows from the header.
        rows: i64,

        /// Number of columns from the header.
        cols: i64,
    },

    /// There are fewer cell values than the header promises.
    #[error("expected {expected} cell values, found {found}")]
    Truncated {
        /// Number of cells the header promises.
        expected: usize,

        /// Number of cells actually present.
        found: usize,
    },

    /// The maze file could not be read.
    #[error("failed to read maze: {0}")]
    Io(String),
}

/// An internal invariant of the traversal was broken. This is a logic or data-integrity bug, so
/// the run that hit it cannot continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Tried to mark a wall.
    #[error("cannot mark {0} edge: it is a wall")]
    MarkWall(Direction),

    /// Tried to mark an edge that is already marked twice.
    #[error("cannot mark {0} edge: it is already marked twice")]
    MarkSaturated(Direction),

    /// No direction is left to take.
    #[error("no passage left to take")]
    NoCandidate,

    /// An open edge on the border of the grid leads outside of it.
    #[error("moving {0} leaves the grid")]
    LeavesGrid(Direction),

    /// The run took more steps than allowed.
    #[error("step limit of {0} exceeded")]
    StepLimit(usize),
}

/// Maze error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    /// The maze description could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Position is outside of the grid.
    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// The offending position.
        position: Position,

        /// Number of rows in the grid.
        rows: usize,

        /// Number of columns in the grid.
        cols: usize,
    },

    /// No cell in the grid is flagged as the goal.
    #[error("grid has no goal cell")]
    NoGoal,

    /// An invariant was broken at a position.
    #[error("invariant violated at {position}: {violation}")]
    InvariantViolation {
        /// Where the agent was.
        position: Position,

        /// What went wrong.
        violation: Violation,
    },
}

/// The broad class of a [`MazeError`], used to decide whether a batch can carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Skip the maze.
    Parse,

    /// Bad start position or missing goal. Skip the run.
    InvalidPosition,

    /// Logic or data-integrity bug. The run cannot finish.
    InvariantViolation,
}

impl MazeError {
    /// Get the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MazeError::Parse(_) => ErrorKind::Parse,
            MazeError::OutOfBounds { .. } | MazeError::NoGoal => ErrorKind::InvalidPosition,
            MazeError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
        }
    }
}
