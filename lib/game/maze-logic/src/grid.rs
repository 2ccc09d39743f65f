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

//! The maze grid.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Direction, EdgeState};
use crate::observer::MazeEvent;
use crate::{MazeError, ParseError};

/// Row and column of a cell. Row 0 is the northern edge of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Row, counting from the north.
    pub row: usize,

    /// Column, counting from the west.
    pub col: usize,
}

impl Position {
    /// Create a position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Get the neighbouring position in a direction, or `None` if it would be off a
    /// `rows` x `cols` grid.
    pub fn step(self, direction: Direction, rows: usize, cols: usize) -> Option<Position> {
        let (dr, dc) = direction.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Position { row, col })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// A maze: a rectangle of cells, each owning its four edges.
///
/// Edges are not shared. The south edge of one cell and the north edge of the cell below are
/// separate values, and each cell's own edges decide where the agent can go from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
    connectivity: i32,
    goal: Option<Position>,
}

impl Grid {
    /// Create a grid from its cells in row-major order. There must be at least one row and one
    /// column, and exactly `rows * cols` cells.
    pub fn new(
        rows: usize,
        cols: usize,
        connectivity: i32,
        cells: Vec<Cell>,
    ) -> Result<Self, ParseError> {
        if rows == 0 || cols == 0 {
            return Err(ParseError::InvalidDimensions {
                rows: rows as i64,
                cols: cols as i64,
            });
        }
        if cells.len() != rows * cols {
            return Err(ParseError::Truncated {
                expected: rows * cols,
                found: cells.len(),
            });
        }
        let goal = cells
            .iter()
            .position(Cell::is_goal)
            .map(|i| Position::new(i / cols, i % cols));
        Ok(Self {
            cells,
            rows,
            cols,
            connectivity,
            goal,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Connectivity of the maze, as given by the maze description. Only reported, never used
    /// for traversal.
    pub fn connectivity(&self) -> i32 {
        self.connectivity
    }

    /// Is the position inside the grid.
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Get a cell, or `None` if the position is outside the grid.
    pub fn get(&self, position: Position) -> Option<&Cell> {
        self.contains(position)
            .then(|| &self.cells[position.row * self.cols + position.col])
    }

    /// Get a cell.
    pub fn cell(&self, position: Position) -> Result<&Cell, MazeError> {
        self.check(position)?;
        Ok(&self.cells[position.row * self.cols + position.col])
    }

    /// Get a mutable cell.
    pub fn cell_mut(&mut self, position: Position) -> Result<&mut Cell, MazeError> {
        self.check(position)?;
        Ok(&mut self.cells[position.row * self.cols + position.col])
    }

    /// Check that a position is inside the grid.
    pub fn check(&self, position: Position) -> Result<(), MazeError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                position,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Position of the goal: the first goal cell in row-major order. Found once when the grid is
    /// built.
    pub fn goal(&self) -> Option<Position> {
        self.goal
    }

    /// Iterate over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Position::new(i / cols, i % cols))
    }

    /// Count the edges that are not walls, over every cell. A passage between two cells whose
    /// edges agree counts twice, once per direction of travel.
    pub fn open_edge_count(&self) -> usize {
        self.cells.iter().map(|c| 4 - c.wall_count()).sum()
    }

    /// Snapshot of every edge state in row-major order.
    pub fn marks(&self) -> Vec<[EdgeState; 4]> {
        self.cells.iter().map(Cell::edges).collect()
    }

    /// Clear all marks and the start and current flags, leaving walls and the goal as they were.
    /// Returns what changed, in row-major order, for passing on to observers.
    pub fn clear_marks(&mut self) -> Vec<MazeEvent> {
        let mut events = Vec::new();
        for (position, cell) in self.positions().zip(self.cells.iter_mut()) {
            if cell.clear_marks() {
                events.push(MazeEvent::MarksCleared { position });
            }
            if cell.is_current() {
                events.push(MazeEvent::CurrentChanged {
                    position,
                    current: false,
                });
            }
            cell.clear_start();
            cell.set_current(false);
        }
        events
    }

    // the boundary between a cell and its neighbour. a wall on either side wins, otherwise the
    // higher of the two marks is drawn.
    fn boundary(&self, position: Position, direction: Direction) -> EdgeState {
        let own = self.cells[position.row * self.cols + position.col].edge(direction);
        let other = position
            .step(direction, self.rows, self.cols)
            .and_then(|p| self.get(p))
            .map(|c| c.edge(direction.opposite()))
            .unwrap_or(own);
        if own.is_wall() || other.is_wall() {
            EdgeState::Wall
        } else {
            own.max(other)
        }
    }
}

fn horizontal(edge: EdgeState) -> &'static str {
    match edge {
        EdgeState::Wall => "---",
        EdgeState::Unmarked => "   ",
        EdgeState::MarkedOnce => " 1 ",
        EdgeState::MarkedTwice => " 2 ",
    }
}

fn vertical(edge: EdgeState) -> char {
    match edge {
        EdgeState::Wall => '|',
        EdgeState::Unmarked => ' ',
        EdgeState::MarkedOnce => '1',
        EdgeState::MarkedTwice => '2',
    }
}

// draw walls and marks as ASCII art. the agent is '@', the goal 'G' and the start 'S'.
impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity((self.cols * 4 + 2) * (self.rows * 2 + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                s.push('+');
                s.push_str(horizontal(
                    self.boundary(Position::new(row, col), Direction::North),
                ));
            }
            s.push_str("+\n");

            for col in 0..self.cols {
                let position = Position::new(row, col);
                let cell = &self.cells[row * self.cols + col];
                s.push(vertical(self.boundary(position, Direction::West)));
                let c = if cell.is_current() {
                    '@'
                } else if cell.is_goal() {
                    'G'
                } else if cell.is_start() {
                    'S'
                } else {
                    ' '
                };
                s.push(' ');
                s.push(c);
                s.push(' ');
            }
            let last = Position::new(row, self.cols - 1);
            s.push(vertical(self.boundary(last, Direction::East)));
            s.push('\n');
        }
        for col in 0..self.cols {
            s.push('+');
            s.push_str(horizontal(
                self.boundary(Position::new(self.rows - 1, col), Direction::South),
            ));
        }
        s.push('+');
        write!(f, "{}", s)
    }
}
