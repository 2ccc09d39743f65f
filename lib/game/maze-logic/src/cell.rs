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

//! Cells, their edges, and the four compass directions.

use serde::{Deserialize, Serialize};

use crate::Violation;

/// Compass direction. The discriminant is the index of the matching edge in a [`Cell`] and the
/// bit of the matching wall in the maze encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    North = 0,

    /// Towards the last column.
    East = 1,

    /// Towards the last row.
    South = 2,

    /// Towards column 0.
    West = 3,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Get the direction for an index, wrapping around modulo 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Get the index of this direction, 0 to 3.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the direction pointing the other way.
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Get the (row, col) offset of one move in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "north"),
            Direction::East => write!(f, "east"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
        }
    }
}

/// State of one edge of a cell. Marks count how many times the agent went through the passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeState {
    /// Impassable. Never changes.
    Wall,

    /// Open and never walked.
    Unmarked,

    /// Open and walked once.
    MarkedOnce,

    /// Open and walked twice. The agent must never enter it again.
    MarkedTwice,
}

impl EdgeState {
    /// Is this edge a wall.
    pub fn is_wall(self) -> bool {
        self == EdgeState::Wall
    }

    /// Get the state after one more mark, or `None` if the edge cannot take another mark.
    pub fn advanced(self) -> Option<Self> {
        match self {
            EdgeState::Unmarked => Some(EdgeState::MarkedOnce),
            EdgeState::MarkedOnce => Some(EdgeState::MarkedTwice),
            EdgeState::Wall | EdgeState::MarkedTwice => None,
        }
    }
}

/// How the agent treats a cell, based on how many walls it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Pass straight through without marking.
    Corridor,

    /// Turn around without marking.
    DeadEnd,

    /// Mark the way in and the way out.
    Junction,
}

/// One square of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    edges: [EdgeState; 4],
    is_goal: bool,
    is_start: bool,
    is_current: bool,
}

impl Cell {
    /// Create a cell from its four edges, indexed by [`Direction`].
    pub fn new(edges: [EdgeState; 4], is_goal: bool) -> Self {
        Self {
            edges,
            is_goal,
            is_start: false,
            is_current: false,
        }
    }

    /// Create a cell from its encoded value. Bit `i` set means the edge for direction `i` is a
    /// wall. A value above 15 flags the goal, and only the low 4 bits are used for walls.
    pub fn from_code(code: u32) -> Self {
        let mut edges = [EdgeState::Unmarked; 4];
        for direction in Direction::ALL {
            if (code >> direction.index()) & 1 == 1 {
                edges[direction.index()] = EdgeState::Wall;
            }
        }
        Self::new(edges, code > 15)
    }

    /// Get the edge in a direction.
    pub fn edge(&self, direction: Direction) -> EdgeState {
        self.edges[direction.index()]
    }

    /// Get all four edges, indexed by [`Direction`].
    pub fn edges(&self) -> [EdgeState; 4] {
        self.edges
    }

    /// Count the edges that are walls.
    pub fn wall_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_wall()).count()
    }

    /// Iterate over the directions without a wall, in index order.
    pub fn open_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| !self.edge(*d).is_wall())
    }

    /// Get the walls as the low 4 bits of the maze encoding.
    pub fn wall_bits(&self) -> u8 {
        Direction::ALL
            .into_iter()
            .filter(|d| self.edge(*d).is_wall())
            .fold(0, |bits, d| bits | (1 << d.index()))
    }

    /// Classify the cell. On the very first step a cell with three walls is passed through like
    /// a corridor, because there is exactly one way out.
    pub fn kind(&self, first_step: bool) -> CellKind {
        match self.wall_count() {
            2 => CellKind::Corridor,
            3 if first_step => CellKind::Corridor,
            3 | 4 => CellKind::DeadEnd,
            _ => CellKind::Junction,
        }
    }

    /// Is this the goal cell.
    pub fn is_goal(&self) -> bool {
        self.is_goal
    }

    /// Is this where the current run started.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    /// Is the agent in this cell.
    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Advance the mark on an edge by one, returning the new state. `None` means there is no
    /// direction to mark, e.g. on the first step of a run, and does nothing.
    pub fn mark(&mut self, direction: Option<Direction>) -> Result<Option<EdgeState>, Violation> {
        let Some(direction) = direction else {
            return Ok(None);
        };
        let edge = &mut self.edges[direction.index()];
        match edge.advanced() {
            Some(next) => {
                *edge = next;
                Ok(Some(next))
            }
            None if edge.is_wall() => Err(Violation::MarkWall(direction)),
            None => Err(Violation::MarkSaturated(direction)),
        }
    }

    /// Reset every open edge to unmarked. Walls and flags are left alone. Returns whether any
    /// edge changed.
    pub fn clear_marks(&mut self) -> bool {
        let mut changed = false;
        for edge in self.edges.iter_mut() {
            if !edge.is_wall() && *edge != EdgeState::Unmarked {
                *edge = EdgeState::Unmarked;
                changed = true;
            }
        }
        changed
    }

    /// Flag this cell as the start of the run.
    pub fn set_start(&mut self) {
        self.is_start = true;
    }

    /// Remove the start flag.
    pub fn clear_start(&mut self) {
        self.is_start = false;
    }

    /// Set whether the agent is in this cell.
    pub fn set_current(&mut self, current: bool) {
        self.is_current = current;
    }
}

// walls as four 0/1 characters in direction order, e.g. "1010" for a north-south wall pair.
impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for direction in Direction::ALL {
            let c = if self.edge(direction).is_wall() { '1' } else { '0' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
