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

//! Junction decisions.
//!
//! Tremaux's rules, applied after the way in has been marked:
//! - Never enter a passage that has two marks.
//! - At a junction with no marks besides the way in, take a random unmarked passage.
//! - Else if the way in has only one mark, turn around.
//! - Else take a random passage with the fewest marks.
//!
//! The modified policy builds the same candidates, then prefers the ones that head towards the
//! exit.

use maze_logic::{Cell, Direction, EdgeState, Position};
use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Which junction rule the agent follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// Classical Tremaux, random among equals.
    Tremaux,

    /// Tremaux biased towards the known exit coordinates.
    Modified,
}

impl Policy {
    /// Every policy, in the order a benchmark runs them.
    pub const ALL: [Policy; 2] = [Policy::Tremaux, Policy::Modified];
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Tremaux => write!(f, "Tremaux"),
            Policy::Modified => write!(f, "Modified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy: {0:?}, expected tremaux or modified")]
pub struct UnknownPolicy(String);

impl std::str::FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tremaux" => Ok(Policy::Tremaux),
            "modified" => Ok(Policy::Modified),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Whether every edge other than the way in is unmarked or a wall.
pub fn is_unmarked_junction(cell: &Cell, came_from: Option<Direction>) -> bool {
    Direction::ALL
        .into_iter()
        .filter(|d| Some(*d) != came_from)
        .all(|d| matches!(cell.edge(d), EdgeState::Unmarked | EdgeState::Wall))
}

// first edge in `wanted` state other than the way in, scanning round from `offset`.
fn scan_from(
    cell: &Cell,
    came_from: Option<Direction>,
    offset: usize,
    wanted: EdgeState,
) -> Option<Direction> {
    (offset..offset + 4)
        .map(Direction::from_index)
        .find(|d| Some(*d) != came_from && cell.edge(*d) == wanted)
}

fn others(
    cell: &Cell,
    came_from: Option<Direction>,
    wanted: impl Fn(EdgeState) -> bool,
) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|d| Some(*d) != came_from && wanted(cell.edge(*d)))
        .collect()
}

/// Choose the way out of a junction with the classical rules. `cell` must already have the way
/// in marked. `None` means no passage is left, which a correct traversal never reaches.
pub fn tremaux_choice<R>(cell: &Cell, came_from: Option<Direction>, rng: &mut R) -> Option<Direction>
where
    R: RandomSource + ?Sized,
{
    if is_unmarked_junction(cell, came_from) {
        let offset = rng.pick(4);
        return scan_from(cell, came_from, offset, EdgeState::Unmarked);
    }
    if let Some(back) = came_from {
        if cell.edge(back) == EdgeState::MarkedOnce {
            return Some(back);
        }
    }
    let offset = rng.pick(4);
    scan_from(cell, came_from, offset, EdgeState::Unmarked)
        .or_else(|| scan_from(cell, came_from, offset, EdgeState::MarkedOnce))
}

/// Choose the way out of a junction with the goal-biased rules. `cell` must already have the way
/// in marked.
pub fn modified_choice<R>(
    cell: &Cell,
    came_from: Option<Direction>,
    here: Position,
    goal: Option<Position>,
    rng: &mut R,
) -> Option<Direction>
where
    R: RandomSource + ?Sized,
{
    let candidates = if is_unmarked_junction(cell, came_from) {
        others(cell, came_from, |e| !e.is_wall())
    } else if let Some(back) = came_from.filter(|d| cell.edge(*d) == EdgeState::MarkedOnce) {
        return Some(back);
    } else {
        let unmarked = others(cell, came_from, |e| e == EdgeState::Unmarked);
        if unmarked.is_empty() {
            others(cell, came_from, |e| e == EdgeState::MarkedOnce)
        } else {
            unmarked
        }
    };
    toward_goal(&candidates, here, goal, rng)
}

/// Does moving this way strictly shorten the row or column distance to the goal.
pub fn reduces_distance(direction: Direction, here: Position, goal: Position) -> bool {
    match direction {
        Direction::North => here.row > goal.row,
        Direction::South => here.row < goal.row,
        Direction::East => here.col < goal.col,
        Direction::West => here.col > goal.col,
    }
}

/// Does moving this way avoid going straight away from the goal. A north or south move is fine
/// unless the agent is already in the goal's column, and likewise east or west and the row.
pub fn avoids_moving_away(direction: Direction, here: Position, goal: Position) -> bool {
    match direction {
        Direction::North | Direction::South => here.col != goal.col,
        Direction::East | Direction::West => here.row != goal.row,
    }
}

/// Rank candidates by goal proximity, then pick uniformly within the best non-empty tier.
pub fn toward_goal<R>(
    candidates: &[Direction],
    here: Position,
    goal: Option<Position>,
    rng: &mut R,
) -> Option<Direction>
where
    R: RandomSource + ?Sized,
{
    let goal = match (candidates, goal) {
        ([], _) => return None,
        ([only], _) => return Some(*only),
        (_, None) => return Some(choose(candidates, rng)),
        (_, Some(goal)) => goal,
    };

    let ideal: Vec<Direction> = candidates
        .iter()
        .copied()
        .filter(|d| reduces_distance(*d, here, goal))
        .collect();
    if !ideal.is_empty() {
        return Some(choose(&ideal, rng));
    }

    let sideways: Vec<Direction> = candidates
        .iter()
        .copied()
        .filter(|d| avoids_moving_away(*d, here, goal))
        .collect();
    if sideways.is_empty() {
        Some(choose(candidates, rng))
    } else {
        Some(choose(&sideways, rng))
    }
}

fn choose<R: RandomSource + ?Sized>(options: &[Direction], rng: &mut R) -> Direction {
    options[rng.pick(options.len()) % options.len()]
}
