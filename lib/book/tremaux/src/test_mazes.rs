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

//! Maze generators for tests.

use maze_logic::{Cell, Direction, Grid, Position};
use rand::seq::SliceRandom;
use rand::{Rng as _, SeedableRng};

/// Carve a connected maze with a randomized depth-first search, then knock down `extra` more
/// interior walls to make loops. Walls always agree between neighbours. The goal is a random
/// cell.
pub fn random_maze(rows: usize, cols: usize, extra: usize, seed: u64) -> Grid {
    let mut rng = crate::Rng::seed_from_u64(seed);
    let index = |p: Position| p.row * cols + p.col;
    let mut codes = vec![15u32; rows * cols];
    let mut visited = vec![false; rows * cols];

    let open = |codes: &mut Vec<u32>, from: Position, direction: Direction, to: Position| {
        codes[index(from)] &= !(1 << direction.index());
        codes[index(to)] &= !(1 << direction.opposite().index());
    };

    let mut stack = vec![Position::new(0, 0)];
    visited[0] = true;
    while let Some(&here) = stack.last() {
        let options: Vec<(Direction, Position)> = Direction::ALL
            .into_iter()
            .filter_map(|d| here.step(d, rows, cols).map(|p| (d, p)))
            .filter(|(_, p)| !visited[index(*p)])
            .collect();
        match options.choose(&mut rng) {
            None => {
                stack.pop();
            }
            Some(&(direction, next)) => {
                open(&mut codes, here, direction, next);
                visited[index(next)] = true;
                stack.push(next);
            }
        }
    }

    for _ in 0..extra {
        let here = Position::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
        let direction = Direction::from_index(rng.gen_range(0..4));
        if let Some(next) = here.step(direction, rows, cols) {
            open(&mut codes, here, direction, next);
        }
    }

    let goal = rng.gen_range(0..rows * cols);
    codes[goal] += 16;
    Grid::new(rows, cols, extra as i32, codes.into_iter().map(Cell::from_code).collect())
        .expect("generated maze has rows * cols cells")
}
