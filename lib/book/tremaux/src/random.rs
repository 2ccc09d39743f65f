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

use rand::Rng as _;

/// Where the tie-breaks come from. Any `rand` generator works; [`SequenceSource`] replays fixed
/// indices so a test can force every choice.
pub trait RandomSource {
    /// Pick an index in `0..bound`. `bound` is never zero.
    fn pick(&mut self, bound: usize) -> usize;
}

impl<R: rand::RngCore> RandomSource for R {
    fn pick(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

/// Replays a fixed list of indices, cycling when it runs out. Each value is reduced modulo the
/// requested bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSource {
    values: Vec<usize>,
    next: usize,
}

impl SequenceSource {
    /// Replay `values` from the start.
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// How many picks have been made so far.
    pub fn picks(&self) -> usize {
        self.next
    }
}

impl RandomSource for SequenceSource {
    fn pick(&mut self, bound: usize) -> usize {
        if self.values.is_empty() || bound == 0 {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value % bound
    }
}
