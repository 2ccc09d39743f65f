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

//! Change notifications for anything that wants to watch a maze being explored, e.g. a display.
//!
//! Nothing in the maze logic requires an observer. With none attached, notifying is a no-op.

use crate::cell::{Direction, EdgeState};
use crate::grid::Position;

/// Something observable changed in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MazeEvent {
    /// The mark on an edge advanced.
    EdgeMarked {
        /// The cell.
        position: Position,

        /// Which of its edges.
        direction: Direction,

        /// The new state of the edge.
        state: EdgeState,
    },

    /// Every mark in a cell was cleared.
    MarksCleared {
        /// The cell.
        position: Position,
    },

    /// The cell became the start of a run.
    StartSet {
        /// The cell.
        position: Position,
    },

    /// The agent entered or left the cell.
    CurrentChanged {
        /// The cell.
        position: Position,

        /// Whether the agent is now in the cell.
        current: bool,
    },
}

/// Receives maze change notifications.
pub trait MazeObserver {
    /// Called after the change has been applied.
    fn notify(&mut self, event: &MazeEvent);
}

impl<F> MazeObserver for F
where
    F: FnMut(&MazeEvent),
{
    fn notify(&mut self, event: &MazeEvent) {
        self(event)
    }
}

/// Logs every event at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MazeObserver for TracingObserver {
    fn notify(&mut self, event: &MazeEvent) {
        tracing::trace!(?event, "maze event");
    }
}

/// Zero or more observers.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn MazeObserver>>,
}

impl Observers {
    /// Create an empty set of observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer.
    pub fn add(&mut self, observer: Box<dyn MazeObserver>) {
        self.observers.push(observer);
    }

    /// Are there no observers.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Send an event to every observer, in the order they were attached.
    pub fn notify(&mut self, event: MazeEvent) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.observers.len())
            .finish()
    }
}
