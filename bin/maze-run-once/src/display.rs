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

use std::io::Write;

use maze_logic::{MazeEvent, MazeObserver};

/// Prints the agent's moves and marks as they happen.
pub struct TerminalDisplay<W: Write> {
    out: W,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, event: &MazeEvent) -> std::io::Result<()> {
        match *event {
            MazeEvent::StartSet { position } => writeln!(self.out, "start {position}"),
            MazeEvent::CurrentChanged {
                position,
                current: true,
            } => writeln!(self.out, "  -> {position}"),
            MazeEvent::EdgeMarked {
                position,
                direction,
                state,
            } => writeln!(self.out, "     mark {direction} of {position}: {state:?}"),
            MazeEvent::CurrentChanged { current: false, .. } | MazeEvent::MarksCleared { .. } => {
                Ok(())
            }
        }
    }
}

impl<W: Write> MazeObserver for TerminalDisplay<W> {
    fn notify(&mut self, event: &MazeEvent) {
        if let Err(err) = self.line(event) {
            tracing::warn!(%err, "cannot write to display");
        }
    }
}
