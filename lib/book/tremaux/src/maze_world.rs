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

use maze_logic::{
    Cell, CellKind, Direction, Grid, MazeError, MazeEvent, MazeObserver, Observers, Position,
    Violation,
};

use crate::policy::{modified_choice, tremaux_choice, Policy};
use crate::random::RandomSource;
use crate::{Agent, Environment};

/// LocalPercept is everything the agent can sense from where it stands: its own cell, its
/// coordinates, and the coordinates of the exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPercept {
    pub position: Position,
    pub cell: Cell,
    pub goal: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MazeAction {
    /// Walk through a corridor.
    Pass(Direction),

    /// Leave a dead end the way we came.
    TurnBack(Direction),

    /// Mark the way in (if there is one) and the way out, then leave.
    Junction {
        entry: Option<Direction>,
        exit: Direction,
    },
}

impl MazeAction {
    /// Which way the agent moves.
    pub fn direction(&self) -> Direction {
        match *self {
            MazeAction::Pass(d) | MazeAction::TurnBack(d) => d,
            MazeAction::Junction { exit, .. } => exit,
        }
    }
}

/// Tremaux agent. It remembers only the direction it entered the current cell from.
pub struct TremauxAgent<'r, R: RandomSource + ?Sized> {
    policy: Policy,
    came_from: Option<Direction>,
    rng: &'r mut R,
}

impl<'r, R: RandomSource + ?Sized> TremauxAgent<'r, R> {
    pub fn new(policy: Policy, rng: &'r mut R) -> Self {
        Self {
            policy,
            came_from: None,
            rng,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The edge of the current cell the agent came in through, `None` before the first move.
    pub fn came_from(&self) -> Option<Direction> {
        self.came_from
    }
}

impl<'r, R: RandomSource + ?Sized> Agent for TremauxAgent<'r, R> {
    type Action = MazeAction;
    type Percept = LocalPercept;
    type Error = MazeError;

    fn act(&mut self, percept: &Self::Percept) -> Result<Self::Action, Self::Error> {
        let position = percept.position;
        let broken = move |violation: Violation| MazeError::InvariantViolation {
            position,
            violation,
        };
        let cell = percept.cell;

        let action = match cell.kind(self.came_from.is_none()) {
            CellKind::Corridor => {
                let next = cell
                    .open_directions()
                    .find(|d| Some(*d) != self.came_from)
                    .ok_or_else(|| broken(Violation::NoCandidate))?;
                MazeAction::Pass(next)
            }
            CellKind::DeadEnd => {
                let back = self
                    .came_from
                    .ok_or_else(|| broken(Violation::NoCandidate))?;
                MazeAction::TurnBack(back)
            }
            CellKind::Junction => {
                // decide on a copy with the way in marked, exactly as the world will mark it.
                let mut view = cell;
                view.mark(self.came_from).map_err(broken)?;
                let exit = match self.policy {
                    Policy::Tremaux => tremaux_choice(&view, self.came_from, &mut *self.rng),
                    Policy::Modified => modified_choice(
                        &view,
                        self.came_from,
                        position,
                        percept.goal,
                        &mut *self.rng,
                    ),
                }
                .ok_or_else(|| broken(Violation::NoCandidate))?;
                view.mark(Some(exit)).map_err(broken)?;
                tracing::debug!(
                    policy = %self.policy,
                    %position,
                    came_from = ?self.came_from,
                    %exit,
                    "junction"
                );
                MazeAction::Junction {
                    entry: self.came_from,
                    exit,
                }
            }
        };

        self.came_from = Some(action.direction().opposite());
        Ok(action)
    }
}

/// The maze as the agent's environment. Owns the grid, the agent's position and the step count,
/// and tells observers about every change.
#[derive(Debug)]
pub struct MazeWorld {
    grid: Grid,
    observers: Observers,
    start: Option<Position>,
    position: Position,
    steps: usize,
}

impl MazeWorld {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            observers: Observers::new(),
            start: None,
            position: Position::new(0, 0),
            steps: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn add_observer(&mut self, observer: Box<dyn MazeObserver>) {
        self.observers.add(observer);
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Put the agent on its start cell. Fails if the position is off the grid or the grid has
    /// nowhere to go.
    pub fn place_agent(&mut self, start: Position) -> Result<(), MazeError> {
        self.grid.check(start)?;
        if self.grid.goal().is_none() {
            return Err(MazeError::NoGoal);
        }

        self.start = Some(start);
        self.position = start;
        self.steps = 0;
        self.grid.cell_mut(start)?.set_start();
        self.observers.notify(MazeEvent::StartSet { position: start });
        self.set_current(start, true)
    }

    /// Clear every mark and flag, and put the agent back where it started.
    pub fn reset(&mut self) {
        for event in self.grid.clear_marks() {
            self.observers.notify(event);
        }
        if let Some(start) = self.start {
            self.position = start;
        }
        self.steps = 0;
    }

    fn set_current(&mut self, position: Position, current: bool) -> Result<(), MazeError> {
        self.grid.cell_mut(position)?.set_current(current);
        self.observers
            .notify(MazeEvent::CurrentChanged { position, current });
        Ok(())
    }

    fn mark(&mut self, direction: Option<Direction>) -> Result<(), MazeError> {
        let position = self.position;
        let Some(direction) = direction else {
            return Ok(());
        };
        let state = self
            .grid
            .cell_mut(position)?
            .mark(Some(direction))
            .map_err(|violation| MazeError::InvariantViolation {
                position,
                violation,
            })?;
        if let Some(state) = state {
            self.observers.notify(MazeEvent::EdgeMarked {
                position,
                direction,
                state,
            });
        }
        Ok(())
    }

    fn move_agent(&mut self, direction: Direction) -> Result<(), MazeError> {
        let from = self.position;
        let to = from
            .step(direction, self.grid.rows(), self.grid.cols())
            .ok_or(MazeError::InvariantViolation {
                position: from,
                violation: Violation::LeavesGrid(direction),
            })?;
        self.set_current(from, false)?;
        self.position = to;
        self.steps += 1;
        self.set_current(to, true)?;
        tracing::trace!(%from, %to, steps = self.steps, "move");
        Ok(())
    }
}

impl Environment for MazeWorld {
    type Action = MazeAction;
    type Percept = LocalPercept;
    type Score = usize;
    type Error = MazeError;

    fn percept(&self) -> Result<Self::Percept, Self::Error> {
        Ok(LocalPercept {
            position: self.position,
            cell: *self.grid.cell(self.position)?,
            goal: self.grid.goal(),
        })
    }

    fn execute_action(&mut self, action: &Self::Action) -> Result<(), Self::Error> {
        match *action {
            MazeAction::Pass(direction) | MazeAction::TurnBack(direction) => {
                self.move_agent(direction)
            }
            MazeAction::Junction { entry, exit } => {
                self.mark(entry)?;
                self.mark(Some(exit))?;
                self.move_agent(exit)
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.grid.get(self.position).map_or(false, Cell::is_goal)
    }

    fn score(&self) -> Self::Score {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use maze_logic::EdgeState;

    use super::*;
    use crate::random::SequenceSource;

    // 1x3 corridor: start on the west end, goal on the east end.
    fn corridor() -> Grid {
        "1 3 0  13 5 23".parse().unwrap()
    }

    fn percept_at(row: usize, col: usize, cell: Cell) -> LocalPercept {
        LocalPercept {
            position: Position::new(row, col),
            cell,
            goal: Some(Position::new(9, 9)),
        }
    }

    #[test]
    fn test_agent_passes_through_corridor_without_marking() {
        let mut rng = SequenceSource::new(vec![0]);
        let mut agent = TremauxAgent::new(Policy::Tremaux, &mut rng);
        let action = agent.act(&percept_at(0, 0, Cell::from_code(0b1101))).unwrap();
        assert_eq!(action, MazeAction::Pass(Direction::East));
        assert_eq!(agent.came_from(), Some(Direction::West));
        let action = agent.act(&percept_at(0, 1, Cell::from_code(0b0101))).unwrap();
        assert_eq!(action, MazeAction::Pass(Direction::East));
    }

    #[test]
    fn test_agent_turns_back_in_dead_end() {
        let mut rng = SequenceSource::new(vec![0]);
        let mut agent = TremauxAgent::new(Policy::Tremaux, &mut rng);
        agent.act(&percept_at(0, 0, Cell::from_code(0b0101))).unwrap();
        let action = agent.act(&percept_at(0, 1, Cell::from_code(0b0111))).unwrap();
        assert_eq!(action, MazeAction::TurnBack(Direction::West));
        assert_eq!(agent.came_from(), Some(Direction::East));
    }

    #[test]
    fn test_agent_marks_at_junction() {
        let mut rng = SequenceSource::new(vec![2]);
        let mut agent = TremauxAgent::new(Policy::Tremaux, &mut rng);
        agent.act(&percept_at(0, 0, Cell::from_code(0b0101))).unwrap();
        let action = agent.act(&percept_at(0, 1, Cell::from_code(0))).unwrap();
        assert_eq!(
            action,
            MazeAction::Junction {
                entry: Some(Direction::West),
                exit: Direction::South
            }
        );
    }

    #[test]
    fn test_entering_through_own_wall_is_a_violation() {
        // the previous cell let us through its east edge, but this cell's west edge is a wall.
        let mut rng = SequenceSource::new(vec![0]);
        let mut agent = TremauxAgent::new(Policy::Tremaux, &mut rng);
        agent.act(&percept_at(0, 0, Cell::from_code(0b0101))).unwrap();
        let err = agent
            .act(&percept_at(0, 1, Cell::from_code(0b1000)))
            .unwrap_err();
        assert_eq!(
            err,
            MazeError::InvariantViolation {
                position: Position::new(0, 1),
                violation: Violation::MarkWall(Direction::West)
            }
        );
    }

    #[test]
    fn test_walled_in_start_is_a_violation() {
        let mut rng = SequenceSource::new(vec![0]);
        let mut agent = TremauxAgent::new(Policy::Modified, &mut rng);
        let err = agent.act(&percept_at(0, 0, Cell::from_code(15))).unwrap_err();
        assert!(matches!(
            err,
            MazeError::InvariantViolation {
                violation: Violation::NoCandidate,
                ..
            }
        ));
    }

    #[test]
    fn test_world_moves_and_counts_steps() {
        let mut world = MazeWorld::new(corridor());
        world.place_agent(Position::new(0, 0)).unwrap();
        assert!(!world.is_terminal());
        world
            .execute_action(&MazeAction::Pass(Direction::East))
            .unwrap();
        world
            .execute_action(&MazeAction::Pass(Direction::East))
            .unwrap();
        assert!(world.is_terminal());
        assert_eq!(world.score(), 2);
        assert!(world.grid().cell(Position::new(0, 2)).unwrap().is_current());
        assert!(!world.grid().cell(Position::new(0, 0)).unwrap().is_current());
    }

    #[test]
    fn test_world_rejects_leaving_grid() {
        let mut world = MazeWorld::new("1 1 0 16".parse().unwrap());
        world.place_agent(Position::new(0, 0)).unwrap();
        assert_eq!(
            world.execute_action(&MazeAction::Pass(Direction::North)),
            Err(MazeError::InvariantViolation {
                position: Position::new(0, 0),
                violation: Violation::LeavesGrid(Direction::North)
            })
        );
        assert_eq!(world.score(), 0);
    }

    #[test]
    fn test_place_agent_errors() {
        let mut world = MazeWorld::new(corridor());
        assert!(matches!(
            world.place_agent(Position::new(1, 0)),
            Err(MazeError::OutOfBounds { .. })
        ));
        let mut no_goal = MazeWorld::new("1 2 0 13 7".parse().unwrap());
        assert_eq!(
            no_goal.place_agent(Position::new(0, 0)),
            Err(MazeError::NoGoal)
        );
    }

    #[test]
    fn test_world_notifies_observers() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = MazeWorld::new("1 3 0  13 1 23".parse().unwrap());
        {
            let events = Rc::clone(&events);
            world.add_observer(Box::new(move |e: &MazeEvent| events.borrow_mut().push(*e)));
        }
        world.place_agent(Position::new(0, 0)).unwrap();
        world
            .execute_action(&MazeAction::Pass(Direction::East))
            .unwrap();
        world
            .execute_action(&MazeAction::Junction {
                entry: Some(Direction::West),
                exit: Direction::East,
            })
            .unwrap();
        world.reset();

        let start = Position::new(0, 0);
        let middle = Position::new(0, 1);
        let goal = Position::new(0, 2);
        assert_eq!(
            *events.borrow(),
            vec![
                MazeEvent::StartSet { position: start },
                MazeEvent::CurrentChanged { position: start, current: true },
                MazeEvent::CurrentChanged { position: start, current: false },
                MazeEvent::CurrentChanged { position: middle, current: true },
                MazeEvent::EdgeMarked {
                    position: middle,
                    direction: Direction::West,
                    state: EdgeState::MarkedOnce
                },
                MazeEvent::EdgeMarked {
                    position: middle,
                    direction: Direction::East,
                    state: EdgeState::MarkedOnce
                },
                MazeEvent::CurrentChanged { position: middle, current: false },
                MazeEvent::CurrentChanged { position: goal, current: true },
                MazeEvent::MarksCleared { position: middle },
                MazeEvent::CurrentChanged { position: goal, current: false },
            ]
        );
        assert_eq!(world.position(), start);
        assert_eq!(world.score(), 0);
    }
}
