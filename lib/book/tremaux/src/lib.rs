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

// Maze exploration with Tremaux's algorithm, as an online search agent.
//
// See:
// -  Chapter 2: Intelligent Agents, page 40 (PEAS)
// -  Chapter 4: Search in Complex Environments, online search agents and unknown environments

pub mod maze_world;
pub mod policy;
pub mod random;
pub mod run;

#[cfg(test)]
mod test_mazes;

pub use maze_world::{LocalPercept, MazeAction, MazeWorld, TremauxAgent};
pub use policy::Policy;
pub use random::{RandomSource, SequenceSource};
pub use run::{MazeRun, RunConfig, RunError, RunRecord, RunState};

pub type Rng = rand_pcg::Pcg64;

/// An Agent acts in a Performance, Environment, Action, Sensing (PEAS) cycle.
/// For a given Perception, the Agent will return an Action.
///
/// A maze agent only ever sees the cell it stands in, so anything it needs to remember between
/// cells (e.g. which way it came in) is its own state.
///
/// Notice that the Agent is not aware of an Environment, it's only interface
/// is the Perception coming in then the Action going out.
pub trait Agent {
    type Action;
    type Percept;
    type Error;

    fn act(&mut self, percept: &Self::Percept) -> Result<Self::Action, Self::Error>;
}

/// An Environment runs a single Agent in a Performance, Environment, Action, Sensing (PEAS) cycle.
///
/// Notice that the Environment is not aware of an Agent.
pub trait Environment {
    type Action;
    type Percept;
    type Score: num_traits::NumAssign + Copy;
    type Error;

    fn percept(&self) -> Result<Self::Percept, Self::Error>;
    fn execute_action(&mut self, action: &Self::Action) -> Result<(), Self::Error>;

    /// Whether the agent has reached a state where it stops acting.
    fn is_terminal(&self) -> bool;

    /// Returns the score of the Environment. This is not cumulative or stateful. This is the score
    /// of the Environment at the current state.
    fn score(&self) -> Self::Score;
}

/// Run one PEAS cycle: sense, decide, act.
pub fn step<_Environment, _Agent>(
    environment: &mut _Environment,
    agent: &mut _Agent,
) -> Result<(), _Environment::Error>
where
    _Environment: Environment,
    _Agent: Agent<
        Action = _Environment::Action,
        Percept = _Environment::Percept,
        Error = _Environment::Error,
    >,
{
    let percept = environment.percept()?;
    let action = agent.act(&percept)?;
    environment.execute_action(&action)
}
