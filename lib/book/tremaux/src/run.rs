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

use std::time::Duration;

use maze_logic::{Grid, MazeError, MazeObserver, Position, Violation};
use serde::{Deserialize, Serialize};

use crate::maze_world::{MazeWorld, TremauxAgent};
use crate::policy::Policy;
use crate::random::RandomSource;
use crate::Environment;

/// Where a [`MazeRun`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// No agent placed; ready for `start`.
    Idle,

    /// Agent placed; ready for `run`.
    Running,

    /// The agent reached the goal. `reset` before the next run.
    Finished,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Finished => write!(f, "finished"),
        }
    }
}

/// Limits and pacing for a [`MazeRun`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Give up with a step limit violation after this many moves. `None` trusts the traversal to
    /// terminate, which it does whenever walls agree between neighbouring cells.
    pub max_steps: Option<usize>,

    /// Sleep this long after every move, but only while an observer is attached.
    pub pace: Option<Duration>,
}

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunRecord {
    pub policy: Policy,

    /// Copied from the maze header.
    pub connectivity: i32,

    /// Moves from the start to the goal.
    pub steps: usize,

    pub maze_id: String,
    pub start: Position,
}

/// Why a run could not start or finish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("maze {maze_id}: run is {actual}, expected {expected}")]
    WrongState {
        maze_id: String,
        expected: RunState,
        actual: RunState,
    },

    #[error("maze {maze_id}: cannot start run: {source}")]
    Setup {
        maze_id: String,
        #[source]
        source: MazeError,
    },

    #[error("maze {maze_id}: {policy} run failed at {position} after {steps} steps: {source}")]
    Failed {
        maze_id: String,
        policy: Policy,
        position: Position,
        steps: usize,
        #[source]
        source: MazeError,
    },
}

/// Runs the agent through one maze, one start position and policy at a time.
///
/// `start` moves from Idle to Running, `run` from Running to Finished, and `reset` puts the grid
/// back the way it was loaded and returns to Idle, so the same grid can be used again.
#[derive(Debug)]
pub struct MazeRun {
    maze_id: String,
    config: RunConfig,
    world: MazeWorld,
    state: RunState,
}

impl MazeRun {
    pub fn new(maze_id: impl Into<String>, grid: Grid, config: RunConfig) -> Self {
        Self {
            maze_id: maze_id.into(),
            config,
            world: MazeWorld::new(grid),
            state: RunState::Idle,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn MazeObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn MazeObserver>) {
        self.world.add_observer(observer);
    }

    pub fn maze_id(&self) -> &str {
        &self.maze_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        self.world.grid()
    }

    pub fn position(&self) -> Position {
        self.world.position()
    }

    pub fn steps(&self) -> usize {
        self.world.score()
    }

    /// Put the agent on `start`. The grid must have a goal and `start` must be on it.
    pub fn start(&mut self, start: Position) -> Result<(), RunError> {
        self.expect_state(RunState::Idle)?;
        self.world
            .place_agent(start)
            .map_err(|source| RunError::Setup {
                maze_id: self.maze_id.clone(),
                source,
            })?;
        self.state = RunState::Running;
        Ok(())
    }

    /// Let the agent explore until it stands on the goal.
    ///
    /// On failure the run stays Running with the grid as it was when the violation happened, so
    /// it can be inspected. Call `reset` before using the grid again.
    pub fn run<R>(&mut self, policy: Policy, rng: &mut R) -> Result<RunRecord, RunError>
    where
        R: RandomSource + ?Sized,
    {
        self.expect_state(RunState::Running)?;
        let mut agent = TremauxAgent::new(policy, rng);
        while !self.world.is_terminal() {
            if let Some(limit) = self.config.max_steps {
                if self.world.score() >= limit {
                    let source = MazeError::InvariantViolation {
                        position: self.world.position(),
                        violation: Violation::StepLimit(limit),
                    };
                    return Err(self.failure(policy, source));
                }
            }
            if let Err(source) = crate::step(&mut self.world, &mut agent) {
                return Err(self.failure(policy, source));
            }
            if let Some(pace) = self.config.pace {
                if self.world.has_observers() {
                    std::thread::sleep(pace);
                }
            }
        }

        self.state = RunState::Finished;
        let record = RunRecord {
            policy,
            connectivity: self.world.grid().connectivity(),
            steps: self.world.score(),
            maze_id: self.maze_id.clone(),
            start: self.world.start().unwrap_or_else(|| self.world.position()),
        };
        tracing::info!(
            maze_id = %record.maze_id,
            %policy,
            start = %record.start,
            steps = record.steps,
            "run finished"
        );
        Ok(record)
    }

    /// Clear all marks and flags, put the agent back on its start, and go back to Idle.
    pub fn reset(&mut self) {
        self.world.reset();
        self.state = RunState::Idle;
    }

    /// Run every policy in turn from the same start, resetting the grid after each one. There is
    /// one outcome per policy, in order; a failed run does not stop the ones after it. The grid is
    /// always left reset.
    pub fn evaluate<R>(
        &mut self,
        start: Position,
        policies: &[Policy],
        rng: &mut R,
    ) -> Vec<Result<RunRecord, RunError>>
    where
        R: RandomSource + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(policies.len());
        for &policy in policies {
            let result = self
                .start(start)
                .and_then(|()| self.run(policy, &mut *rng));
            self.reset();
            outcomes.push(result);
        }
        outcomes
    }

    fn expect_state(&self, expected: RunState) -> Result<(), RunError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RunError::WrongState {
                maze_id: self.maze_id.clone(),
                expected,
                actual: self.state,
            })
        }
    }

    fn failure(&self, policy: Policy, source: MazeError) -> RunError {
        tracing::debug!(maze_id = %self.maze_id, %policy, %source, "run failed");
        RunError::Failed {
            maze_id: self.maze_id.clone(),
            policy,
            position: self.world.position(),
            steps: self.world.score(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_logic::{EdgeState, MazeEvent};
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::random::SequenceSource;
    use crate::test_mazes::random_maze;

    // 3x3, a straight corridor along the top row to the goal at (0,2), everything else walled.
    const TOP_CORRIDOR: &str = "3 3 4\n13 5 23\n15 15 15\n15 15 15\n";

    // 3x3, open everywhere inside the outer wall, goal in the bottom-right corner.
    const OPEN_ROOM: &str = "3 3 9\n9 1 3\n8 0 2\n12 4 22\n";

    fn rng() -> crate::Rng {
        crate::Rng::seed_from_u64(42)
    }

    #[test]
    fn test_straight_corridor_takes_two_steps() {
        let grid: Grid = TOP_CORRIDOR.parse().unwrap();
        let mut run = MazeRun::new("corridor", grid, RunConfig::default());
        run.start(Position::new(0, 0)).unwrap();
        let record = run.run(Policy::Tremaux, &mut rng()).unwrap();
        assert_eq!(
            record,
            RunRecord {
                policy: Policy::Tremaux,
                connectivity: 4,
                steps: 2,
                maze_id: "corridor".to_string(),
                start: Position::new(0, 0),
            }
        );
        assert_eq!(run.state(), RunState::Finished);
    }

    #[test]
    fn test_start_on_goal_takes_no_steps() {
        let grid: Grid = TOP_CORRIDOR.parse().unwrap();
        let mut run = MazeRun::new("corridor", grid, RunConfig::default());
        run.start(Position::new(0, 2)).unwrap();
        assert_eq!(run.run(Policy::Modified, &mut rng()).unwrap().steps, 0);
    }

    #[test]
    fn test_state_machine_order_is_enforced() {
        let grid: Grid = TOP_CORRIDOR.parse().unwrap();
        let mut run = MazeRun::new("corridor", grid, RunConfig::default());
        assert_eq!(
            run.run(Policy::Tremaux, &mut rng()),
            Err(RunError::WrongState {
                maze_id: "corridor".to_string(),
                expected: RunState::Running,
                actual: RunState::Idle,
            })
        );
        run.start(Position::new(0, 0)).unwrap();
        assert!(matches!(
            run.start(Position::new(0, 0)),
            Err(RunError::WrongState { .. })
        ));
        run.run(Policy::Tremaux, &mut rng()).unwrap();
        run.reset();
        assert_eq!(run.state(), RunState::Idle);
        run.start(Position::new(0, 1)).unwrap();
        assert_eq!(run.run(Policy::Tremaux, &mut rng()).unwrap().steps, 1);
    }

    #[test]
    fn test_bad_start_is_a_setup_error() {
        let grid: Grid = TOP_CORRIDOR.parse().unwrap();
        let mut run = MazeRun::new("corridor", grid, RunConfig::default());
        let err = run.start(Position::new(3, 0)).unwrap_err();
        assert!(matches!(
            err,
            RunError::Setup {
                source: MazeError::OutOfBounds { .. },
                ..
            }
        ));
        assert_eq!(run.state(), RunState::Idle);

        let grid: Grid = "1 2 0 13 7".parse().unwrap();
        let mut run = MazeRun::new("no-goal", grid, RunConfig::default());
        assert!(matches!(
            run.start(Position::new(0, 0)),
            Err(RunError::Setup {
                source: MazeError::NoGoal,
                ..
            })
        ));
    }

    #[test]
    fn test_walled_in_start_fails_with_context() {
        let grid: Grid = "1 2 0 15 16".parse().unwrap();
        let mut run = MazeRun::new("sealed", grid, RunConfig::default());
        run.start(Position::new(0, 0)).unwrap();
        let err = run.run(Policy::Tremaux, &mut rng()).unwrap_err();
        assert_eq!(
            err,
            RunError::Failed {
                maze_id: "sealed".to_string(),
                policy: Policy::Tremaux,
                position: Position::new(0, 0),
                steps: 0,
                source: MazeError::InvariantViolation {
                    position: Position::new(0, 0),
                    violation: Violation::NoCandidate,
                },
            }
        );
        assert_eq!(run.state(), RunState::Running);
    }

    #[test]
    fn test_step_limit_stops_a_runaway_run() {
        // the goal is sealed off, so the agent walks the two open cells back and forth forever.
        let grid: Grid = "1 3 0 13 7 31".parse().unwrap();
        let config = RunConfig {
            max_steps: Some(10),
            ..RunConfig::default()
        };
        let mut run = MazeRun::new("sealed", grid, config);
        run.start(Position::new(0, 0)).unwrap();
        let err = run.run(Policy::Tremaux, &mut rng()).unwrap_err();
        assert!(matches!(
            err,
            RunError::Failed {
                steps: 10,
                source: MazeError::InvariantViolation {
                    violation: Violation::StepLimit(10),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_reset_restores_fresh_grid() {
        let fresh: Grid = OPEN_ROOM.parse().unwrap();
        let mut run = MazeRun::new("room", fresh.clone(), RunConfig::default());
        run.start(Position::new(0, 0)).unwrap();
        let first = run.run(Policy::Tremaux, &mut rng()).unwrap();
        assert!(run
            .grid()
            .marks()
            .iter()
            .flatten()
            .any(|e| *e != EdgeState::Wall && *e != EdgeState::Unmarked));

        run.reset();
        assert_eq!(run.grid(), &fresh);
        assert_eq!(run.position(), Position::new(0, 0));
        assert_eq!(run.steps(), 0);

        // the same seed replays the same run on the reset grid.
        run.start(Position::new(0, 0)).unwrap();
        let second = run.run(Policy::Tremaux, &mut rng()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_runs_both_policies_on_pristine_grid() {
        let fresh: Grid = OPEN_ROOM.parse().unwrap();
        let mut run = MazeRun::new("room", fresh.clone(), RunConfig::default());
        let records: Vec<RunRecord> = run
            .evaluate(Position::new(1, 1), &Policy::ALL, &mut rng())
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].policy, Policy::Tremaux);
        assert_eq!(records[1].policy, Policy::Modified);
        assert!(records.iter().all(|r| r.start == Position::new(1, 1)));
        assert!(records.iter().all(|r| r.connectivity == 9));
        assert_eq!(run.grid(), &fresh);
        assert_eq!(run.state(), RunState::Idle);
    }

    #[test]
    fn test_evaluate_leaves_grid_reset_after_failure() {
        let fresh: Grid = "1 2 0 15 16".parse().unwrap();
        let mut run = MazeRun::new("sealed", fresh.clone(), RunConfig::default());
        let outcomes = run.evaluate(Position::new(0, 0), &Policy::ALL, &mut rng());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, Err(RunError::Failed { .. }))));
        assert_eq!(run.grid(), &fresh);
        assert_eq!(run.state(), RunState::Idle);
    }

    #[test]
    fn test_evaluate_keeps_earlier_records_when_a_later_policy_fails() {
        // with a source that always picks 0, Tremaux walks north first and needs four steps from
        // the centre, while the modified agent needs two. A limit of three lets only one finish.
        let fresh: Grid = OPEN_ROOM.parse().unwrap();
        let config = RunConfig {
            max_steps: Some(3),
            ..RunConfig::default()
        };
        let mut run = MazeRun::new("room", fresh.clone(), config);
        let mut source = SequenceSource::new(vec![0]);
        let outcomes = run.evaluate(
            Position::new(1, 1),
            &[Policy::Modified, Policy::Tremaux],
            &mut source,
        );
        assert_eq!(
            outcomes,
            vec![
                Ok(RunRecord {
                    policy: Policy::Modified,
                    connectivity: 9,
                    steps: 2,
                    maze_id: "room".to_string(),
                    start: Position::new(1, 1),
                }),
                Err(RunError::Failed {
                    maze_id: "room".to_string(),
                    policy: Policy::Tremaux,
                    position: Position::new(1, 2),
                    steps: 3,
                    source: MazeError::InvariantViolation {
                        position: Position::new(1, 2),
                        violation: Violation::StepLimit(3),
                    },
                }),
            ]
        );
        assert_eq!(run.grid(), &fresh);

        // the order does not matter: the record of a run that finished is never dropped.
        let mut source = SequenceSource::new(vec![0]);
        let outcomes = run.evaluate(Position::new(1, 1), &Policy::ALL, &mut source);
        assert!(outcomes[0].is_err());
        assert_eq!(outcomes[1].as_ref().map(|r| r.steps), Ok(2));
    }

    #[test]
    fn test_modified_heads_straight_for_goal_in_open_room() {
        // from the centre of an open room the goal corner is south-east. Every junction offers a
        // distance-reducing move, so the modified agent needs exactly two steps whatever the
        // random source says.
        for first in 0..4 {
            let grid: Grid = OPEN_ROOM.parse().unwrap();
            let mut run = MazeRun::new("room", grid, RunConfig::default());
            run.start(Position::new(1, 1)).unwrap();
            let mut source = SequenceSource::new(vec![first, 1, 0]);
            let record = run.run(Policy::Modified, &mut source).unwrap();
            assert_eq!(record.steps, 2);
        }
    }

    #[test]
    fn test_observer_sees_the_whole_run() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let moves = Rc::new(RefCell::new(0usize));
        let grid: Grid = TOP_CORRIDOR.parse().unwrap();
        let counter = Rc::clone(&moves);
        let config = RunConfig {
            pace: Some(Duration::from_millis(1)),
            ..RunConfig::default()
        };
        let mut run = MazeRun::new("corridor", grid, config).with_observer(Box::new(
            move |e: &MazeEvent| {
                if let MazeEvent::CurrentChanged { current: true, .. } = e {
                    *counter.borrow_mut() += 1;
                }
            },
        ));
        run.start(Position::new(0, 0)).unwrap();
        run.run(Policy::Tremaux, &mut rng()).unwrap();
        // placed once, then moved twice.
        assert_eq!(*moves.borrow(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        // Both policies reach the goal of any connected maze, loops or not, from any start,
        // within twice the number of open edges.
        #[test]
        fn test_both_policies_terminate_within_bound(
            rows in 1usize..8,
            cols in 1usize..8,
            extra in 0usize..10,
            maze_seed in any::<u64>(),
            run_seed in any::<u64>(),
            start_row in 0usize..8,
            start_col in 0usize..8,
        ) {
            let grid = random_maze(rows, cols, extra, maze_seed);
            let bound = 2 * grid.open_edge_count();
            let start = Position::new(start_row % rows, start_col % cols);
            let config = RunConfig {
                max_steps: Some(bound + 1),
                ..RunConfig::default()
            };
            let mut run = MazeRun::new("generated", grid.clone(), config);
            let mut rng = crate::Rng::seed_from_u64(run_seed);
            for outcome in run.evaluate(start, &Policy::ALL, &mut rng) {
                let record = outcome.unwrap();
                prop_assert!(record.steps <= bound, "{} took {} steps", record.policy, record.steps);
            }
            prop_assert_eq!(run.grid(), &grid);
        }

        // Within a single run no edge ever gets a third mark: every mark event is a legal step
        // from the previous state.
        #[test]
        fn test_marks_only_ever_advance(
            size in 2usize..7,
            extra in 0usize..8,
            maze_seed in any::<u64>(),
            run_seed in any::<u64>(),
            modified in any::<bool>(),
        ) {
            use std::cell::RefCell;
            use std::rc::Rc;

            let marks = Rc::new(RefCell::new(Vec::new()));
            let recorder = Rc::clone(&marks);
            let grid = random_maze(size, size, extra, maze_seed);
            let mut run = MazeRun::new("generated", grid, RunConfig::default())
                .with_observer(Box::new(move |e: &MazeEvent| {
                    if let MazeEvent::EdgeMarked { state, .. } = e {
                        recorder.borrow_mut().push(*state);
                    }
                }));
            let policy = if modified { Policy::Modified } else { Policy::Tremaux };
            run.start(Position::new(0, 0)).unwrap();
            run.run(policy, &mut crate::Rng::seed_from_u64(run_seed)).unwrap();
            prop_assert!(marks
                .borrow()
                .iter()
                .all(|s| matches!(s, EdgeState::MarkedOnce | EdgeState::MarkedTwice)));
            let twice = run
                .grid()
                .marks()
                .iter()
                .flatten()
                .filter(|e| **e == EdgeState::MarkedTwice)
                .count();
            prop_assert_eq!(
                twice,
                marks.borrow().iter().filter(|s| **s == EdgeState::MarkedTwice).count()
            );
        }
    }
}
