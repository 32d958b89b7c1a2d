use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{state_from, Environment, StepResult};
use crate::agent::{Action, State};
use crate::error::{Result, VigilError};

/// Grid moves as `(dx, dy)`: up, down, left, right, stay
pub const GRID_MOVES: [(i64, i64); 5] = [(0, -1), (0, 1), (-1, 0), (1, 0), (0, 0)];

pub const DEFAULT_GRID_MAX_STEPS: usize = 50;

/// Square grid holding the agent, a randomly wandering person and a ditch in
/// the far corner.
///
/// State is `(agent_x, agent_y, person_x, person_y)`. Each step the agent
/// moves first, then the person takes a uniformly random move. The episode
/// ends with reward -1 when the person enters the ditch, or with reward 0
/// once the step budget is spent. With `guard` enabled (the default) the
/// person cannot step onto the agent's cell, so the agent can block the way.
#[derive(Clone, Debug)]
pub struct GridWorld {
    size: i64,
    ditch: (i64, i64),
    agent: (i64, i64),
    person: (i64, i64),
    steps: usize,
    max_steps: usize,
    guard: bool,
    rng: StdRng,
}

impl GridWorld {
    pub fn new(size: usize, seed: u64) -> Self {
        let size = size as i64;
        let mut env = GridWorld {
            size,
            ditch: (size - 1, size - 1),
            agent: (0, 0),
            person: (0, 0),
            steps: 0,
            max_steps: DEFAULT_GRID_MAX_STEPS,
            guard: true,
            rng: StdRng::seed_from_u64(seed),
        };
        env.reset();
        env
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_guard(mut self, guard: bool) -> Self {
        self.guard = guard;
        self
    }

    pub fn ditch(&self) -> (i64, i64) {
        self.ditch
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn clamp_move(&self, pos: (i64, i64), action: Action) -> (i64, i64) {
        let (dx, dy) = GRID_MOVES[action];
        (
            (pos.0 + dx).clamp(0, self.size - 1),
            (pos.1 + dy).clamp(0, self.size - 1),
        )
    }

    fn move_person(&mut self) {
        let action = self.rng.gen_range(0..GRID_MOVES.len());
        let target = self.clamp_move(self.person, action);
        if self.guard && target == self.agent && target != self.person {
            return;
        }
        self.person = target;
    }

    fn state(&self) -> State {
        state_from(&[
            self.agent.0 as f32,
            self.agent.1 as f32,
            self.person.0 as f32,
            self.person.1 as f32,
        ])
    }
}

impl Environment for GridWorld {
    fn state_dim(&self) -> usize {
        4
    }

    fn action_dim(&self) -> usize {
        GRID_MOVES.len()
    }

    fn reset(&mut self) -> State {
        self.agent = (0, 0);
        self.person = (self.size / 2, 0);
        self.steps = 0;
        self.state()
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        VigilError::check_action(action, self.action_dim())?;

        self.agent = self.clamp_move(self.agent, action);
        self.move_person();

        let mut reward = 0.0;
        let mut done = false;
        if self.person == self.ditch {
            reward -= 1.0;
            done = true;
        }
        self.steps += 1;
        if self.steps >= self.max_steps {
            done = true;
        }

        Ok(StepResult { state: self.state(), reward, done })
    }

    fn render(&self) -> String {
        let size = self.size as usize;
        let mut grid = vec![vec!['.'; size]; size];
        grid[self.ditch.1 as usize][self.ditch.0 as usize] = 'D';
        grid[self.person.1 as usize][self.person.0 as usize] = 'P';
        grid[self.agent.1 as usize][self.agent.0 as usize] = 'A';
        grid.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
