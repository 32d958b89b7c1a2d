use super::{state_from, Environment, StepResult};
use crate::agent::{Action, State};
use crate::discretize::Discretizer;
use crate::error::{Result, VigilError};

/// Field moves as `(dx, dy)`: up, down, left, right
pub const FIELD_MOVES: [(f32, f32); 4] = [(0.0, 0.1), (0.0, -0.1), (-0.1, 0.0), (0.1, 0.0)];

pub const DEFAULT_FIELD_MAX_STEPS: usize = 100;

/// Continuous plane with a circular danger zone.
///
/// The agent starts at the origin and moves 0.1 per step. Every step costs
/// 0.01; ending a step within `danger_radius` of the danger centre costs an
/// extra 1. Episodes only end when the step budget runs out.
#[derive(Clone, Debug)]
pub struct FieldWorld {
    position: (f32, f32),
    danger: (f32, f32),
    danger_radius: f32,
    steps: usize,
    max_steps: usize,
}

impl FieldWorld {
    pub fn new() -> Self {
        FieldWorld {
            position: (0.0, 0.0),
            danger: (2.0, 0.0),
            danger_radius: 0.5,
            steps: 0,
            max_steps: DEFAULT_FIELD_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Whether the agent is currently inside the danger zone
    pub fn in_danger(&self) -> bool {
        let dx = self.position.0 - self.danger.0;
        let dy = self.position.1 - self.danger.1;
        (dx * dx + dy * dy).sqrt() < self.danger_radius
    }

    fn state(&self) -> State {
        state_from(&[self.position.0, self.position.1])
    }
}

impl Default for FieldWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for FieldWorld {
    fn state_dim(&self) -> usize {
        2
    }

    fn action_dim(&self) -> usize {
        FIELD_MOVES.len()
    }

    fn reset(&mut self) -> State {
        self.position = (0.0, 0.0);
        self.steps = 0;
        self.state()
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        VigilError::check_action(action, self.action_dim())?;

        let (dx, dy) = FIELD_MOVES[action];
        self.position = (self.position.0 + dx, self.position.1 + dy);
        self.steps += 1;

        let mut reward = -0.01;
        if self.in_danger() {
            reward -= 1.0;
        }
        let done = self.steps >= self.max_steps;

        Ok(StepResult { state: self.state(), reward, done })
    }

    fn render(&self) -> String {
        format!(
            "agent ({:.2}, {:.2})  danger ({:.2}, {:.2}) r={:.2}{}  step {}/{}",
            self.position.0,
            self.position.1,
            self.danger.0,
            self.danger.1,
            self.danger_radius,
            if self.in_danger() { "  [IN DANGER]" } else { "" },
            self.steps,
            self.max_steps,
        )
    }

    fn default_discretizer(&self) -> Discretizer {
        Discretizer::Round { decimals: 1 }
    }
}
