//! # Environments
//!
//! The agent only sees an environment through [`Environment`]: a reset, a
//! step that returns [`StepResult`], and an optional text rendering.
//!
//! - [`GridWorld`]: integer grid with a wandering person and a ditch
//! - [`FieldWorld`]: continuous plane with a circular danger zone

pub mod field;
pub mod grid;

pub use field::FieldWorld;
pub use grid::GridWorld;

use ndarray::Array1;

use crate::agent::{Action, State};
use crate::config::{EnvKind, RunConfig};
use crate::discretize::Discretizer;
use crate::error::Result;

/// Outcome of one environment step
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub state: State,
    pub reward: f32,
    pub done: bool,
}

pub trait Environment {
    /// Length of every state this environment produces
    fn state_dim(&self) -> usize;

    /// Number of discrete actions
    fn action_dim(&self) -> usize;

    /// Start a new episode and return its first state
    fn reset(&mut self) -> State;

    /// Apply `action`. Fails with `InvalidAction` for an index outside
    /// `[0, action_dim)`.
    fn step(&mut self, action: Action) -> Result<StepResult>;

    /// Human-readable snapshot of the current state
    fn render(&self) -> String;

    /// Discretization suited to this environment's states
    fn default_discretizer(&self) -> Discretizer {
        Discretizer::Identity
    }
}

/// Either shipped environment, picked at runtime from the config.
pub enum AnyEnvironment {
    Grid(GridWorld),
    Field(FieldWorld),
}

impl AnyEnvironment {
    pub fn from_config(config: &RunConfig) -> Self {
        // Offset so the environment and the agent never share a stream
        let seed = config.seed.wrapping_add(1);
        match config.env {
            EnvKind::Grid => {
                let mut env = GridWorld::new(config.grid_size, seed).with_guard(config.guard);
                if let Some(max_steps) = config.max_steps {
                    env = env.with_max_steps(max_steps);
                }
                AnyEnvironment::Grid(env)
            }
            EnvKind::Field => {
                let mut env = FieldWorld::new();
                if let Some(max_steps) = config.max_steps {
                    env = env.with_max_steps(max_steps);
                }
                AnyEnvironment::Field(env)
            }
        }
    }
}

impl Environment for AnyEnvironment {
    fn state_dim(&self) -> usize {
        match self {
            AnyEnvironment::Grid(env) => env.state_dim(),
            AnyEnvironment::Field(env) => env.state_dim(),
        }
    }

    fn action_dim(&self) -> usize {
        match self {
            AnyEnvironment::Grid(env) => env.action_dim(),
            AnyEnvironment::Field(env) => env.action_dim(),
        }
    }

    fn reset(&mut self) -> State {
        match self {
            AnyEnvironment::Grid(env) => env.reset(),
            AnyEnvironment::Field(env) => env.reset(),
        }
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        match self {
            AnyEnvironment::Grid(env) => env.step(action),
            AnyEnvironment::Field(env) => env.step(action),
        }
    }

    fn render(&self) -> String {
        match self {
            AnyEnvironment::Grid(env) => env.render(),
            AnyEnvironment::Field(env) => env.render(),
        }
    }

    fn default_discretizer(&self) -> Discretizer {
        match self {
            AnyEnvironment::Grid(env) => env.default_discretizer(),
            AnyEnvironment::Field(env) => env.default_discretizer(),
        }
    }
}

pub(crate) fn state_from(values: &[f32]) -> State {
    Array1::from_vec(values.to_vec())
}
