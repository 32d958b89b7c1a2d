//! # Run Configuration
//!
//! A flat set of named options for one training run. Every field has a
//! default, so a JSON file only needs to name the values it changes:
//!
//! ```rust
//! use vigil::config::{RunConfig, ModelKind};
//!
//! let config = RunConfig::from_json_str(r#"{ "episodes": 20, "model": "linear" }"#).unwrap();
//! assert_eq!(config.episodes, 20);
//! assert_eq!(config.model, ModelKind::Linear);
//! assert_eq!(config.batch_size, 32);
//! ```
//!
//! Out-of-range values are rejected by [`RunConfig::validate`], never clamped.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{Result, VigilError};

/// Which dynamics model parameterization to train
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Per-action offset trained with the delta rule
    Linear,
    /// One hidden layer feed-forward network trained by backpropagation
    Mlp,
}

/// Optimizer used by the feed-forward dynamics model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

/// Which environment to train in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnvKind {
    /// Discrete grid with a wandering person and a ditch
    Grid,
    /// Continuous plane with a danger zone
    Field,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub episodes: usize,
    pub eval_episodes: usize,
    pub batch_size: usize,
    pub epochs_per_step: usize,
    /// TD learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    /// Exploration rate while training
    pub epsilon: f32,
    /// Multiplicative decay applied to epsilon after each training episode
    pub epsilon_decay: f32,
    pub epsilon_min: f32,
    /// Exploration rate while evaluating
    pub eval_epsilon: f32,
    pub replay_capacity: usize,
    pub model_learning_rate: f32,
    pub model: ModelKind,
    pub hidden_size: usize,
    /// Hidden layer nonlinearity of the feed-forward model
    pub hidden_activation: Activation,
    pub optimizer: OptimizerKind,
    pub env: EnvKind,
    pub grid_size: usize,
    /// Overrides the environment's own step budget
    pub max_steps: Option<usize>,
    /// Overrides the environment's default state discretization
    pub key_precision: Option<u32>,
    /// Grid only: the person cannot step onto the agent's cell
    pub guard: bool,
    pub seed: u64,
    pub log_every: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            episodes: 100,
            eval_episodes: 1,
            batch_size: 32,
            epochs_per_step: 1,
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 0.1,
            epsilon_decay: 1.0,
            epsilon_min: 0.0,
            eval_epsilon: 0.0,
            replay_capacity: 10_000,
            model_learning_rate: 1e-3,
            model: ModelKind::Mlp,
            hidden_size: 64,
            hidden_activation: Activation::Relu,
            optimizer: OptimizerKind::Adam,
            env: EnvKind::Grid,
            grid_size: 5,
            max_steps: None,
            key_precision: None,
            guard: true,
            seed: 42,
            log_every: 10,
        }
    }
}

/// Largest supported number of decimals for state rounding
pub const MAX_KEY_PRECISION: u32 = 6;

impl RunConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every option against its allowed range
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("epsilon", self.epsilon)?;
        check_unit_interval("eval_epsilon", self.eval_epsilon)?;
        check_unit_interval("epsilon_min", self.epsilon_min)?;
        check_unit_interval("gamma", self.gamma)?;
        check_step_size("alpha", self.alpha)?;
        check_step_size("epsilon_decay", self.epsilon_decay)?;

        if !self.model_learning_rate.is_finite() || self.model_learning_rate <= 0.0 {
            return Err(VigilError::invalid_parameter(
                "model_learning_rate".to_string(),
                format!("must be a positive finite number, got {}", self.model_learning_rate),
            ));
        }

        check_nonzero("replay_capacity", self.replay_capacity)?;
        check_nonzero("batch_size", self.batch_size)?;
        check_nonzero("epochs_per_step", self.epochs_per_step)?;
        check_nonzero("hidden_size", self.hidden_size)?;
        check_nonzero("log_every", self.log_every)?;

        if self.batch_size > self.replay_capacity {
            return Err(VigilError::invalid_parameter(
                "batch_size".to_string(),
                format!(
                    "{} exceeds replay_capacity {}; training could never run",
                    self.batch_size, self.replay_capacity
                ),
            ));
        }

        if self.grid_size < 2 {
            return Err(VigilError::invalid_parameter(
                "grid_size".to_string(),
                format!("must be at least 2, got {}", self.grid_size),
            ));
        }

        if let Some(max_steps) = self.max_steps {
            check_nonzero("max_steps", max_steps)?;
        }

        if let Some(precision) = self.key_precision {
            if precision > MAX_KEY_PRECISION {
                return Err(VigilError::invalid_parameter(
                    "key_precision".to_string(),
                    format!("must be at most {}, got {}", MAX_KEY_PRECISION, precision),
                ));
            }
        }

        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(VigilError::invalid_parameter(
            name.to_string(),
            format!("must lie in [0, 1], got {}", value),
        ))
    }
}

fn check_step_size(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(VigilError::invalid_parameter(
            name.to_string(),
            format!("must lie in (0, 1], got {}", value),
        ))
    }
}

fn check_nonzero(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        Err(VigilError::invalid_parameter(name, "must be greater than 0"))
    } else {
        Ok(())
    }
}
