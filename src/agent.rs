//! # Agent
//!
//! [`Agent`] couples a tabular action-value function with a learned dynamics
//! model. Acting is epsilon-greedy over the value table; every observed step
//! feeds a TD update and is stored in a replay buffer, from which the
//! dynamics model is trained on uniformly sampled batches.
//!
//! All learning state is owned by the agent, so independent agents never
//! share tables, buffers or models. Randomness comes from a seeded generator
//! owned by the agent, which makes runs reproducible.
//!
//! ```rust
//! use vigil::agent::AgentBuilder;
//! use vigil::config::ModelKind;
//! use ndarray::array;
//!
//! let mut agent = AgentBuilder::new(2, 4)
//!     .epsilon(0.0)
//!     .model(ModelKind::Linear)
//!     .batch_size(1)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let state = array![0.0, 0.0];
//! let next_state = array![0.1, 0.0];
//! let action = agent.act(state.view()).unwrap();
//! agent.observe(state.view(), action, -0.01, next_state.view()).unwrap();
//! assert_eq!(agent.memory.len(), 1);
//! ```

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ModelKind, OptimizerKind, RunConfig};
use crate::discretize::{Discretizer, StateKey};
use crate::error::{Result, VigilError};
use crate::policy::EpsilonGreedy;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::value_table::ValueTable;
use crate::world_model::{DynamicsModel, WorldModelWrapper};

pub type State = Array1<f32>;
pub type Action = usize;

pub struct Agent {
    pub q_table: ValueTable,
    pub memory: ReplayBuffer,
    pub model: WorldModelWrapper,
    pub policy: EpsilonGreedy,
    pub discretizer: Discretizer,
    /// TD learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    pub batch_size: usize,
    pub epochs_per_step: usize,
    /// Number of model train steps performed
    pub train_steps: usize,
    state_dim: usize,
    rng: StdRng,
}

impl Agent {
    /// Build an agent from a validated run configuration.
    pub fn from_config(config: &RunConfig, state_dim: usize, action_dim: usize, discretizer: Discretizer) -> Result<Self> {
        AgentBuilder::from_config(config.clone(), state_dim, action_dim)
            .discretizer(discretizer)
            .build()
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.q_table.action_dim()
    }

    pub fn epsilon(&self) -> f32 {
        self.policy.epsilon()
    }

    pub fn set_epsilon(&mut self, epsilon: f32) -> Result<()> {
        self.policy.set_epsilon(epsilon)
    }

    /// Discretized lookup key for `state`
    pub fn state_key(&self, state: ArrayView1<f32>) -> StateKey {
        self.discretizer.key(state)
    }

    /// Epsilon-greedy action for `state`, using the agent's own exploration rate.
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<Action> {
        self.check_state(state)?;
        let key = self.state_key(state);
        Ok(self.policy.select(&mut self.q_table, &key, &mut self.rng))
    }

    /// Action under `policy` that leaves the value table untouched.
    pub fn act_readonly(&mut self, state: ArrayView1<f32>, policy: &EpsilonGreedy) -> Result<Action> {
        self.check_state(state)?;
        let key = self.state_key(state);
        Ok(policy.select_readonly(&self.q_table, &key, &mut self.rng))
    }

    /// TD update of the value table for one observed step. Returns the change
    /// applied to `Q[state][action]`.
    pub fn update_value(&mut self, state: ArrayView1<f32>, action: Action, reward: f32, next_state: ArrayView1<f32>) -> Result<f32> {
        self.check_state(state)?;
        self.check_state(next_state)?;
        VigilError::check_action(action, self.action_dim())?;

        let key = self.state_key(state);
        let next_key = self.state_key(next_state);
        Ok(self.q_table.update(&key, action, reward, &next_key, self.alpha, self.gamma))
    }

    /// Store a transition for model training
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Run `epochs_per_step` model train steps on fresh batches.
    ///
    /// Returns the mean loss, or `None` when the buffer does not yet hold a
    /// full batch and training was skipped.
    pub fn train_model(&mut self) -> Result<Option<f32>> {
        let mut total = 0.0;
        let mut rounds = 0;
        for _ in 0..self.epochs_per_step {
            let batch = match self.memory.sample(self.batch_size, &mut self.rng) {
                Some(batch) => batch,
                None => {
                    tracing::debug!(
                        buffered = self.memory.len(),
                        batch_size = self.batch_size,
                        "not enough transitions, skipping model training"
                    );
                    break;
                }
            };
            if let Some(loss) = self.model.train_step(&batch)? {
                if !loss.is_finite() {
                    tracing::warn!(loss, "dynamics model loss is not finite");
                }
                total += loss;
                rounds += 1;
                self.train_steps += 1;
            }
        }
        Ok(if rounds == 0 { None } else { Some(total / rounds as f32) })
    }

    /// Full learning update for one step: value update, store, model training.
    pub fn observe(
        &mut self,
        state: ArrayView1<f32>,
        action: Action,
        reward: f32,
        next_state: ArrayView1<f32>,
    ) -> Result<Option<f32>> {
        self.update_value(state, action, reward, next_state)?;
        self.remember(Transition::new(state.to_owned(), action, next_state.to_owned()));
        self.train_model()
    }

    pub fn predict_next_state(&self, state: ArrayView1<f32>, action: Action) -> Result<State> {
        self.model.predict(state, action)
    }

    /// Mean squared one-step prediction error of the model over the buffer
    pub fn model_error(&self) -> Result<Option<f32>> {
        self.model.prediction_error(self.memory.iter())
    }

    fn check_state(&self, state: ArrayView1<f32>) -> Result<()> {
        VigilError::check_dim(self.state_dim, state.len(), "state")
    }
}

/// Builder for [`Agent`]. Unset options take the [`RunConfig`] defaults.
pub struct AgentBuilder {
    config: RunConfig,
    state_dim: usize,
    action_dim: usize,
    discretizer: Discretizer,
    model: Option<WorldModelWrapper>,
}

impl AgentBuilder {
    pub fn new(state_dim: usize, action_dim: usize) -> Self {
        Self::from_config(RunConfig::default(), state_dim, action_dim)
    }

    pub fn from_config(config: RunConfig, state_dim: usize, action_dim: usize) -> Self {
        AgentBuilder {
            config,
            state_dim,
            action_dim,
            discretizer: Discretizer::default(),
            model: None,
        }
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn epochs_per_step(mut self, epochs: usize) -> Self {
        self.config.epochs_per_step = epochs;
        self
    }

    pub fn replay_capacity(mut self, capacity: usize) -> Self {
        self.config.replay_capacity = capacity;
        self
    }

    pub fn model(mut self, kind: ModelKind) -> Self {
        self.config.model = kind;
        self
    }

    pub fn model_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.model_learning_rate = learning_rate;
        self
    }

    pub fn hidden_size(mut self, hidden_size: usize) -> Self {
        self.config.hidden_size = hidden_size;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.config.optimizer = optimizer;
        self
    }

    pub fn discretizer(mut self, discretizer: Discretizer) -> Self {
        self.discretizer = discretizer;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Use a prebuilt dynamics model instead of one built from the options
    pub fn world_model(mut self, model: WorldModelWrapper) -> Self {
        self.model = Some(model);
        self
    }

    pub fn build(self) -> Result<Agent> {
        self.config.validate()?;

        if self.state_dim == 0 {
            return Err(VigilError::invalid_parameter("state_dim", "must be greater than 0"));
        }
        if self.action_dim == 0 {
            return Err(VigilError::invalid_parameter("action_dim", "must be greater than 0"));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let model = match self.model {
            Some(model) => {
                VigilError::check_dim(self.state_dim, model.state_dim(), "model state")?;
                VigilError::check_dim(self.action_dim, model.action_dim(), "model action set")?;
                model
            }
            None => WorldModelWrapper::from_config(&self.config, self.state_dim, self.action_dim, &mut rng),
        };

        Ok(Agent {
            q_table: ValueTable::new(self.action_dim),
            memory: ReplayBuffer::new(self.config.replay_capacity),
            model,
            policy: EpsilonGreedy::new(self.config.epsilon)?,
            discretizer: self.discretizer,
            alpha: self.config.alpha,
            gamma: self.config.gamma,
            batch_size: self.config.batch_size,
            epochs_per_step: self.config.epochs_per_step,
            train_steps: 0,
            state_dim: self.state_dim,
            rng,
        })
    }
}
