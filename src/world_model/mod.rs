//! # Dynamics Models
//!
//! A dynamics ("world") model approximates the environment's transition
//! function `f(state, one_hot(action)) ≈ next_state`. Reward is not modelled.
//!
//! Two parameterizations share the [`DynamicsModel`] contract:
//!
//! - [`LinearWorldModel`]: `next_state ≈ state + W[action]`, trained with a
//!   scalar-learning-rate delta rule
//! - [`MlpWorldModel`]: one hidden layer network on `state ⊕ one_hot(action)`,
//!   trained by backpropagation on the batch mean squared error
//!
//! [`WorldModelWrapper`] lets the agent hold either one without caring which.
//!
//! ```rust
//! use vigil::world_model::{DynamicsModel, LinearWorldModel};
//! use vigil::replay_buffer::Transition;
//! use ndarray::array;
//!
//! let mut model = LinearWorldModel::new(2, 4, 0.5);
//! let t = Transition::new(array![0.0, 0.0], 3, array![1.0, 0.0]);
//! for _ in 0..20 {
//!     model.train_step(&[&t]).unwrap();
//! }
//! let predicted = model.predict(array![5.0, 5.0].view(), 3).unwrap();
//! assert!((predicted[0] - 6.0).abs() < 1e-3);
//! ```

pub mod linear;
pub mod mlp;

pub use linear::LinearWorldModel;
pub use mlp::MlpWorldModel;

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;

use crate::agent::Action;
use crate::config::{ModelKind, RunConfig};
use crate::error::{Result, VigilError};
use crate::optimizer::OptimizerWrapper;
use crate::replay_buffer::Transition;

/// Learned approximation of the environment's state transition.
pub trait DynamicsModel {
    fn state_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// Predicted next state. Pure: parameters are only read.
    fn predict(&self, state: ArrayView1<f32>, action: Action) -> Result<Array1<f32>>;

    /// One parameter update on `batch`.
    ///
    /// Returns the batch mean squared error measured before the update, or
    /// `None` for an empty batch, in which case nothing changes.
    fn train_step(&mut self, batch: &[&Transition]) -> Result<Option<f32>>;

    /// Mean squared one-step prediction error over `transitions`.
    fn prediction_error<'a, I>(&self, transitions: I) -> Result<Option<f32>>
    where
        I: IntoIterator<Item = &'a Transition>,
        Self: Sized,
    {
        let mut total = 0.0;
        let mut count = 0usize;
        for transition in transitions {
            let predicted = self.predict(transition.state.view(), transition.action)?;
            total += (&predicted - &transition.next_state).mapv(|x| x * x).sum();
            count += transition.next_state.len();
        }
        Ok(if count == 0 { None } else { Some(total / count as f32) })
    }
}

#[derive(Clone, Debug)]
pub enum WorldModelWrapper {
    Linear(LinearWorldModel),
    Mlp(MlpWorldModel),
}

impl WorldModelWrapper {
    /// Build the model named by `config.model`.
    pub fn from_config<R: Rng + ?Sized>(config: &RunConfig, state_dim: usize, action_dim: usize, rng: &mut R) -> Self {
        match config.model {
            ModelKind::Linear => {
                WorldModelWrapper::Linear(LinearWorldModel::new(state_dim, action_dim, config.model_learning_rate))
            }
            ModelKind::Mlp => WorldModelWrapper::Mlp(MlpWorldModel::with_activation(
                state_dim,
                action_dim,
                config.hidden_size,
                config.hidden_activation,
                config.model_learning_rate,
                OptimizerWrapper::from_kind(config.optimizer),
                rng,
            )),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            WorldModelWrapper::Linear(_) => ModelKind::Linear,
            WorldModelWrapper::Mlp(_) => ModelKind::Mlp,
        }
    }
}

impl DynamicsModel for WorldModelWrapper {
    fn state_dim(&self) -> usize {
        match self {
            WorldModelWrapper::Linear(model) => model.state_dim(),
            WorldModelWrapper::Mlp(model) => model.state_dim(),
        }
    }

    fn action_dim(&self) -> usize {
        match self {
            WorldModelWrapper::Linear(model) => model.action_dim(),
            WorldModelWrapper::Mlp(model) => model.action_dim(),
        }
    }

    fn predict(&self, state: ArrayView1<f32>, action: Action) -> Result<Array1<f32>> {
        match self {
            WorldModelWrapper::Linear(model) => model.predict(state, action),
            WorldModelWrapper::Mlp(model) => model.predict(state, action),
        }
    }

    fn train_step(&mut self, batch: &[&Transition]) -> Result<Option<f32>> {
        match self {
            WorldModelWrapper::Linear(model) => model.train_step(batch),
            WorldModelWrapper::Mlp(model) => model.train_step(batch),
        }
    }
}

/// One-hot encoding of `action` over `action_dim` classes.
pub fn one_hot(action: Action, action_dim: usize) -> Result<Array1<f32>> {
    VigilError::check_action(action, action_dim)?;
    let mut encoded = Array1::zeros(action_dim);
    encoded[action] = 1.0;
    Ok(encoded)
}

/// Rows of `state ⊕ one_hot(action)` and the matching next-state targets.
pub(crate) fn stack_batch(
    batch: &[&Transition],
    state_dim: usize,
    action_dim: usize,
) -> Result<(Array2<f32>, Array2<f32>)> {
    let mut inputs = Array2::zeros((batch.len(), state_dim + action_dim));
    let mut targets = Array2::zeros((batch.len(), state_dim));

    for (i, transition) in batch.iter().enumerate() {
        check_transition(transition, state_dim, action_dim)?;
        let mut row = inputs.row_mut(i);
        row.slice_mut(ndarray::s![..state_dim]).assign(&transition.state);
        row[state_dim + transition.action] = 1.0;
        targets.row_mut(i).assign(&transition.next_state);
    }

    Ok((inputs, targets))
}

pub(crate) fn check_transition(transition: &Transition, state_dim: usize, action_dim: usize) -> Result<()> {
    VigilError::check_dim(state_dim, transition.state.len(), "state")?;
    VigilError::check_dim(state_dim, transition.next_state.len(), "next state")?;
    VigilError::check_action(transition.action, action_dim)
}
