use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{check_transition, DynamicsModel};
use crate::agent::Action;
use crate::error::{Result, VigilError};
use crate::replay_buffer::Transition;

/// `next_state ≈ state + offsets[action]`.
///
/// Each transition in a batch nudges its action's offset toward the observed
/// displacement: `offsets[a] += learning_rate * (next_state - prediction)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearWorldModel {
    /// One row of offsets per action
    pub offsets: Array2<f32>,
    pub learning_rate: f32,
}

impl LinearWorldModel {
    pub fn new(state_dim: usize, action_dim: usize, learning_rate: f32) -> Self {
        LinearWorldModel {
            offsets: Array2::zeros((action_dim, state_dim)),
            learning_rate,
        }
    }

    pub fn offset(&self, action: Action) -> ArrayView1<f32> {
        self.offsets.row(action)
    }
}

impl DynamicsModel for LinearWorldModel {
    fn state_dim(&self) -> usize {
        self.offsets.ncols()
    }

    fn action_dim(&self) -> usize {
        self.offsets.nrows()
    }

    fn predict(&self, state: ArrayView1<f32>, action: Action) -> Result<Array1<f32>> {
        VigilError::check_action(action, self.action_dim())?;
        VigilError::check_dim(self.state_dim(), state.len(), "state")?;
        Ok(&state + &self.offsets.row(action))
    }

    fn train_step(&mut self, batch: &[&Transition]) -> Result<Option<f32>> {
        if batch.is_empty() {
            return Ok(None);
        }
        let mut squared_error = 0.0;
        for transition in batch {
            check_transition(transition, self.state_dim(), self.action_dim())?;
            let predicted = self.predict(transition.state.view(), transition.action)?;
            squared_error += (&transition.next_state - &predicted).mapv(|x| x * x).sum();
        }

        let lr = self.learning_rate;
        for transition in batch {
            let error = &transition.next_state - &(&transition.state + &self.offsets.row(transition.action));
            self.offsets
                .row_mut(transition.action)
                .zip_mut_with(&error, |w, &e| *w += lr * e);
        }

        Ok(Some(squared_error / (batch.len() * self.state_dim()).max(1) as f32))
    }
}
