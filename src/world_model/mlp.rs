use ndarray::{Array1, ArrayView1, Axis};
use rand::Rng;

use super::{one_hot, stack_batch, DynamicsModel};
use crate::activations::Activation;
use crate::agent::Action;
use crate::error::{Result, VigilError};
use crate::layers::DenseLayer;
use crate::optimizer::{Optimizer, OptimizerWrapper};
use crate::replay_buffer::Transition;

/// Feed-forward dynamics model with one hidden layer.
///
/// Input is `state ⊕ one_hot(action)`, output is the predicted next state.
/// Training minimizes the batch mean squared error by backpropagation.
#[derive(Clone, Debug)]
pub struct MlpWorldModel {
    pub hidden: DenseLayer,
    pub output: DenseLayer,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
    state_dim: usize,
    action_dim: usize,
}

impl MlpWorldModel {
    pub fn new<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden_size: usize,
        learning_rate: f32,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Self {
        Self::with_activation(state_dim, action_dim, hidden_size, Activation::Relu, learning_rate, optimizer, rng)
    }

    pub fn with_activation<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden_size: usize,
        activation: Activation,
        learning_rate: f32,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Self {
        let hidden = DenseLayer::new(state_dim + action_dim, hidden_size, activation, rng);
        let output = DenseLayer::new(hidden_size, state_dim, Activation::Linear, rng);
        MlpWorldModel {
            hidden,
            output,
            optimizer,
            learning_rate,
            state_dim,
            action_dim,
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.output_size()
    }
}

impl DynamicsModel for MlpWorldModel {
    fn state_dim(&self) -> usize {
        self.state_dim
    }

    fn action_dim(&self) -> usize {
        self.action_dim
    }

    fn predict(&self, state: ArrayView1<f32>, action: Action) -> Result<Array1<f32>> {
        VigilError::check_dim(self.state_dim, state.len(), "state")?;
        let encoded = one_hot(action, self.action_dim)?;

        let mut input = Array1::zeros(self.state_dim + self.action_dim);
        input.slice_mut(ndarray::s![..self.state_dim]).assign(&state);
        input.slice_mut(ndarray::s![self.state_dim..]).assign(&encoded);

        let input = input.insert_axis(Axis(0));
        let hidden = self.hidden.forward_batch(input.view());
        let output = self.output.forward_batch(hidden.view());
        Ok(output.index_axis_move(Axis(0), 0))
    }

    fn train_step(&mut self, batch: &[&Transition]) -> Result<Option<f32>> {
        if batch.is_empty() {
            return Ok(None);
        }
        let (inputs, targets) = stack_batch(batch, self.state_dim, self.action_dim)?;

        let hidden = self.hidden.forward_train(inputs.view());
        let outputs = self.output.forward_train(hidden.view());

        let diff = &outputs - &targets;
        let loss = diff.mapv(|x| x * x).mean().unwrap_or(0.0);

        // d(mean squared error)/d(outputs)
        let scale = 2.0 / diff.len() as f32;
        let output_errors = diff * scale;

        let (adjusted, output_wg, output_bg) = self.output.backward_batch(output_errors.view())?;
        let hidden_errors = adjusted.dot(&self.output.weights.t());
        let (_, hidden_wg, hidden_bg) = self.hidden.backward_batch(hidden_errors.view())?;

        let lr = self.learning_rate;
        self.optimizer.begin_step();
        self.optimizer.update_weights(0, &mut self.hidden.weights, &hidden_wg, lr);
        self.optimizer.update_biases(0, &mut self.hidden.biases, &hidden_bg, lr);
        self.optimizer.update_weights(1, &mut self.output.weights, &output_wg, lr);
        self.optimizer.update_biases(1, &mut self.output.biases, &output_bg, lr);

        Ok(Some(loss))
    }
}
