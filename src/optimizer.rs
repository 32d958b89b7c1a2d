//! # Optimizers
//!
//! Parameter update rules for the feed-forward dynamics model. Each
//! parameter tensor is addressed by a `slot` index so stateful optimizers
//! (Adam) can keep one set of moment estimates per tensor.

use ndarray::{Array1, Array2, Dimension, Zip};
use serde::{Deserialize, Serialize};

use crate::config::OptimizerKind;

pub trait Optimizer {
    /// Called once before the updates of one training step.
    fn begin_step(&mut self) {}

    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);

    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl OptimizerWrapper {
    pub fn from_kind(kind: OptimizerKind) -> Self {
        match kind {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::default()),
        }
    }
}

impl Optimizer for OptimizerWrapper {
    fn begin_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.begin_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.begin_step(),
        }
    }

    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(slot, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(slot, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(slot, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(slot, biases, gradients, learning_rate),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with bias-corrected first and second moment estimates.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// Number of completed `begin_step` calls
    pub t: i32,
    m_weights: Vec<Option<Array2<f32>>>,
    v_weights: Vec<Option<Array2<f32>>>,
    m_biases: Vec<Option<Array1<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            t: 0,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
        }
    }

    fn step<D: Dimension>(
        &self,
        params: &mut ndarray::Array<f32, D>,
        gradients: &ndarray::Array<f32, D>,
        m: &mut ndarray::Array<f32, D>,
        v: &mut ndarray::Array<f32, D>,
        learning_rate: f32,
    ) {
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);
        let t = self.t.max(1);
        let bias1 = 1.0 - beta1.powi(t);
        let bias2 = 1.0 - beta2.powi(t);

        Zip::from(params)
            .and(gradients)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *p -= learning_rate * m_hat / (v_hat.sqrt() + eps);
            });
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

fn moment_slot<T: Clone>(moments: &mut Vec<Option<T>>, slot: usize, init: impl FnOnce() -> T) -> T {
    if moments.len() <= slot {
        moments.resize(slot + 1, None);
    }
    moments[slot].take().unwrap_or_else(init)
}

impl Optimizer for Adam {
    fn begin_step(&mut self) {
        self.t += 1;
    }

    fn update_weights(&mut self, slot: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let dim = weights.dim();
        let mut m = moment_slot(&mut self.m_weights, slot, || Array2::zeros(dim));
        let mut v = moment_slot(&mut self.v_weights, slot, || Array2::zeros(dim));
        self.step(weights, gradients, &mut m, &mut v, learning_rate);
        self.m_weights[slot] = Some(m);
        self.v_weights[slot] = Some(v);
    }

    fn update_biases(&mut self, slot: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let dim = biases.dim();
        let mut m = moment_slot(&mut self.m_biases, slot, || Array1::zeros(dim));
        let mut v = moment_slot(&mut self.v_biases, slot, || Array1::zeros(dim));
        self.step(biases, gradients, &mut m, &mut v, learning_rate);
        self.m_biases[slot] = Some(m);
        self.v_biases[slot] = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sgd_moves_against_gradient() {
        let mut sgd = SGD::new();
        let mut w = array![[1.0, 2.0]];
        sgd.update_weights(0, &mut w, &array![[1.0, -1.0]], 0.5);
        assert_eq!(w, array![[0.5, 2.5]]);
    }

    #[test]
    fn test_adam_first_step_is_learning_rate_sized() {
        let mut adam = Adam::default();
        adam.begin_step();
        let mut b = array![0.0, 0.0];
        adam.update_biases(0, &mut b, &array![3.0, -0.2], 0.01);
        // Bias-corrected first step is lr * sign(g)
        assert!((b[0] + 0.01).abs() < 1e-4);
        assert!((b[1] - 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_adam_keeps_separate_slots() {
        let mut adam = Adam::default();
        adam.begin_step();
        let mut a = array![[0.0]];
        let mut b = array![[0.0, 0.0]];
        adam.update_weights(0, &mut a, &array![[1.0]], 0.1);
        adam.update_weights(1, &mut b, &array![[1.0, 1.0]], 0.1);
        assert!(a[[0, 0]] < 0.0);
        assert!(b.iter().all(|&x| x < 0.0));
    }
}
