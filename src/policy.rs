use rand::Rng;

use crate::agent::Action;
use crate::discretize::StateKey;
use crate::error::{Result, VigilError};
use crate::value_table::ValueTable;

/// Epsilon-greedy action selection over a [`ValueTable`].
///
/// With probability `epsilon` a uniformly random action is drawn from the
/// full action set, otherwise the greedy action is taken. `epsilon = 0` is
/// fully greedy and `epsilon = 1` is a pure random walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32) -> Result<Self> {
        let mut policy = EpsilonGreedy { epsilon: 0.0 };
        policy.set_epsilon(epsilon)?;
        Ok(policy)
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(VigilError::invalid_parameter(
                "epsilon".to_string(),
                format!("must lie in [0, 1], got {}", epsilon),
            ));
        }
        self.epsilon = epsilon;
        Ok(())
    }

    /// Select an action for `key`, creating its table entry when exploiting.
    pub fn select<R: Rng + ?Sized>(&self, table: &mut ValueTable, key: &StateKey, rng: &mut R) -> Action {
        if self.explore(rng) {
            rng.gen_range(0..table.action_dim())
        } else {
            table.best_action(key)
        }
    }

    /// Select an action for `key` without mutating the table.
    pub fn select_readonly<R: Rng + ?Sized>(&self, table: &ValueTable, key: &StateKey, rng: &mut R) -> Action {
        if self.explore(rng) {
            rng.gen_range(0..table.action_dim())
        } else {
            table.peek_best_action(key)
        }
    }

    fn explore<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f32>() < self.epsilon
    }
}
