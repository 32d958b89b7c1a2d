//! # Tabular Action Values
//!
//! [`ValueTable`] maps a [`StateKey`] to one value per action. Entries are
//! created lazily as zero vectors the first time a key is looked up or
//! updated, and are never evicted.
//!
//! ```rust
//! use vigil::value_table::ValueTable;
//!
//! let mut table = ValueTable::new(3);
//! let s = vec![0, 0];
//! table.update(&s, 1, 1.0, &s, 0.5, 0.0);
//! assert_eq!(table.lookup(&s).to_vec(), vec![0.0, 0.5, 0.0]);
//! assert_eq!(table.best_action(&s), 1);
//! ```

use std::collections::HashMap;

use ndarray::Array1;

use crate::agent::Action;
use crate::discretize::StateKey;

#[derive(Clone, Debug)]
pub struct ValueTable {
    entries: HashMap<StateKey, Array1<f32>>,
    action_dim: usize,
}

impl ValueTable {
    pub fn new(action_dim: usize) -> Self {
        ValueTable {
            entries: HashMap::new(),
            action_dim,
        }
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Number of keys seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Action values for `key`, inserting a zero vector on first access.
    pub fn lookup(&mut self, key: &StateKey) -> &Array1<f32> {
        self.ensure(key);
        &self.entries[key]
    }

    /// Action values for `key` without creating an entry.
    pub fn get(&self, key: &StateKey) -> Option<&Array1<f32>> {
        self.entries.get(key)
    }

    /// Insert a zero row for `key` if it is missing. The key is only cloned
    /// on insert.
    fn ensure(&mut self, key: &StateKey) {
        if !self.entries.contains_key(key) {
            self.entries.insert(key.clone(), Array1::zeros(self.action_dim));
        }
    }

    /// Greedy action for `key`; ties go to the lowest index.
    pub fn best_action(&mut self, key: &StateKey) -> Action {
        argmax(self.lookup(key))
    }

    /// Greedy action without touching the table. Unseen keys behave like a
    /// zero vector and yield action 0.
    pub fn peek_best_action(&self, key: &StateKey) -> Action {
        self.get(key).map(argmax).unwrap_or(0)
    }

    /// Largest action value for `key`, 0 for unseen keys.
    pub fn max_value(&self, key: &StateKey) -> f32 {
        self.get(key)
            .map(|values| values.iter().copied().fold(f32::NEG_INFINITY, f32::max))
            .unwrap_or(0.0)
    }

    /// One-step temporal-difference update:
    /// `Q[key][action] += alpha * (reward + gamma * max(Q[next_key]) - Q[key][action])`.
    ///
    /// Returns the applied change. `action` must be below `action_dim`.
    pub fn update(
        &mut self,
        key: &StateKey,
        action: Action,
        reward: f32,
        next_key: &StateKey,
        alpha: f32,
        gamma: f32,
    ) -> f32 {
        self.ensure(key);
        self.ensure(next_key);
        let max_next = self.max_value(next_key);

        let old = self.entries[key][action];
        let delta = alpha * (reward + gamma * max_next - old);
        if let Some(values) = self.entries.get_mut(key) {
            values[action] = old + delta;
        }
        delta
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Array1<f32>)> {
        self.entries.iter()
    }
}

/// Index of the first maximal value.
pub fn argmax(values: &Array1<f32>) -> Action {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
