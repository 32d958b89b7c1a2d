use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Hashable lookup key for the value table
pub type StateKey = Vec<i64>;

/// Maps a continuous state onto a [`StateKey`].
///
/// Two states that produce the same key share one value-table entry, so the
/// choice of discretizer trades generalization against table growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Discretizer {
    /// Nearest integer per coordinate, for integer grids
    #[default]
    Identity,
    /// Fixed number of decimals per coordinate
    Round { decimals: u32 },
}

impl Discretizer {
    pub fn key(&self, state: ArrayView1<f32>) -> StateKey {
        match self {
            Discretizer::Identity => state.iter().map(|&v| v.round() as i64).collect(),
            Discretizer::Round { decimals } => {
                let scale = 10f64.powi(*decimals as i32);
                // f64 keeps 0.1 steps from landing on the wrong side of .5
                state
                    .iter()
                    .map(|&v| (v as f64 * scale).round() as i64)
                    .collect()
            }
        }
    }
}
