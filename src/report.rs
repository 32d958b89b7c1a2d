use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::Result;
use crate::metrics::{mean, TrainingMetrics};

/// Episodes per group in the binned reward trend
pub const REWARD_BIN: usize = 10;

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub config: RunConfig,
    pub training: TrainingMetrics,
    /// Reward of each evaluation episode
    pub evaluation: Vec<f32>,
    /// Mean squared one-step prediction error of the dynamics model over the
    /// replay buffer at the end of training
    pub model_error: Option<f32>,
    pub value_table_size: usize,
    pub buffered_transitions: usize,
}

impl TrainingReport {
    pub fn evaluation_mean(&self) -> Option<f32> {
        mean(&self.evaluation)
    }

    pub fn reward_trend(&self) -> Vec<f32> {
        self.training.binned_means(REWARD_BIN)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }

    /// Plain-text summary for the console
    pub fn summary(&self) -> String {
        let mut output = String::new();
        output.push_str("Training Summary\n");
        output.push_str("================\n");
        output.push_str(&format!(
            "Episodes: {}  Steps: {}\n",
            self.training.len(),
            self.training.total_steps()
        ));
        if let Some(avg) = self.training.mean_reward() {
            output.push_str(&format!("Mean training reward: {:.2}\n", avg));
        }
        let trend = self.reward_trend();
        if !trend.is_empty() {
            let trend: Vec<String> = trend.iter().map(|r| format!("{:.2}", r)).collect();
            output.push_str(&format!("Reward per {} episodes: {}\n", REWARD_BIN, trend.join(" ")));
        }
        if let Some(avg) = self.evaluation_mean() {
            output.push_str(&format!("Evaluation reward: {:.2}\n", avg));
        }
        if let Some(error) = self.model_error {
            output.push_str(&format!("Model prediction MSE: {:.4}\n", error));
        }
        output.push_str(&format!(
            "Value table states: {}  Buffered transitions: {}\n",
            self.value_table_size, self.buffered_transitions
        ));
        output
    }
}

/// Plot a series as ASCII art
pub fn plot_series(values: &[f32], title: &str, width: usize, height: usize) -> String {
    if values.is_empty() || width < 10 || height < 5 {
        return format!("{}: Invalid data or dimensions", title);
    }

    let min_val = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if (max_val - min_val).abs() < f32::EPSILON {
        return format!("{}: All values are {:.4}", title, min_val);
    }

    let mut plot = vec![vec![' '; width]; height];

    // Axes
    for row in plot.iter_mut() {
        row[0] = '|';
    }
    for cell in plot[height - 1].iter_mut() {
        *cell = '-';
    }
    plot[height - 1][0] = '+';

    let x_span = (values.len() - 1).max(1) as f32;
    let y_scale = (height - 2) as f32 / (max_val - min_val);

    for (i, &value) in values.iter().enumerate() {
        let x = (2 + (i as f32 / x_span * (width - 3) as f32) as usize).min(width - 1);
        let level = ((value - min_val) * y_scale) as usize;
        let y = (height - 2).saturating_sub(level);
        plot[y][x] = '*';
    }

    let mut output = format!("{}\n", title);
    output.push_str(&format!("Max: {:.4}\n", max_val));
    for row in plot.iter() {
        output.push_str(&row.iter().collect::<String>());
        output.push('\n');
    }
    output.push_str(&format!("Min: {:.4}\n", min_val));
    output.push_str(&format!("Points: {}\n", values.len()));
    output
}

/// Plot the per-episode training rewards
pub fn plot_rewards(metrics: &TrainingMetrics, width: usize, height: usize) -> String {
    if metrics.is_empty() {
        return "No reward data available".to_string();
    }
    plot_series(&metrics.rewards(), "Episode Rewards", width, height)
}
