use serde::{Deserialize, Serialize};

use crate::episode::EpisodeSummary;

/// What one training episode produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub reward: f32,
    pub steps: usize,
    pub model_loss: Option<f32>,
    pub epsilon: f32,
}

/// Per-episode history of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub episodes: Vec<EpisodeRecord>,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, summary: &EpisodeSummary, epsilon: f32) {
        self.episodes.push(EpisodeRecord {
            episode: self.episodes.len() + 1,
            reward: summary.total_reward,
            steps: summary.steps,
            model_loss: summary.mean_model_loss,
            epsilon,
        });
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.episodes.iter().map(|e| e.reward).collect()
    }

    pub fn total_steps(&self) -> usize {
        self.episodes.iter().map(|e| e.steps).sum()
    }

    pub fn mean_reward(&self) -> Option<f32> {
        mean(&self.rewards())
    }

    /// Mean reward of the last `window` episodes
    pub fn recent_mean_reward(&self, window: usize) -> Option<f32> {
        let rewards = self.rewards();
        let start = rewards.len().saturating_sub(window);
        mean(&rewards[start..])
    }

    /// Mean reward of consecutive groups of `bin` episodes. A trailing
    /// partial group is averaged on its own.
    pub fn binned_means(&self, bin: usize) -> Vec<f32> {
        if bin == 0 {
            return Vec::new();
        }
        self.rewards()
            .chunks(bin)
            .filter_map(mean)
            .collect()
    }

    /// Mean of the recorded per-episode model losses
    pub fn mean_model_loss(&self) -> Option<f32> {
        let losses: Vec<f32> = self.episodes.iter().filter_map(|e| e.model_loss).collect();
        mean(&losses)
    }
}

pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}
