//! # Training Runs
//!
//! [`Trainer`] drives a whole run: `episodes` training episodes followed by
//! `eval_episodes` read-only evaluation episodes. Progress is logged through
//! `tracing` every `log_every` episodes.
//!
//! ```rust
//! use vigil::config::{RunConfig, ModelKind};
//! use vigil::env::GridWorld;
//! use vigil::trainer::Trainer;
//!
//! let config = RunConfig { episodes: 3, model: ModelKind::Linear, ..RunConfig::default() };
//! let trainer = Trainer::new(config).unwrap();
//! let mut env = GridWorld::new(5, 1);
//! let mut agent = trainer.build_agent(&env).unwrap();
//! let report = trainer.run(&mut env, &mut agent).unwrap();
//! assert_eq!(report.training.len(), 3);
//! assert_eq!(report.evaluation.len(), 1);
//! ```

use crate::agent::Agent;
use crate::config::RunConfig;
use crate::discretize::Discretizer;
use crate::env::Environment;
use crate::episode::{Episode, Mode};
use crate::error::Result;
use crate::metrics::{mean, TrainingMetrics};
use crate::report::TrainingReport;

pub struct Trainer {
    config: RunConfig,
}

impl Trainer {
    /// Validate `config` and wrap it
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Discretizer for `env`, honouring `key_precision` when set
    pub fn discretizer<E: Environment>(&self, env: &E) -> Discretizer {
        match self.config.key_precision {
            Some(decimals) => Discretizer::Round { decimals },
            None => env.default_discretizer(),
        }
    }

    /// Fresh agent sized for `env`
    pub fn build_agent<E: Environment>(&self, env: &E) -> Result<Agent> {
        Agent::from_config(&self.config, env.state_dim(), env.action_dim(), self.discretizer(env))
    }

    /// Run the training episodes, decaying epsilon between them.
    pub fn train<E: Environment>(&self, env: &mut E, agent: &mut Agent) -> Result<TrainingMetrics> {
        let mut metrics = TrainingMetrics::new();
        tracing::info!(
            episodes = self.config.episodes,
            model = ?agent.model.kind(),
            epsilon = agent.epsilon(),
            "training started"
        );

        for episode in 0..self.config.episodes {
            let epsilon = agent.epsilon();
            let summary = Episode::new(env, agent, Mode::Train)?.run()?;
            metrics.record(&summary, epsilon);

            if (episode + 1) % self.config.log_every == 0 {
                tracing::info!(
                    episode = episode + 1,
                    reward = summary.total_reward,
                    recent_mean = metrics.recent_mean_reward(self.config.log_every).unwrap_or(0.0),
                    model_loss = summary.mean_model_loss.unwrap_or(f32::NAN),
                    states = agent.q_table.len(),
                    "episode finished"
                );
            }

            let floor = self.config.epsilon_min.min(epsilon);
            agent.set_epsilon((epsilon * self.config.epsilon_decay).max(floor))?;
        }

        tracing::info!(
            total_steps = metrics.total_steps(),
            mean_reward = metrics.mean_reward().unwrap_or(0.0),
            "training finished"
        );
        Ok(metrics)
    }

    /// Run `episodes` evaluation episodes and return their rewards.
    pub fn evaluate<E: Environment>(&self, env: &mut E, agent: &mut Agent, episodes: usize) -> Result<Vec<f32>> {
        let mut rewards = Vec::with_capacity(episodes);
        for _ in 0..episodes {
            let summary = Episode::new(env, agent, Mode::Evaluate)?
                .with_eval_epsilon(self.config.eval_epsilon)?
                .run()?;
            rewards.push(summary.total_reward);
        }
        if let Some(mean_reward) = mean(&rewards) {
            tracing::info!(episodes, mean_reward, "evaluation finished");
        }
        Ok(rewards)
    }

    /// Train, evaluate and collect everything into a report.
    pub fn run<E: Environment>(&self, env: &mut E, agent: &mut Agent) -> Result<TrainingReport> {
        let training = self.train(env, agent)?;
        let evaluation = self.evaluate(env, agent, self.config.eval_episodes)?;
        let model_error = agent.model_error()?;
        if let Some(error) = model_error {
            tracing::info!(error, buffered = agent.memory.len(), "dynamics model prediction error");
        }

        Ok(TrainingReport {
            config: self.config.clone(),
            training,
            evaluation,
            model_error,
            value_table_size: agent.q_table.len(),
            buffered_transitions: agent.memory.len(),
        })
    }
}
