//! # Episode Driver
//!
//! Runs one episode as a small state machine:
//!
//! ```text
//! Ready ──advance──▶ Running ──advance──▶ Running … ──(done)──▶ Terminated
//! ```
//!
//! Each `advance` from `Ready` or `Running` performs exactly one environment
//! step: select an action, step the environment and, in
//! [`Mode::Train`], update the value table, store the transition and train
//! the dynamics model. [`Mode::Evaluate`] runs the same loop but never
//! mutates the agent's table, buffer or model.

use crate::agent::{Agent, State};
use crate::env::Environment;
use crate::error::{Result, VigilError};
use crate::policy::EpsilonGreedy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Train,
    Evaluate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Environment reset, no step taken yet
    Ready,
    /// At least one step taken, episode still live
    Running,
    /// Environment reported `done`
    Terminated,
}

/// Totals for a finished episode
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub total_reward: f32,
    pub steps: usize,
    /// Mean dynamics-model loss over the steps that trained the model
    pub mean_model_loss: Option<f32>,
    pub final_state: State,
}

pub struct Episode<'a, E: Environment> {
    env: &'a mut E,
    agent: &'a mut Agent,
    mode: Mode,
    eval_policy: EpsilonGreedy,
    phase: Phase,
    state: State,
    total_reward: f32,
    steps: usize,
    loss_sum: f32,
    loss_count: usize,
}

impl<'a, E: Environment> Episode<'a, E> {
    /// Reset `env` and start an episode. Evaluation uses a greedy policy;
    /// see [`Episode::with_eval_epsilon`].
    pub fn new(env: &'a mut E, agent: &'a mut Agent, mode: Mode) -> Result<Self> {
        if env.action_dim() != agent.action_dim() {
            return Err(VigilError::dimension_mismatch(
                format!("{} actions", agent.action_dim()),
                format!("{} actions", env.action_dim()),
            ));
        }
        let state = env.reset();
        VigilError::check_dim(agent.state_dim(), state.len(), "state")?;
        tracing::debug!(?mode, "episode ready");

        Ok(Episode {
            env,
            agent,
            mode,
            eval_policy: EpsilonGreedy::new(0.0)?,
            phase: Phase::Ready,
            state,
            total_reward: 0.0,
            steps: 0,
            loss_sum: 0.0,
            loss_count: 0,
        })
    }

    /// Exploration rate used in [`Mode::Evaluate`]
    pub fn with_eval_epsilon(mut self, epsilon: f32) -> Result<Self> {
        self.eval_policy.set_epsilon(epsilon)?;
        Ok(self)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Take one step. A terminated episode stays terminated.
    pub fn advance(&mut self) -> Result<Phase> {
        if self.phase == Phase::Terminated {
            return Ok(self.phase);
        }

        let action = match self.mode {
            Mode::Train => self.agent.act(self.state.view())?,
            Mode::Evaluate => self.agent.act_readonly(self.state.view(), &self.eval_policy)?,
        };

        let result = self.env.step(action)?;
        VigilError::check_dim(self.agent.state_dim(), result.state.len(), "state")?;

        if self.mode == Mode::Train {
            if let Some(loss) = self.agent.observe(self.state.view(), action, result.reward, result.state.view())? {
                self.loss_sum += loss;
                self.loss_count += 1;
            }
        }

        self.total_reward += result.reward;
        self.steps += 1;
        self.state = result.state;

        let next_phase = if result.done { Phase::Terminated } else { Phase::Running };
        if next_phase != self.phase {
            tracing::debug!(from = ?self.phase, to = ?next_phase, steps = self.steps, "episode phase change");
        }
        self.phase = next_phase;
        Ok(self.phase)
    }

    /// Advance until the environment reports `done`.
    pub fn run(mut self) -> Result<EpisodeSummary> {
        while self.advance()? != Phase::Terminated {}
        Ok(self.summary())
    }

    fn summary(self) -> EpisodeSummary {
        EpisodeSummary {
            total_reward: self.total_reward,
            steps: self.steps,
            mean_model_loss: if self.loss_count == 0 {
                None
            } else {
                Some(self.loss_sum / self.loss_count as f32)
            },
            final_state: self.state,
        }
    }
}

/// Run one full episode.
pub fn run_episode<E: Environment>(env: &mut E, agent: &mut Agent, mode: Mode) -> Result<EpisodeSummary> {
    Episode::new(env, agent, mode)?.run()
}

