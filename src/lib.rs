//! # Vigil - Tabular Q-Learning with a Learned World Model
//!
//! Vigil is a small reinforcement-learning sandbox. An agent learns to act in
//! an environment containing a hazard by combining tabular temporal-difference
//! learning with a dynamics ("world") model trained from replayed experience.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vigil::config::RunConfig;
//! use vigil::env::GridWorld;
//! use vigil::trainer::Trainer;
//!
//! let trainer = Trainer::new(RunConfig::default()).unwrap();
//! let mut env = GridWorld::new(5, 1);
//! let mut agent = trainer.build_agent(&env).unwrap();
//! let report = trainer.run(&mut env, &mut agent).unwrap();
//! println!("{}", report.summary());
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - The learning agent and its builder
//! - [`value_table`] - Lazily grown action-value table with the TD update
//! - [`policy`] - Epsilon-greedy action selection
//! - [`replay_buffer`] - Bounded FIFO of transitions with uniform sampling
//! - [`world_model`] - Linear and feed-forward dynamics models
//! - [`layers`], [`activations`], [`optimizer`] - Network building blocks
//! - [`discretize`] - State to table-key discretization
//! - [`env`] - Environment contract plus the grid and field environments
//! - [`episode`] - Single-episode driver
//! - [`trainer`] - Multi-episode training and evaluation
//! - [`metrics`], [`report`] - Run statistics, ASCII plots, JSON export
//! - [`config`] - Run configuration and validation
//! - [`error`] - Error types and result handling

pub mod activations;
pub mod agent;
pub mod config;
pub mod discretize;
pub mod env;
pub mod episode;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod optimizer;
pub mod policy;
pub mod replay_buffer;
pub mod report;
pub mod trainer;
pub mod value_table;
pub mod world_model;

#[cfg(test)]
mod tests;
