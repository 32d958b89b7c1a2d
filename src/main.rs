//! # Vigil CLI
//!
//! Trains an agent in the grid or field environment, evaluates it, renders
//! the final evaluation state and prints a reward plot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vigil::activations::Activation;
use vigil::config::{EnvKind, ModelKind, OptimizerKind, RunConfig};
use vigil::env::{AnyEnvironment, Environment};
use vigil::report::plot_rewards;
use vigil::trainer::Trainer;

#[derive(Parser, Debug)]
#[command(name = "vigil", about = "Q-learning agent with a learned world model")]
struct Cli {
    /// JSON run configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    episodes: Option<usize>,

    #[arg(long)]
    eval_episodes: Option<usize>,

    #[arg(long, value_enum)]
    env: Option<EnvKind>,

    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    #[arg(long, value_enum)]
    optimizer: Option<OptimizerKind>,

    /// Hidden layer activation of the mlp model
    #[arg(long, value_enum)]
    hidden_activation: Option<Activation>,

    #[arg(long)]
    epsilon: Option<f32>,

    #[arg(long)]
    alpha: Option<f32>,

    #[arg(long)]
    gamma: Option<f32>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    epochs_per_step: Option<usize>,

    #[arg(long)]
    replay_capacity: Option<usize>,

    #[arg(long)]
    model_learning_rate: Option<f32>,

    #[arg(long)]
    max_steps: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the environment after the last evaluation episode
    #[arg(long)]
    render: bool,

    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(v) = self.episodes { config.episodes = v; }
        if let Some(v) = self.eval_episodes { config.eval_episodes = v; }
        if let Some(v) = self.env { config.env = v; }
        if let Some(v) = self.model { config.model = v; }
        if let Some(v) = self.optimizer { config.optimizer = v; }
        if let Some(v) = self.hidden_activation { config.hidden_activation = v; }
        if let Some(v) = self.epsilon { config.epsilon = v; }
        if let Some(v) = self.alpha { config.alpha = v; }
        if let Some(v) = self.gamma { config.gamma = v; }
        if let Some(v) = self.batch_size { config.batch_size = v; }
        if let Some(v) = self.epochs_per_step { config.epochs_per_step = v; }
        if let Some(v) = self.replay_capacity { config.replay_capacity = v; }
        if let Some(v) = self.model_learning_rate { config.model_learning_rate = v; }
        if self.max_steps.is_some() { config.max_steps = self.max_steps; }
        if let Some(v) = self.seed { config.seed = v; }

        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.run_config()?;

    let trainer = Trainer::new(config)?;
    let mut env = AnyEnvironment::from_config(trainer.config());
    let mut agent = trainer.build_agent(&env)?;

    let report = trainer.run(&mut env, &mut agent)?;

    println!("{}", report.summary());
    println!("{}", plot_rewards(&report.training, 60, 12));

    if cli.render {
        println!("{}", env.render());
    }

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
