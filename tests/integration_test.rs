use vigil::{
    agent::AgentBuilder,
    config::{EnvKind, ModelKind, RunConfig},
    env::{AnyEnvironment, Environment, FieldWorld, GridWorld},
    episode::{run_episode, Mode},
    metrics::mean,
    report::{plot_rewards, TrainingReport},
    trainer::Trainer,
};

#[test]
fn test_grid_training_end_to_end() {
    let config = RunConfig {
        episodes: 100,
        eval_episodes: 20,
        epsilon: 0.1,
        eval_epsilon: 0.0,
        max_steps: Some(50),
        seed: 11,
        ..RunConfig::default()
    };
    let trainer = Trainer::new(config).unwrap();
    let mut env = AnyEnvironment::from_config(trainer.config());
    let mut agent = trainer.build_agent(&env).unwrap();

    let report = trainer.run(&mut env, &mut agent).unwrap();

    assert_eq!(report.training.len(), 100);
    assert_eq!(report.evaluation.len(), 20);
    assert_eq!(report.reward_trend().len(), 10);
    for record in &report.training.episodes {
        assert!(record.steps >= 1 && record.steps <= 50);
        assert!(record.reward == 0.0 || record.reward == -1.0);
    }
    assert!(report.evaluation.iter().all(|&r| r == 0.0 || r == -1.0));

    assert!(report.value_table_size > 0);
    assert!(report.buffered_transitions >= 100);
    assert!(report.model_error.unwrap().is_finite());
}

#[test]
fn test_grid_policy_improves_with_training() {
    let config = RunConfig {
        episodes: 3000,
        eval_episodes: 500,
        epsilon: 0.1,
        eval_epsilon: 0.0,
        model: ModelKind::Linear,
        max_steps: Some(50),
        ..RunConfig::default()
    };
    let trainer = Trainer::new(config).unwrap();

    // Greedy policy of an untrained agent with the same seeds
    let mut baseline_env = AnyEnvironment::from_config(trainer.config());
    let mut baseline_agent = trainer.build_agent(&baseline_env).unwrap();
    let baseline = mean(&trainer.evaluate(&mut baseline_env, &mut baseline_agent, 500).unwrap()).unwrap();
    assert!(baseline_agent.q_table.is_empty());

    let mut env = AnyEnvironment::from_config(trainer.config());
    let mut agent = trainer.build_agent(&env).unwrap();
    let report = trainer.run(&mut env, &mut agent).unwrap();

    let trained = report.evaluation_mean().unwrap();
    assert!(
        trained > baseline + 0.1,
        "trained greedy reward {} does not beat untrained {}",
        trained,
        baseline
    );

    assert_eq!(report.reward_trend().len(), 300);
    let groups = report.training.binned_means(300);
    assert_eq!(groups.len(), 10);
    let first = groups[0];
    let last = groups[groups.len() - 1];
    assert!(last > first, "binned rewards did not rise: {:?}", groups);
}

#[test]
fn test_evaluation_leaves_agent_untouched() {
    let trainer = Trainer::new(RunConfig { episodes: 5, model: ModelKind::Linear, ..RunConfig::default() }).unwrap();
    let mut env = GridWorld::new(5, 3);
    let mut agent = trainer.build_agent(&env).unwrap();
    trainer.train(&mut env, &mut agent).unwrap();

    let table_size = agent.q_table.len();
    let buffered = agent.memory.len();
    let train_steps = agent.train_steps;

    let rewards = trainer.evaluate(&mut env, &mut agent, 10).unwrap();
    assert_eq!(rewards.len(), 10);
    assert_eq!(agent.q_table.len(), table_size);
    assert_eq!(agent.memory.len(), buffered);
    assert_eq!(agent.train_steps, train_steps);
}

#[test]
fn test_field_linear_model_learns_moves() {
    let config = RunConfig {
        env: EnvKind::Field,
        model: ModelKind::Linear,
        model_learning_rate: 0.01,
        episodes: 20,
        epsilon: 0.5,
        seed: 5,
        ..RunConfig::default()
    };
    let trainer = Trainer::new(config).unwrap();
    let mut env = AnyEnvironment::from_config(trainer.config());
    let mut agent = trainer.build_agent(&env).unwrap();

    let report = trainer.run(&mut env, &mut agent).unwrap();
    assert_eq!(report.training.total_steps(), 20 * 100);
    assert!(report.model_error.unwrap() < 1e-4);

    // Action 3 moves +0.1 along x
    let predicted = agent.predict_next_state(ndarray::array![1.0, 1.0].view(), 3).unwrap();
    assert!((predicted[0] - 1.1).abs() < 1e-2);
    assert!((predicted[1] - 1.0).abs() < 1e-2);
}

#[test]
fn test_epsilon_decays_between_episodes() {
    let config = RunConfig {
        episodes: 10,
        epsilon: 0.5,
        epsilon_decay: 0.5,
        epsilon_min: 0.05,
        model: ModelKind::Linear,
        ..RunConfig::default()
    };
    let trainer = Trainer::new(config).unwrap();
    let mut env = GridWorld::new(5, 0);
    let mut agent = trainer.build_agent(&env).unwrap();
    let metrics = trainer.train(&mut env, &mut agent).unwrap();

    let epsilons: Vec<f32> = metrics.episodes.iter().map(|e| e.epsilon).collect();
    assert_eq!(epsilons[0], 0.5);
    assert_eq!(epsilons[1], 0.25);
    assert!(epsilons.iter().all(|&e| e >= 0.05));
    assert_eq!(agent.epsilon(), 0.05);
}

#[test]
fn test_independent_runs_with_same_seed_match() {
    let config = RunConfig { episodes: 10, model: ModelKind::Linear, ..RunConfig::default() };
    let run = || {
        let trainer = Trainer::new(config.clone()).unwrap();
        let mut env = AnyEnvironment::from_config(trainer.config());
        let mut agent = trainer.build_agent(&env).unwrap();
        trainer.run(&mut env, &mut agent).unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.training, second.training);
    assert_eq!(first.evaluation, second.evaluation);
}

#[test]
fn test_custom_step_budget_and_render() {
    let mut env = GridWorld::new(5, 2).with_max_steps(3).with_guard(true);
    let mut agent = AgentBuilder::new(4, 5).model(ModelKind::Linear).batch_size(1).build().unwrap();
    let summary = run_episode(&mut env, &mut agent, Mode::Train).unwrap();
    assert!(summary.steps <= 3);

    let picture = env.render();
    assert_eq!(picture.lines().count(), 5);
    assert!(picture.contains('A'));

    let field = FieldWorld::new().with_max_steps(4);
    assert!(field.render().contains("step 0/4"));
}

#[test]
fn test_report_json_export() {
    let trainer = Trainer::new(RunConfig { episodes: 4, model: ModelKind::Linear, ..RunConfig::default() }).unwrap();
    let mut env = GridWorld::new(5, 9);
    let mut agent = trainer.build_agent(&env).unwrap();
    let report = trainer.run(&mut env, &mut agent).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let loaded: TrainingReport = serde_json::from_str(&contents).unwrap();
    assert_eq!(loaded.training.len(), 4);
    assert_eq!(loaded.config, report.config);
    assert_eq!(loaded.value_table_size, report.value_table_size);

    assert!(report.summary().contains("Episodes: 4"));
    let plot = plot_rewards(&report.training, 40, 8);
    assert!(plot.starts_with("Episode Rewards") || plot.contains("All values are"));
    assert_eq!(mean(&report.evaluation), report.evaluation_mean());
}
