use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::activations::Activation;
use crate::config::{ModelKind, OptimizerKind, RunConfig};
use crate::error::VigilError;
use crate::optimizer::{Adam, OptimizerWrapper, SGD};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::world_model::{one_hot, DynamicsModel, LinearWorldModel, MlpWorldModel, WorldModelWrapper};

fn offsets() -> Array2<f32> {
    array![[0.0, -1.0], [0.0, 1.0], [-1.0, 0.0], [1.0, 0.0], [0.0, 0.0]]
}

fn offset_transitions(count: usize, seed: u64) -> Vec<Transition> {
    let constants = offsets();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let state = array![rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0)];
            let action = rng.gen_range(0..5);
            let next_state = &state + &constants.row(action);
            Transition::new(state, action, next_state)
        })
        .collect()
}

#[test]
fn test_one_hot() {
    assert_eq!(one_hot(2, 4).unwrap(), array![0.0, 0.0, 1.0, 0.0]);
    assert_eq!(one_hot(4, 4), Err(VigilError::InvalidAction { action: 4, max_actions: 4 }));
}

#[test]
fn test_linear_model_converges_to_offsets() {
    let transitions = offset_transitions(200, 1);
    let mut buffer = ReplayBuffer::new(200);
    for t in transitions {
        buffer.push(t);
    }

    let mut model = LinearWorldModel::new(2, 5, 0.05);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..300 {
        let batch = buffer.sample(16, &mut rng).unwrap();
        model.train_step(&batch).unwrap();
    }

    let constants = offsets();
    for action in 0..5 {
        for (learned, expected) in model.offset(action).iter().zip(constants.row(action).iter()) {
            assert!((learned - expected).abs() < 1e-3, "action {}: {} vs {}", action, learned, expected);
        }
    }
}

#[test]
fn test_linear_predict_adds_offset() {
    let mut model = LinearWorldModel::new(2, 2, 0.1);
    model.offsets.row_mut(1).assign(&array![0.5, -0.5]);
    assert_eq!(model.predict(array![1.0, 1.0].view(), 1).unwrap(), array![1.5, 0.5]);
    assert_eq!(model.predict(array![1.0, 1.0].view(), 0).unwrap(), array![1.0, 1.0]);
}

#[test]
fn test_empty_batch_is_noop() {
    let mut linear = LinearWorldModel::new(2, 3, 0.1);
    assert_eq!(linear.train_step(&[]).unwrap(), None);
    assert!(linear.offsets.iter().all(|&w| w == 0.0));

    let mut rng = StdRng::seed_from_u64(0);
    let mut mlp = MlpWorldModel::new(2, 3, 8, 0.01, OptimizerWrapper::Adam(Adam::default()), &mut rng);
    let before = mlp.hidden.weights.clone();
    assert_eq!(mlp.train_step(&[]).unwrap(), None);
    assert_eq!(mlp.hidden.weights, before);
}

#[test]
fn test_mlp_predict_is_pure() {
    let mut rng = StdRng::seed_from_u64(4);
    let mlp = MlpWorldModel::new(4, 5, 16, 0.01, OptimizerWrapper::SGD(SGD::new()), &mut rng);
    let state = array![0.0, 1.0, 2.0, 0.0];
    let first = mlp.predict(state.view(), 3).unwrap();
    let second = mlp.predict(state.view(), 3).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_mlp_loss_decreases() {
    let transitions = offset_transitions(64, 8);
    let batch: Vec<&Transition> = transitions.iter().collect();

    let mut rng = StdRng::seed_from_u64(11);
    let mut mlp = MlpWorldModel::new(2, 5, 32, 0.01, OptimizerWrapper::Adam(Adam::default()), &mut rng);

    let initial = mlp.prediction_error(transitions.iter()).unwrap().unwrap();
    for _ in 0..500 {
        mlp.train_step(&batch).unwrap();
    }
    let trained = mlp.prediction_error(transitions.iter()).unwrap().unwrap();
    assert!(trained < initial * 0.2, "loss {} -> {}", initial, trained);
}

#[test]
fn test_mlp_sgd_step_reduces_batch_loss() {
    let transitions = offset_transitions(32, 21);
    let batch: Vec<&Transition> = transitions.iter().collect();

    let mut rng = StdRng::seed_from_u64(12);
    let mut mlp = MlpWorldModel::new(2, 5, 16, 0.01, OptimizerWrapper::SGD(SGD::new()), &mut rng);
    let first = mlp.train_step(&batch).unwrap().unwrap();
    let mut last = first;
    for _ in 0..50 {
        last = mlp.train_step(&batch).unwrap().unwrap();
    }
    assert!(last < first);
}

#[test]
fn test_train_step_rejects_wrong_state_width() {
    let mut model = LinearWorldModel::new(2, 2, 0.1);
    let bad = Transition::new(array![1.0, 2.0, 3.0], 0, array![1.0, 2.0, 3.0]);
    assert!(matches!(model.train_step(&[&bad]), Err(VigilError::DimensionMismatch { .. })));
    assert!(model.offsets.iter().all(|&w| w == 0.0));
}

#[test]
fn test_wrapper_builds_requested_kind() {
    let mut rng = StdRng::seed_from_u64(0);
    let linear = RunConfig { model: ModelKind::Linear, ..RunConfig::default() };
    let mlp = RunConfig { model: ModelKind::Mlp, optimizer: OptimizerKind::Sgd, hidden_size: 8, ..RunConfig::default() };

    let a = WorldModelWrapper::from_config(&linear, 4, 5, &mut rng);
    let b = WorldModelWrapper::from_config(&mlp, 4, 5, &mut rng);
    assert_eq!(a.kind(), ModelKind::Linear);
    assert_eq!(b.kind(), ModelKind::Mlp);
    assert_eq!((a.state_dim(), a.action_dim()), (4, 5));
    assert_eq!((b.state_dim(), b.action_dim()), (4, 5));
    if let WorldModelWrapper::Mlp(model) = &b {
        assert_eq!(model.hidden_size(), 8);
    }

    let state: Array1<f32> = Array1::zeros(4);
    assert_eq!(a.predict(state.view(), 0).unwrap(), state);
    assert!(b.predict(state.view(), 5).is_err());
}

#[test]
fn test_config_selects_hidden_activation() {
    let mut rng = StdRng::seed_from_u64(0);
    for activation in [Activation::Relu, Activation::LeakyRelu, Activation::Tanh, Activation::Linear] {
        let config = RunConfig { hidden_activation: activation, hidden_size: 4, ..RunConfig::default() };
        match WorldModelWrapper::from_config(&config, 2, 3, &mut rng) {
            WorldModelWrapper::Mlp(model) => {
                assert_eq!(model.hidden.activation, activation);
                assert_eq!(model.output.activation, Activation::Linear);
            }
            other => panic!("expected mlp, got {:?}", other.kind()),
        }
    }
}

#[test]
fn test_smooth_hidden_activations_learn() {
    let transitions = offset_transitions(64, 8);
    let batch: Vec<&Transition> = transitions.iter().collect();

    for activation in [Activation::Tanh, Activation::LeakyRelu] {
        let mut rng = StdRng::seed_from_u64(11);
        let mut mlp = MlpWorldModel::with_activation(
            2,
            5,
            32,
            activation,
            0.01,
            OptimizerWrapper::Adam(Adam::default()),
            &mut rng,
        );
        let initial = mlp.prediction_error(transitions.iter()).unwrap().unwrap();
        for _ in 0..500 {
            mlp.train_step(&batch).unwrap();
        }
        let trained = mlp.prediction_error(transitions.iter()).unwrap().unwrap();
        assert!(trained < initial * 0.5, "{:?}: loss {} -> {}", activation, initial, trained);
    }
}
