//! Cost of one training episode per dynamics model
//!
//! ```bash
//! cargo bench --bench episode_benchmark
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil::agent::AgentBuilder;
use vigil::config::ModelKind;
use vigil::env::GridWorld;
use vigil::episode::{run_episode, Mode};
use vigil::replay_buffer::{ReplayBuffer, Transition};

fn bench_training_episode(c: &mut Criterion) {
    let mut group = c.benchmark_group("training_episode");
    for kind in [ModelKind::Linear, ModelKind::Mlp] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", kind)), &kind, |b, &kind| {
            let mut env = GridWorld::new(5, 1);
            let mut agent = AgentBuilder::new(4, 5).model(kind).build().unwrap();
            b.iter(|| black_box(run_episode(&mut env, &mut agent, Mode::Train).unwrap()));
        });
    }
    group.finish();
}

fn bench_replay_sampling(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let mut buffer = ReplayBuffer::new(10_000);
    for _ in 0..10_000 {
        let state = Array1::from_shape_fn(4, |_| rng.gen_range(0.0..5.0));
        buffer.push(Transition::new(state.clone(), rng.gen_range(0..5), state));
    }

    c.bench_function("replay_sample_32", |b| {
        b.iter(|| black_box(buffer.sample(32, &mut rng).map(|batch| batch.len())))
    });
}

criterion_group!(benches, bench_training_episode, bench_replay_sampling);
criterion_main!(benches);
