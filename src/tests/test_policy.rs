use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::error::VigilError;
use crate::policy::EpsilonGreedy;
use crate::value_table::ValueTable;

#[test]
fn test_rejects_out_of_range_epsilon() {
    assert!(matches!(EpsilonGreedy::new(1.5), Err(VigilError::InvalidParameter { .. })));
    assert!(matches!(EpsilonGreedy::new(-0.1), Err(VigilError::InvalidParameter { .. })));
    assert!(EpsilonGreedy::new(f32::NAN).is_err());
    assert!(EpsilonGreedy::new(0.0).is_ok());
    assert!(EpsilonGreedy::new(1.0).is_ok());
}

#[test]
fn test_greedy_is_deterministic() {
    let mut table = ValueTable::new(5);
    let key = vec![1, 1];
    table.update(&key, 3, 1.0, &vec![0, 0], 0.5, 0.0);

    let policy = EpsilonGreedy::new(0.0).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        assert_eq!(policy.select(&mut table, &key, &mut rng), 3);
    }
}

#[test]
fn test_full_exploration_is_uniform() {
    let mut table = ValueTable::new(5);
    let key = vec![0];
    table.update(&key, 4, 10.0, &vec![1], 1.0, 0.0);

    let policy = EpsilonGreedy::new(1.0).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 50_000;
    let mut counts = [0usize; 5];
    for _ in 0..draws {
        counts[policy.select(&mut table, &key, &mut rng)] += 1;
    }

    let expected = draws as f64 / 5.0;
    for &count in &counts {
        // Five standard deviations of a binomial(50000, 0.2)
        assert!((count as f64 - expected).abs() < 5.0 * (draws as f64 * 0.2 * 0.8).sqrt());
    }
}

#[test]
fn test_readonly_select_leaves_table_alone() {
    let table = ValueTable::new(3);
    let policy = EpsilonGreedy::new(0.0).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(policy.select_readonly(&table, &vec![3, 3], &mut rng), 0);
    assert!(table.is_empty());
}

#[test]
fn test_exploiting_select_creates_entry() {
    let mut table = ValueTable::new(3);
    let policy = EpsilonGreedy::new(0.0).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    policy.select(&mut table, &vec![3, 3], &mut rng);
    assert_eq!(table.len(), 1);
}
