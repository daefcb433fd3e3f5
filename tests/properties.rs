use proptest::prelude::*;
use semantic_intelligence::{
    cosine_similarity, mann_kendall_trend, temporal_decay, BayesianEstimator, SparseVec, Trend,
};

fn sparse_vec() -> impl Strategy<Value = SparseVec> {
    prop::collection::vec(("[a-e]{1,2}", 0.0f64..10.0), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn cosine_is_bounded(a in sparse_vec(), b in sparse_vec()) {
        let sim = cosine_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&sim));
        prop_assert!((sim - cosine_similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn interval_contains_mean(successes in 0u64..500, failures in 0u64..500, level in 0.5f64..0.99) {
        let mut b = BayesianEstimator::new();
        b.update(successes, failures);
        let (lo, hi) = b.confidence_interval(level);
        let mean = b.mean();
        prop_assert!(mean > 0.0 && mean < 1.0);
        prop_assert!(lo <= mean && mean <= hi);
        prop_assert!((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi));
    }

    #[test]
    fn risk_score_is_probability(successes in 0u64..200, total in 0u64..200, threshold in 0.0f64..1.0) {
        let risk = BayesianEstimator::from_stats(successes, total).risk_score(threshold);
        prop_assert!((0.0..=1.0).contains(&risk));
    }

    #[test]
    fn decay_never_increases_with_age(a in 0.0f64..1000.0, b in 0.0f64..1000.0, half_life in 0.1f64..365.0) {
        let (young, old) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(temporal_decay(young, half_life) >= temporal_decay(old, half_life));
        prop_assert!(temporal_decay(young, half_life) <= 1.0);
    }

    #[test]
    fn tau_is_bounded(values in prop::collection::vec(-100i32..100, 0..30)) {
        let result = mann_kendall_trend(&values);
        prop_assert!((-1.0..=1.0).contains(&result.tau));
        if values.len() < 3 {
            prop_assert_eq!(result.trend, Trend::Stable);
            prop_assert_eq!(result.tau, 0.0);
        }
    }
}
