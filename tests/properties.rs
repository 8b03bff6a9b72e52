//! Property-based checks for the statistics shared by the store and the
//! sampler window.

use proptest::collection::vec;
use proptest::prelude::*;

use rtt_monitor::stats::{summary, RollingWindow, RttStore};

fn rtts() -> impl Strategy<Value = Vec<f64>> {
    vec(0.0f64..5_000.0, 1..200)
}

proptest! {
    #[test]
    fn store_stats_bound_every_sample(values in rtts()) {
        let store = RttStore::new();
        for v in &values {
            store.record_ping("p", Some(0.0), *v).unwrap();
        }

        let stats = store.stats("p").unwrap();
        prop_assert_eq!(stats.count, values.len());
        for v in &values {
            prop_assert!(stats.min <= *v && *v <= stats.max);
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        prop_assert!((stats.mean - mean).abs() < 1e-6);
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
    }

    #[test]
    fn window_holds_at_most_capacity_and_counts_everything(
        values in vec(0.0f64..1_000.0, 0..400),
        capacity in 1usize..150,
    ) {
        let mut window = RollingWindow::with_capacity(capacity);
        for v in &values {
            window.push(*v);
        }

        prop_assert_eq!(window.total(), values.len() as u64);
        prop_assert_eq!(window.len(), values.len().min(capacity));

        let tail = &values[values.len() - window.len()..];
        prop_assert_eq!(window.values(), tail.to_vec());
    }

    #[test]
    fn std_dev_is_shift_invariant(values in rtts(), shift in 0.0f64..1_000.0) {
        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
        let a = summary::std_dev(&values).unwrap();
        let b = summary::std_dev(&shifted).unwrap();
        prop_assert!((a - b).abs() < 1e-6);
    }
}
