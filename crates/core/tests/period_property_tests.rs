//! Property-based integration tests for the period calculator and the
//! savings threshold arithmetic.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use chrono::{DateTime, TimeZone, Utc};
use fintrack_core::jobs::{savings_alert_threshold_minor, savings_threshold_reached};
use fintrack_core::period::{next_due_at, period_start, window_for, PeriodFrequency};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn arb_frequency() -> impl Strategy<Value = PeriodFrequency> {
    prop_oneof![
        Just(PeriodFrequency::Daily),
        Just(PeriodFrequency::Weekly),
        Just(PeriodFrequency::Monthly),
        Just(PeriodFrequency::Yearly),
    ]
}

/// Instants between 2000-01-01 and 2100-01-01.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn next_due_is_strictly_after_reference(freq in arb_frequency(), t in arb_instant()) {
        prop_assert!(next_due_at(freq, t) > t);
    }

    #[test]
    fn repeated_next_due_strictly_advances(freq in arb_frequency(), t in arb_instant(), steps in 1usize..24) {
        let mut current = t;
        for _ in 0..steps {
            let next = next_due_at(freq, current);
            prop_assert!(next > current);
            prop_assert_eq!(period_start(freq, next), next);
            current = next;
        }
    }

    #[test]
    fn window_is_non_empty_and_precedes_reference(freq in arb_frequency(), t in arb_instant()) {
        let window = window_for(freq, t);
        prop_assert!(window.to > window.from);
        prop_assert!(window.to <= t);
        prop_assert!(!window.contains(t));
        prop_assert_eq!(window.to, period_start(freq, t));
    }

    #[test]
    fn threshold_matches_exact_comparison(salary in 0i64..10_000_000_000, goal in 5i32..=100) {
        let threshold = savings_alert_threshold_minor(salary, goal);
        prop_assert!(savings_threshold_reached(salary, goal, threshold));
        if threshold > 0 {
            prop_assert!(!savings_threshold_reached(salary, goal, threshold - 1));
        }
    }
}
