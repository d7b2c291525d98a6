//! Property tests for view ordering
//!
//! Ordering must be stable, directions must mirror each other, and
//! sentinel tokens must dominate every finite value.

use proptest::prelude::*;
use tabview_core::{
    ColumnSpec, CompareKind, DatasetProfile, Predicate, Record, RowClassifier, SortDirection,
    TabularView, ThresholdOp, Value,
};

fn scored_profile(kind: CompareKind) -> DatasetProfile {
    DatasetProfile::new("scored", "Scored")
        .column(ColumnSpec::new("score", "Score"), kind)
        .rules(
            RowClassifier::default()
                .rule("high", Predicate::threshold("score", ThresholdOp::Gt, 50.0))
                .rule("mid", Predicate::threshold("score", ThresholdOp::Gt, 0.0)),
        )
}

fn records(values: &[Value]) -> Vec<Record> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Record::new(i.to_string()).with("score", v.clone()))
        .collect()
}

fn arrival_order(view: &TabularView) -> Vec<usize> {
    view.rows().map(|r| r.arrival).collect()
}

/// Sorted view in the given direction
fn sorted(profile: DatasetProfile, values: &[Value], direction: SortDirection) -> TabularView {
    let mut view = TabularView::with_records(profile, records(values));
    view.toggle_sort("score").unwrap();
    if direction == SortDirection::Descending {
        view.toggle_sort("score").unwrap();
    }
    view
}

fn small_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-5i64..5).prop_map(|n| Value::Number(n as f64)),
        Just(Value::Absent),
        Just(Value::Text("n/a".to_string())),
    ]
}

fn sentinel_or_finite() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1.0e12f64..1.0e12).prop_map(Value::Number),
        Just(Value::Number(f64::MAX)),
        Just(Value::Token("Inf".to_string())),
        Just(Value::Token("infinity".to_string())),
    ]
}

proptest! {
    #[test]
    fn prop_ties_keep_arrival_order(values in prop::collection::vec(small_value(), 0..40)) {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let view = sorted(scored_profile(CompareKind::Numeric), &values, direction);
            let order = arrival_order(&view);
            for pair in order.windows(2) {
                let a = values[pair[0]].number_or_zero();
                let b = values[pair[1]].number_or_zero();
                if a == b {
                    prop_assert!(pair[0] < pair[1], "tie out of arrival order: {:?}", pair);
                }
            }
        }
    }

    #[test]
    fn prop_resort_round_trip_is_identical(values in prop::collection::vec(small_value(), 0..40)) {
        let mut view = TabularView::with_records(scored_profile(CompareKind::Numeric), records(&values));
        view.toggle_sort("score").unwrap();
        let first = arrival_order(&view);
        view.toggle_sort("score").unwrap();
        view.toggle_sort("score").unwrap();
        prop_assert_eq!(view.sort_state().direction, SortDirection::Ascending);
        prop_assert_eq!(arrival_order(&view), first);
    }

    #[test]
    fn prop_directions_mirror_for_distinct_keys(
        keys in prop::collection::btree_set(-1000i64..1000, 0..40),
        seed in any::<u64>(),
    ) {
        // Shuffle deterministically so arrival order is not already sorted
        let mut values: Vec<Value> = keys.into_iter().map(|k| Value::Number(k as f64)).collect();
        let len = values.len();
        if len > 1 {
            for i in 0..len {
                let j = ((seed as usize).wrapping_mul(31).wrapping_add(i * 17)) % len;
                values.swap(i, j);
            }
        }

        let asc = arrival_order(&sorted(scored_profile(CompareKind::Numeric), &values, SortDirection::Ascending));
        let mut desc = arrival_order(&sorted(scored_profile(CompareKind::Numeric), &values, SortDirection::Descending));
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn prop_sentinels_dominate(values in prop::collection::vec(sentinel_or_finite(), 1..30)) {
        let profile = scored_profile(CompareKind::NumericSentinel);
        let tokens = values.iter().filter(|v| v.is_token()).count();

        let asc = sorted(profile.clone(), &values, SortDirection::Ascending);
        let asc_tokens: Vec<bool> = asc.rows().map(|r| r.record.value("score").is_token()).collect();
        prop_assert!(asc_tokens[asc_tokens.len() - tokens..].iter().all(|t| *t));

        let desc = sorted(profile, &values, SortDirection::Descending);
        let desc_tokens: Vec<bool> = desc.rows().map(|r| r.record.value("score").is_token()).collect();
        prop_assert!(desc_tokens[..tokens].iter().all(|t| *t));
    }

    #[test]
    fn prop_tags_do_not_depend_on_order(values in prop::collection::vec(small_value(), 0..30)) {
        let profile = scored_profile(CompareKind::Numeric);
        let unsorted = TabularView::with_records(profile.clone(), records(&values));
        let desc = sorted(profile, &values, SortDirection::Descending);

        for row in desc.rows() {
            let same = unsorted.rows().find(|r| r.arrival == row.arrival).map(|r| r.tag);
            prop_assert_eq!(same, Some(row.tag));
        }
    }
}
