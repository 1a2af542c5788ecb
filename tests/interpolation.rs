//! Integration tests for linear interpolation.
//!
//! **Property: Interpolation Stays Within Samples**
//! On a table sorted by its key column, every interpolated value lies between
//! the smallest and largest sampled value.

use csvtable::{interpolate, ColumnRole, Table, TableError, TableRegistry};
use proptest::prelude::*;

const EPSILON: f64 = 1e-9;

fn ramp() -> Table {
    Table::from(vec![
        vec![0.0, 5.0],
        vec![1.0, 6.0],
        vec![2.0, 7.0],
        vec![3.0, 8.0],
    ])
}

#[test]
fn test_interpolates_between_samples() {
    let value = interpolate(&ramp(), 1.2, 0, 1).unwrap();
    assert!((value - 5.2).abs() < EPSILON, "got {}", value);
}

#[test]
fn test_exact_samples() {
    let table = ramp();
    assert_eq!(interpolate(&table, 0.0, 0, 1).unwrap(), 5.0);
    for (key, expected) in [(1.0, 6.0), (2.0, 7.0), (3.0, 8.0)] {
        let value = interpolate(&table, key, 0, 1).unwrap();
        assert!((value - expected).abs() < EPSILON, "key {} gave {}", key, value);
    }
}

#[test]
fn test_clamps_outside_range() {
    let table = ramp();
    assert_eq!(interpolate(&table, 5.5, 0, 1).unwrap(), 8.0);
    assert_eq!(interpolate(&table, -1.0, 0, 1).unwrap(), 5.0);
    assert_eq!(interpolate(&table, f64::INFINITY, 0, 1).unwrap(), 8.0);
    assert_eq!(interpolate(&table, f64::NEG_INFINITY, 0, 1).unwrap(), 5.0);
}

#[test]
fn test_duplicate_keys_take_first_value() {
    let table = Table::from(vec![vec![1.0, 10.0], vec![1.0, 20.0]]);
    assert_eq!(interpolate(&table, 1.0, 0, 1).unwrap(), 10.0);
}

#[test]
fn test_swapped_columns() {
    // Value column before the key column.
    let table = Table::from(vec![vec![10.0, 0.0], vec![30.0, 2.0]]);
    assert_eq!(interpolate(&table, 1.0, 1, 0).unwrap(), 20.0);
}

#[test]
fn test_single_row() {
    let table = Table::from(vec![vec![4.0, 9.0]]);
    assert_eq!(interpolate(&table, -3.0, 0, 1).unwrap(), 9.0);
    assert_eq!(interpolate(&table, 4.0, 0, 1).unwrap(), 9.0);
    assert_eq!(interpolate(&table, 8.0, 0, 1).unwrap(), 9.0);
}

#[test]
fn test_invalid_columns() {
    let table = ramp();
    assert!(matches!(
        interpolate(&table, 1.0, 2, 1),
        Err(TableError::InvalidColumn { role: ColumnRole::Key, index: 2, width: 2 })
    ));
    assert!(matches!(
        interpolate(&table, 1.0, 0, 5),
        Err(TableError::InvalidColumn { role: ColumnRole::Value, index: 5, width: 2 })
    ));
    assert!(matches!(
        interpolate(&Table::new(), 1.0, 0, 0),
        Err(TableError::InvalidColumn { width: 0, .. })
    ));
}

#[test]
fn test_through_registry_after_load() {
    let mut registry = TableRegistry::new();
    let id = registry
        .load("mach,cd\n0.0,0.30\n1.0,0.50\n2.0,0.40\n".as_bytes(), 1)
        .unwrap();
    let value = registry.interpolate(id, 1.5, 0, 1).unwrap();
    assert!((value - 0.45).abs() < EPSILON, "got {}", value);
}

/// Generator for tables sorted by column 0 with one value column.
fn arb_sorted_table() -> impl Strategy<Value = Table> {
    prop::collection::vec((-1e3..1e3f64, -1e3..1e3f64), 1..30).prop_map(|mut samples| {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Table::from(
            samples
                .into_iter()
                .map(|(key, value)| vec![key, value])
                .collect::<Vec<_>>(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Property: Interpolation Stays Within Samples**
    #[test]
    fn prop_result_within_value_range(table in arb_sorted_table(), key in -2e3..2e3f64) {
        let values: Vec<f64> = table.rows().iter().map(|row| row[1]).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let result = interpolate(&table, key, 0, 1).unwrap();

        let slack = EPSILON * (1.0 + max.abs().max(min.abs()));
        prop_assert!(result >= min - slack && result <= max + slack,
            "{} outside [{}, {}]", result, min, max);
    }

    /// **Property: Flat Extrapolation**
    ///
    /// Keys below the first sample or above the last return the boundary value.
    #[test]
    fn prop_flat_outside_range(table in arb_sorted_table(), offset in 1e-3..1e3f64) {
        let rows = table.rows();
        let first = &rows[0];
        let last = &rows[rows.len() - 1];

        prop_assert_eq!(interpolate(&table, first[0] - offset, 0, 1).unwrap(), first[1]);
        prop_assert_eq!(interpolate(&table, last[0] + offset, 0, 1).unwrap(), last[1]);
    }
}
