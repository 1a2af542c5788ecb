// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Linear interpolation over a key column.
//!
//! The table is treated as a sampled function `key -> value`: rows are
//! expected in ascending order of the key column (this is not verified), a
//! query between two samples is interpolated linearly, and a query outside
//! the sampled range takes the value of the nearest boundary row.

use crate::error::{Result, TableError};
use crate::types::{Axis, ColumnRole, Element, Table};

/// Returns the value at `key`, read from `value_col` and located via `key_col`.
///
/// # Errors
///
/// * [`TableError::InvalidColumn`] if either column is not within the first
///   row (always the case for an empty table)
/// * [`TableError::OutOfRange`] if a row consulted by the search is shorter
///   than one of the columns
///
/// # Examples
///
/// ```rust
/// use csvtable::{interpolate, Table};
///
/// let table = Table::from(vec![
///     vec![0.0, 5.0],
///     vec![1.0, 6.0],
///     vec![2.0, 7.0],
///     vec![3.0, 8.0],
/// ]);
/// assert!((interpolate(&table, 1.2, 0, 1).unwrap() - 5.2).abs() < 1e-9);
/// assert_eq!(interpolate(&table, 5.5, 0, 1).unwrap(), 8.0);
/// assert_eq!(interpolate(&table, -1.0, 0, 1).unwrap(), 5.0);
/// ```
pub fn interpolate(
    table: &Table,
    key: Element,
    key_col: usize,
    value_col: usize,
) -> Result<Element> {
    let width = table.col_count();
    if key_col >= width {
        return Err(TableError::InvalidColumn {
            role: ColumnRole::Key,
            index: key_col,
            width,
        });
    }
    if value_col >= width {
        return Err(TableError::InvalidColumn {
            role: ColumnRole::Value,
            index: value_col,
            width,
        });
    }

    let upper = lower_bound(table, key, key_col)?;
    let rows = table.row_count();
    if upper == rows {
        return table.get(rows - 1, value_col);
    }
    if upper == 0 {
        return table.get(0, value_col);
    }

    let x1 = table.get(upper - 1, key_col)?;
    let x2 = table.get(upper, key_col)?;
    let y1 = table.get(upper - 1, value_col)?;
    if x1 == x2 {
        // Duplicate keys: no slope to follow.
        return Ok(y1);
    }
    let y2 = table.get(upper, value_col)?;
    Ok(y1 + (y2 - y1) / (x2 - x1) * (key - x1))
}

/// Index of the first row whose key is not less than `key`.
fn lower_bound(table: &Table, key: Element, key_col: usize) -> Result<usize> {
    let rows = table.rows();
    let (mut lo, mut hi) = (0, rows.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let probe = rows[mid].get(key_col).ok_or(TableError::OutOfRange {
            axis: Axis::Column,
            index: key_col as i64,
            extent: rows[mid].len(),
        })?;
        if *probe < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Table {
        Table::from(vec![
            vec![0.0, 5.0, 10.0],
            vec![1.0, 6.0, 20.0],
            vec![2.0, 7.0, 30.0],
            vec![3.0, 8.0, 40.0],
        ])
    }

    #[test]
    fn test_between_rows() {
        let v = interpolate(&ramp(), 1.2, 0, 1).unwrap();
        assert!((v - 5.2).abs() < 1e-5);
        let v = interpolate(&ramp(), 2.5, 0, 2).unwrap();
        assert!((v - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_hits() {
        assert_eq!(interpolate(&ramp(), 0.0, 0, 1).unwrap(), 5.0);
        assert_eq!(interpolate(&ramp(), 2.0, 0, 1).unwrap(), 7.0);
        assert_eq!(interpolate(&ramp(), 3.0, 0, 1).unwrap(), 8.0);
    }

    #[test]
    fn test_flat_extrapolation() {
        assert_eq!(interpolate(&ramp(), 5.5, 0, 1).unwrap(), 8.0);
        assert_eq!(interpolate(&ramp(), -1.0, 0, 1).unwrap(), 5.0);
    }

    #[test]
    fn test_duplicate_keys_pick_first() {
        let table = Table::from(vec![vec![1.0, 10.0], vec![1.0, 20.0]]);
        assert_eq!(interpolate(&table, 1.0, 0, 1).unwrap(), 10.0);
        let table = Table::from(vec![vec![0.0, 1.0], vec![1.0, 10.0], vec![1.0, 20.0]]);
        assert_eq!(interpolate(&table, 1.0, 0, 1).unwrap(), 10.0);
    }

    #[test]
    fn test_non_zero_key_column() {
        // Key in column 1, value in column 0.
        let table = Table::from(vec![vec![100.0, 0.0], vec![200.0, 10.0]]);
        assert_eq!(interpolate(&table, 5.0, 1, 0).unwrap(), 150.0);
    }

    #[test]
    fn test_invalid_columns() {
        assert!(matches!(
            interpolate(&ramp(), 1.0, 3, 1),
            Err(TableError::InvalidColumn { role: ColumnRole::Key, index: 3, width: 3 })
        ));
        assert!(matches!(
            interpolate(&ramp(), 1.0, 0, 7),
            Err(TableError::InvalidColumn { role: ColumnRole::Value, .. })
        ));
        assert!(matches!(
            interpolate(&Table::new(), 1.0, 0, 0),
            Err(TableError::InvalidColumn { width: 0, .. })
        ));
    }

    #[test]
    fn test_short_row_is_error_not_panic() {
        let table = Table::from(vec![vec![0.0, 1.0], vec![1.0], vec![2.0, 3.0]]);
        assert!(matches!(
            interpolate(&table, 0.5, 0, 1),
            Err(TableError::OutOfRange { axis: Axis::Column, .. })
        ));
    }
}
