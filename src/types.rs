// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Core data types for csvtable.
//!
//! This module defines the fundamental data structures used throughout the crate:
//! - [`Element`] and [`Row`] - The scalar and row types
//! - [`Table`] - A possibly ragged grid of elements
//! - [`Dictionary`] - Rows grouped by their first field
//! - [`Handle`] - The index under which a [`TableRegistry`](crate::TableRegistry) stores a table
//! - Conversions from raw boundary integers into checked indices

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TableError};

/// The only scalar type stored in a table.
pub type Element = f64;

/// One table row. Rows of the same table may differ in length.
pub type Row = Vec<Element>;

/// Direction of an index or a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row index or row count.
    Row,
    /// Column index or column count.
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// Which interpolation column an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The column searched for the query key.
    Key,
    /// The column the result is taken from.
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Key => f.write_str("key column"),
            ColumnRole::Value => f.write_str("value column"),
        }
    }
}

// =============================================================================
// Boundary conversions
// =============================================================================

/// Converts a raw row or column index into a `usize`.
///
/// Negative values are reported as [`TableError::OutOfRange`].
pub fn index(value: i64, axis: Axis) -> Result<usize> {
    usize::try_from(value).map_err(|_| TableError::OutOfRange {
        axis,
        index: value,
        extent: 0,
    })
}

/// Converts a raw row or column count into a `usize`.
pub fn size(value: i64, axis: Axis) -> Result<usize> {
    usize::try_from(value).map_err(|_| TableError::NegativeSize { axis, size: value })
}

/// Converts a raw interpolation column into a `usize`.
pub fn column(value: i64, role: ColumnRole) -> Result<usize> {
    usize::try_from(value).map_err(|_| TableError::NegativeColumn { role, index: value })
}

/// Opaque identifier of a table inside a [`TableRegistry`](crate::TableRegistry).
///
/// Handles are plain insertion indices. A handle stays valid for as long as
/// the registry that issued it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Wraps a raw registry index. The registry validates it on every use.
    pub fn from_index(index: usize) -> Self {
        Handle(index)
    }

    /// Returns the registry index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<i32> for Handle {
    type Error = TableError;

    fn try_from(value: i32) -> Result<Self> {
        usize::try_from(value)
            .map(Handle)
            .map_err(|_| TableError::InvalidHandle(value.into()))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Table
// =============================================================================

/// An ordered sequence of rows.
///
/// No invariant is imposed on row lengths. The column count is the length of
/// the first row, and every access is checked against the length of the row
/// actually addressed.
///
/// # Examples
///
/// ```rust
/// use csvtable::Table;
///
/// let mut table = Table::from(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.col_count(), 3);
/// assert!(table.get(1, 2).is_err());
///
/// table.resize(2, 3, 0.5);
/// assert_eq!(table.get(1, 2).unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table without rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `rows` x `cols` table with every element set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: Element) -> Self {
        Self {
            rows: vec![vec![fill; cols]; rows],
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the first row, or 0 for an empty table.
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Shortest and longest row length, `None` for an empty table.
    pub fn width_range(&self) -> Option<(usize, usize)> {
        let mut widths = self.rows.iter().map(Vec::len);
        let first = widths.next()?;
        Some(widths.fold((first, first), |(lo, hi), w| (lo.min(w), hi.max(w))))
    }

    /// Returns the row at `row`.
    pub fn row(&self, row: usize) -> Result<&Row> {
        self.rows.get(row).ok_or(TableError::OutOfRange {
            axis: Axis::Row,
            index: row as i64,
            extent: self.rows.len(),
        })
    }

    /// Reads the element at `row`:`col`, checking `col` against that row's own length.
    pub fn get(&self, row: usize, col: usize) -> Result<Element> {
        let cells = self.row(row)?;
        cells.get(col).copied().ok_or(TableError::OutOfRange {
            axis: Axis::Column,
            index: col as i64,
            extent: cells.len(),
        })
    }

    /// Mutable access to the element at `row`:`col`. Never grows the table.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut Element> {
        let extent = self.rows.len();
        let cells = self.rows.get_mut(row).ok_or(TableError::OutOfRange {
            axis: Axis::Row,
            index: row as i64,
            extent,
        })?;
        let width = cells.len();
        cells.get_mut(col).ok_or(TableError::OutOfRange {
            axis: Axis::Column,
            index: col as i64,
            extent: width,
        })
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Forces the table to exactly `rows` rows of exactly `cols` elements.
    ///
    /// Existing elements inside the new bounds are kept; new cells get `fill`.
    pub fn resize(&mut self, rows: usize, cols: usize, fill: Element) {
        self.rows.resize_with(rows, Vec::new);
        for row in &mut self.rows {
            row.resize(cols, fill);
        }
    }

    /// Drops every row and releases the storage.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows.shrink_to_fit();
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl From<Table> for Vec<Row> {
    fn from(table: Table) -> Self {
        table.rows
    }
}

// =============================================================================
// Dictionary
// =============================================================================

/// Hashable form of a dictionary key.
///
/// `0.0` and `-0.0` map to the same key, as do all NaN payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyBits(u64);

impl KeyBits {
    fn new(key: Element) -> Self {
        if key == 0.0 {
            KeyBits(0.0f64.to_bits())
        } else if key.is_nan() {
            KeyBits(f64::NAN.to_bits())
        } else {
            KeyBits(key.to_bits())
        }
    }

    fn key(self) -> Element {
        f64::from_bits(self.0)
    }
}

/// Rows grouped by their first field.
///
/// Lines sharing a key contribute to the same sequence, in the order they
/// were read. Iteration order across keys is unspecified.
///
/// # Examples
///
/// ```rust
/// use csvtable::Dictionary;
///
/// let mut dict = Dictionary::new();
/// dict.extend(1.0, [10.0, 11.0]);
/// dict.extend(1.0, [12.0]);
/// assert_eq!(dict.get(1.0), Some(&[10.0, 11.0, 12.0][..]));
/// assert_eq!(dict.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: HashMap<KeyBits, Vec<Element>>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence for `key`, inserting an empty one first if needed.
    pub fn entry(&mut self, key: Element) -> &mut Vec<Element> {
        self.entries.entry(KeyBits::new(key)).or_default()
    }

    /// Appends `values` to the sequence stored under `key`.
    pub fn extend(&mut self, key: Element, values: impl IntoIterator<Item = Element>) {
        self.entry(key).extend(values);
    }

    /// Looks up the sequence stored under `key`.
    pub fn get(&self, key: Element) -> Option<&[Element]> {
        self.entries.get(&KeyBits::new(key)).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key was ever inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, values)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, &[Element])> {
        self.entries
            .iter()
            .map(|(bits, values)| (bits.key(), values.as_slice()))
    }
}
