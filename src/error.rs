// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Error types for table operations.
//!
//! This module provides:
//! - [`TableError`] - The main error enum for Rust code
//! - [`Result<T>`] - A type alias for `std::result::Result<T, TableError>`
//! - Sentinel constants returned by the C-ABI functions in [`ffi`](crate::ffi)

use crate::types::{Axis, ColumnRole};

// =============================================================================
// FFI Sentinels
// =============================================================================

/// Returned by boundary functions that produce a handle or a count.
pub const ERR_HANDLE: i32 = -1;

/// Returned by boundary functions that read a floating point value.
pub const ERR_VALUE: f64 = f64::NAN;

/// Returned by `read_int` on failure.
///
/// This is the bit pattern a C cast of `NaN` to `int` produces on x86, so hosts
/// that already test for it keep working.
pub const ERR_INT_VALUE: i32 = i32::MIN;

// =============================================================================
// Rust Error Types
// =============================================================================

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Everything that can go wrong while addressing, decoding or interpolating a table.
///
/// # Examples
///
/// ```rust
/// use csvtable::{Handle, TableError, TableRegistry};
///
/// let mut registry = TableRegistry::new();
/// let id = registry.create(2, 2, 0.0);
///
/// match registry.read(id, 2, 0) {
///     Err(TableError::OutOfRange { index, extent, .. }) => {
///         assert_eq!((index, extent), (2, 2));
///     }
///     other => panic!("unexpected: {:?}", other),
/// }
/// assert!(matches!(
///     registry.read(Handle::from_index(7), 0, 0),
///     Err(TableError::InvalidHandle(7))
/// ));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The handle is negative or no table was ever registered under it.
    #[error("invalid table handle: {0}")]
    InvalidHandle(i64),

    /// A row or column index is negative or beyond the addressed extent.
    ///
    /// For columns the extent is the length of the addressed row, not of the
    /// first row.
    #[error("{axis} {index} is out of range")]
    OutOfRange {
        /// Which index was rejected
        axis: Axis,
        /// The offending index (may be negative)
        index: i64,
        /// Number of valid positions along that axis, 0 for negative indices
        extent: usize,
    },

    /// A requested row or column count is negative.
    #[error("negative {axis} count: {size}")]
    NegativeSize {
        /// Which dimension was requested
        axis: Axis,
        /// The requested size
        size: i64,
    },

    /// An interpolation column is not within the first row.
    #[error("{role} {index} overflows table width {width}")]
    InvalidColumn {
        /// Key or value column
        role: ColumnRole,
        /// Requested column index
        index: usize,
        /// Length of the first row (0 for an empty table)
        width: usize,
    },

    /// An interpolation column index is negative.
    #[error("negative {role}: {index}")]
    NegativeColumn {
        /// Key or value column
        role: ColumnRole,
        /// Requested column index
        index: i64,
    },

    /// A required pointer argument was null.
    #[error("null pointer passed as {0}")]
    NullPointer(&'static str),

    /// Path is null, not UTF-8 or otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The stream could not be opened, read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    /// Returns `true` for errors caused by an index or handle outside the table.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            TableError::InvalidHandle(_)
                | TableError::OutOfRange { .. }
                | TableError::InvalidColumn { .. }
                | TableError::NegativeColumn { .. }
        )
    }
}
