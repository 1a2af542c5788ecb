// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! C-ABI Foreign Function Interface.
//!
//! This module provides the `extern "C"` symbols a simulation host resolves by
//! name after loading the library. All functions share one process-wide
//! [`TableRegistry`] behind a read/write lock, use `catch_unwind` so a panic
//! never crosses into foreign code, and report failures with sentinels:
//!
//! | Result kind | Sentinel |
//! |-------------|----------|
//! | handle, row/column count | `-1` ([`ERR_HANDLE`]) |
//! | `double` value | `NaN` ([`ERR_VALUE`]) |
//! | `int` value | `INT_MIN` ([`ERR_INT_VALUE`]) |
//! | writes, bulk reads | no-op |
//!
//! The reason for every failure is recorded in the diagnostic log (see
//! [`set_error_path`]) and emitted as a `tracing` event.
//!
//! The registry is configured from the environment on first use, see
//! [`TableConfig::from_env`].

// FFI functions intentionally take raw pointers without being marked unsafe
// because they handle null checks and use catch_unwind for safety
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{c_char, c_double, c_int, CStr, CString};
use std::ptr;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::config::TableConfig;
use crate::diagnostics::{DiagnosticSink, ErrorLog, SourceLocation, TracingSink};
use crate::error::{Result, TableError, ERR_HANDLE, ERR_INT_VALUE, ERR_VALUE};
use crate::location;
use crate::registry::TableRegistry;
use crate::types::{column, index, size, Axis, ColumnRole, Handle};

// =============================================================================
// Process-wide state
// =============================================================================

static CONFIG: Lazy<TableConfig> = Lazy::new(TableConfig::from_env);

/// The registry behind every exported function. Lives until process exit.
static TABLES: Lazy<RwLock<TableRegistry>> =
    Lazy::new(|| RwLock::new(TableRegistry::with_config(CONFIG.clone())));

static ERROR_LOG: Lazy<ErrorLog> = Lazy::new(|| ErrorLog::new(CONFIG.error_log.clone()));

/// Backing storage for the string returned by [`get_error_path`].
static ERROR_PATH: Mutex<Option<CString>> = Mutex::new(None);

/// Runs `f` with exclusive access to the registry used by the C functions.
///
/// Lets Rust code embedding the library inspect or prepare tables that the
/// host later addresses by handle.
///
/// # Deadlocks
///
/// `f` runs while the registry's write lock is held and the lock is not
/// reentrant. Calling any function of this module from inside `f` (or from
/// another thread that `f` waits on) blocks forever.
///
/// ```rust
/// use csvtable::ffi::{table_rows, with_registry};
///
/// // Prepare inside the closure, call the C functions after it returned.
/// let id = with_registry(|registry| registry.create(3, 2, 0.0).index() as i32);
/// assert_eq!(table_rows(id), 3);
/// ```
pub fn with_registry<F, R>(f: F) -> R
where
    F: FnOnce(&mut TableRegistry) -> R,
{
    f(&mut TABLES.write())
}

fn report(err: &TableError, location: SourceLocation) {
    let message = err.to_string();
    if err.is_bounds() {
        TracingSink.record(&message, &location);
    } else {
        tracing::error!(function = location.function, error = %err, "call failed");
    }
    ERROR_LOG.record(&message, &location);
}

/// Logs the error of a failed call and drops it.
fn checked<T>(result: Result<T>, location: SourceLocation) -> Option<T> {
    result.map_err(|err| report(&err, location)).ok()
}

fn to_c_int(value: usize) -> c_int {
    c_int::try_from(value).unwrap_or(ERR_HANDLE)
}

/// Helper to convert a C string to a Rust string.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated string.
unsafe fn path_arg<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(TableError::NullPointer("path"));
    }
    let c_str = CStr::from_ptr(ptr);
    c_str
        .to_str()
        .map_err(|_| TableError::InvalidPath(c_str.to_string_lossy().into_owned()))
}

// =============================================================================
// Creation
// =============================================================================

fn new_table(rows: c_int, cols: c_int, value: f64) -> Result<Handle> {
    let rows = size(rows.into(), Axis::Row)?;
    let cols = size(cols.into(), Axis::Column)?;
    Ok(TABLES.write().create(rows, cols, value))
}

/// Creates a `rows` x `cols` table filled with `value`.
///
/// # Returns
/// * The new table id (>= 0)
/// * `-1` if a size is negative
#[no_mangle]
pub extern "C" fn table_new_int(rows: c_int, cols: c_int, value: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        checked(
            new_table(rows, cols, value.into()),
            location!("table_new_int"),
        )
        .map_or(ERR_HANDLE, |h| to_c_int(h.index()))
    })
    .unwrap_or(ERR_HANDLE)
}

/// Creates a `rows` x `cols` table filled with `value`.
///
/// # Returns
/// * The new table id (>= 0)
/// * `-1` if a size is negative
#[no_mangle]
pub extern "C" fn table_new_double(rows: c_int, cols: c_int, value: c_double) -> c_int {
    std::panic::catch_unwind(|| {
        checked(new_table(rows, cols, value), location!("table_new_double"))
            .map_or(ERR_HANDLE, |h| to_c_int(h.index()))
    })
    .unwrap_or(ERR_HANDLE)
}

/// Loads a table from the CSV file at `csv_path`, skipping `skip_lines` leading lines.
///
/// A negative `skip_lines` skips nothing.
///
/// # Returns
/// * The new table id (>= 0)
/// * `-1` if the path is null/not UTF-8 or the file cannot be read
///
/// # Safety
/// * `csv_path` must be a valid null-terminated C string or null
#[no_mangle]
pub extern "C" fn table_read_csv(csv_path: *const c_char, skip_lines: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        let result = unsafe { path_arg(csv_path) }.and_then(|path| {
            tracing::debug!(path, skip_lines, "table_read_csv");
            let skip = usize::try_from(skip_lines).unwrap_or(0);
            TABLES.write().load_file(path, skip)
        });
        checked(result, location!("table_read_csv"))
            .map_or(ERR_HANDLE, |h| to_c_int(h.index()))
    })
    .unwrap_or(ERR_HANDLE)
}

/// Writes table `id` to the CSV file at `csv_path`.
///
/// # Returns
/// * The number of rows written
/// * `-1` if the id is invalid, the path is null/not UTF-8, or writing fails
///
/// # Safety
/// * `csv_path` must be a valid null-terminated C string or null
#[no_mangle]
pub extern "C" fn table_write_csv(id: c_int, csv_path: *const c_char) -> c_int {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| {
            let path = unsafe { path_arg(csv_path) }?;
            TABLES.read().save_file(handle, path)
        });
        checked(result, location!("table_write_csv")).map_or(ERR_HANDLE, to_c_int)
    })
    .unwrap_or(ERR_HANDLE)
}

/// Duplicates table `id` under a new id.
///
/// # Returns
/// * The new table id, or `-1` if `id` is invalid
#[no_mangle]
pub extern "C" fn table_copy(id: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| TABLES.write().copy(handle));
        checked(result, location!("table_copy")).map_or(ERR_HANDLE, |h| to_c_int(h.index()))
    })
    .unwrap_or(ERR_HANDLE)
}

/// Removes all rows of table `id`. The id stays valid.
///
/// # Returns
/// * `id`, or `-1` if `id` is invalid
#[no_mangle]
pub extern "C" fn table_clear(id: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| TABLES.write().clear(handle));
        checked(result, location!("table_clear")).map_or(ERR_HANDLE, |()| id)
    })
    .unwrap_or(ERR_HANDLE)
}

// =============================================================================
// Shape
// =============================================================================

/// Number of rows in table `id`, or `-1` if `id` is invalid.
#[no_mangle]
pub extern "C" fn table_rows(id: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| TABLES.read().row_count(handle));
        checked(result, location!("table_rows")).map_or(ERR_HANDLE, to_c_int)
    })
    .unwrap_or(ERR_HANDLE)
}

/// Number of columns in the first row of table `id`.
///
/// Other rows may have fewer or more columns, depending on the source data.
/// Returns 0 for an empty table and `-1` if `id` is invalid.
#[no_mangle]
pub extern "C" fn table_cols(id: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| TABLES.read().col_count(handle));
        checked(result, location!("table_cols")).map_or(ERR_HANDLE, to_c_int)
    })
    .unwrap_or(ERR_HANDLE)
}

fn resize(id: c_int, rows: c_int, cols: c_int, value: f64) -> Result<()> {
    let handle = Handle::try_from(id)?;
    let rows = size(rows.into(), Axis::Row)?;
    let cols = size(cols.into(), Axis::Column)?;
    TABLES.write().resize(handle, rows, cols, value)
}

/// Resizes table `id` to `rows` x `cols`, filling new cells with `value`.
///
/// # Returns
/// * `id` on success, `-1` if `id` is invalid or a size is negative
#[no_mangle]
pub extern "C" fn table_resize_int(id: c_int, rows: c_int, cols: c_int, value: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        checked(
            resize(id, rows, cols, value.into()),
            location!("table_resize_int"),
        )
        .map_or(ERR_HANDLE, |()| id)
    })
    .unwrap_or(ERR_HANDLE)
}

/// Resizes table `id` to `rows` x `cols`, filling new cells with `value`.
///
/// # Returns
/// * `id` on success, `-1` if `id` is invalid or a size is negative
#[no_mangle]
pub extern "C" fn table_resize_double(
    id: c_int,
    rows: c_int,
    cols: c_int,
    value: c_double,
) -> c_int {
    std::panic::catch_unwind(|| {
        checked(
            resize(id, rows, cols, value),
            location!("table_resize_double"),
        )
        .map_or(ERR_HANDLE, |()| id)
    })
    .unwrap_or(ERR_HANDLE)
}

// =============================================================================
// Element access
// =============================================================================

fn read(id: c_int, row: c_int, col: c_int) -> Result<f64> {
    let handle = Handle::try_from(id)?;
    let row = index(row.into(), Axis::Row)?;
    let col = index(col.into(), Axis::Column)?;
    TABLES.read().read(handle, row, col)
}

fn write(id: c_int, row: c_int, col: c_int, value: f64) -> Result<()> {
    let handle = Handle::try_from(id)?;
    let row = index(row.into(), Axis::Row)?;
    let col = index(col.into(), Axis::Column)?;
    TABLES.write().write(handle, row, col, value)
}

/// Reads the element at `row`:`col` of table `id`, or `NaN` on error.
#[no_mangle]
pub extern "C" fn read_double(id: c_int, row: c_int, col: c_int) -> c_double {
    std::panic::catch_unwind(|| {
        checked(read(id, row, col), location!("read_double")).unwrap_or(ERR_VALUE)
    })
    .unwrap_or(ERR_VALUE)
}

/// Reads the element at `row`:`col` of table `id`, truncated toward zero.
///
/// Returns `INT_MIN` on error, and also for a stored `NaN`.
#[no_mangle]
pub extern "C" fn read_int(id: c_int, row: c_int, col: c_int) -> c_int {
    std::panic::catch_unwind(|| {
        checked(read(id, row, col), location!("read_int"))
            .filter(|value| !value.is_nan())
            .map_or(ERR_INT_VALUE, |value| value as c_int)
    })
    .unwrap_or(ERR_INT_VALUE)
}

/// Overwrites the element at `row`:`col` of table `id`. Does nothing on error.
#[no_mangle]
pub extern "C" fn write_double(id: c_int, row: c_int, col: c_int, value: c_double) {
    let _ = std::panic::catch_unwind(|| {
        checked(write(id, row, col, value), location!("write_double"));
    });
}

/// Overwrites the element at `row`:`col` of table `id`. Does nothing on error.
#[no_mangle]
pub extern "C" fn write_int(id: c_int, row: c_int, col: c_int, value: c_int) {
    let _ = std::panic::catch_unwind(|| {
        checked(write(id, row, col, value.into()), location!("write_int"));
    });
}

/// Interpolates `value_col` of table `id` at `key`, searching `key_col`.
///
/// Rows must be sorted ascending by `key_col`. Keys outside the table take
/// the first or last row's value.
///
/// # Returns
/// * The interpolated value, or `NaN` on error
#[no_mangle]
pub extern "C" fn interpolate(
    id: c_int,
    key: c_double,
    key_col: c_int,
    value_col: c_int,
) -> c_double {
    std::panic::catch_unwind(|| {
        let result = Handle::try_from(id).and_then(|handle| {
            let key_col = column(key_col.into(), ColumnRole::Key)?;
            let value_col = column(value_col.into(), ColumnRole::Value)?;
            TABLES.read().interpolate(handle, key, key_col, value_col)
        });
        checked(result, location!("interpolate")).unwrap_or(ERR_VALUE)
    })
    .unwrap_or(ERR_VALUE)
}

// =============================================================================
// Bulk access
// =============================================================================

/// Copies `values`, truncated to `int`, into `items[offset..offset + values.len()]`.
///
/// # Safety
/// `items` must be valid for writes of `offset + values.len()` ints.
unsafe fn fill_ints(items: *mut c_int, offset: usize, values: &[f64]) {
    let out = std::slice::from_raw_parts_mut(items.add(offset), values.len());
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = *value as c_int;
    }
}

/// Copies column `col` of rows `row..row + count` of table `id` into
/// `items[offset..offset + count]`, truncating each value to `int`.
///
/// Nothing is written unless the whole span exists: every row in it must
/// exist and be long enough for `col`.
///
/// # Safety
/// * `items` must be valid for writes of `offset + count` ints
#[no_mangle]
pub extern "C" fn read_int_col(
    id: c_int,
    row: c_int,
    col: c_int,
    items: *mut c_int,
    offset: c_int,
    count: c_int,
) {
    let _ = std::panic::catch_unwind(|| {
        let result = (|| -> Result<()> {
            let handle = Handle::try_from(id)?;
            let row = index(row.into(), Axis::Row)?;
            let col = index(col.into(), Axis::Column)?;
            let offset = size(offset.into(), Axis::Row)?;
            let count = size(count.into(), Axis::Row)?;
            if items.is_null() {
                return Err(TableError::NullPointer("items"));
            }
            let values = TABLES.read().read_column(handle, row, col, count)?;
            unsafe { fill_ints(items, offset, &values) };
            Ok(())
        })();
        checked(result, location!("read_int_col"));
    });
}

/// Copies `count` elements of row `row` of table `id`, starting at column
/// `col`, into `items[offset..offset + count]`, truncating each to `int`.
///
/// Nothing is written unless the row holds the whole span.
///
/// # Safety
/// * `items` must be valid for writes of `offset + count` ints
#[no_mangle]
pub extern "C" fn read_int_row(
    id: c_int,
    row: c_int,
    col: c_int,
    items: *mut c_int,
    offset: c_int,
    count: c_int,
) {
    let _ = std::panic::catch_unwind(|| {
        let result = (|| -> Result<()> {
            let handle = Handle::try_from(id)?;
            let row = index(row.into(), Axis::Row)?;
            let col = index(col.into(), Axis::Column)?;
            let offset = size(offset.into(), Axis::Column)?;
            let count = size(count.into(), Axis::Column)?;
            if items.is_null() {
                return Err(TableError::NullPointer("items"));
            }
            let registry = TABLES.read();
            let values = registry.read_row(handle, row, col, count)?;
            unsafe { fill_ints(items, offset, values) };
            Ok(())
        })();
        checked(result, location!("read_int_row"));
    });
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Redirects diagnostic records to the file at `path`.
///
/// The file is truncated by the next record and appended to afterwards.
/// A null or non-UTF-8 path is ignored.
///
/// # Safety
/// * `path` must be a valid null-terminated C string or null
#[no_mangle]
pub extern "C" fn set_error_path(path: *const c_char) {
    let _ = std::panic::catch_unwind(|| {
        if let Some(path) = checked(unsafe { path_arg(path) }, location!("set_error_path")) {
            ERROR_LOG.set_path(path);
        }
    });
}

/// Current diagnostic log path as a null-terminated string.
///
/// The pointer stays valid until the next call to this function; the caller
/// must not free it. Returns null if the path cannot be represented.
#[no_mangle]
pub extern "C" fn get_error_path() -> *const c_char {
    std::panic::catch_unwind(|| {
        let path = ERROR_LOG.path();
        let Ok(c_path) = CString::new(path.to_string_lossy().into_owned()) else {
            return ptr::null();
        };
        let mut slot = ERROR_PATH.lock();
        slot.insert(c_path).as_ptr()
    })
    .unwrap_or(ptr::null())
}
