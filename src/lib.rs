// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! # csvtable
//!
//! In-memory numeric tables loaded from loosely formatted CSV files, addressed
//! through integer handles and exposed to simulation hosts through a C ABI.
//!
//! ## Features
//!
//! - **Tolerant decoding** - Any character separates fields, `#` lines are
//!   comments, rows may be ragged
//! - **Handle registry** - [`TableRegistry`] owns tables and never recycles ids
//! - **Bounds-checked access** - Every read and write is validated against the
//!   addressed row, failed calls change nothing
//! - **Linear interpolation** - [`interpolate()`] over a sorted key column with
//!   clamping at both ends
//! - **Dictionaries** - [`Dictionary`] groups rows by their first field
//! - **FFI** - [`ffi`] exports the C functions hosts resolve by name, with
//!   sentinel results and a diagnostic log
//!
//! ## Architecture
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`types`] | [`Table`], [`Dictionary`], [`Handle`] and index conversions |
//! | [`codec`] | CSV decoding and encoding |
//! | [`interpolate`](mod@interpolate) | Piecewise-linear lookup |
//! | [`registry`] | Handle-addressed table storage |
//! | [`config`] | [`TableConfig`] and its environment overrides |
//! | [`diagnostics`] | Error log written by the C boundary |
//! | [`ffi`] | `extern "C"` surface over a process-wide registry |
//!
//! ## Quick Start
//!
//! ```rust
//! use csvtable::{Result, TableRegistry};
//!
//! fn main() -> Result<()> {
//!     let mut registry = TableRegistry::new();
//!     let id = registry.load("# t, v\n0, 10\n10, 20\n".as_bytes(), 0)?;
//!
//!     assert_eq!(registry.row_count(id)?, 2);
//!     assert_eq!(registry.interpolate(id, 2.5, 0, 1)?, 12.5);
//!     assert_eq!(registry.interpolate(id, 99.0, 0, 1)?, 20.0);
//!     Ok(())
//! }
//! ```
//!
//! ## C Hosts
//!
//! ```c
//! int id = table_read_csv("drag.csv", 1);
//! double cd = interpolate(id, mach, 0, 1);
//! if (isnan(cd)) { /* see error.log */ }
//! ```

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ffi;
pub mod interpolate;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use config::TableConfig;
pub use error::{Result, TableError};
pub use registry::TableRegistry;
pub use types::{Axis, ColumnRole, Dictionary, Element, Handle, Row, Table};

// Re-export the codec entry points
pub use codec::{decode_dictionary, decode_table, encode_dictionary, encode_table};

pub use interpolate::interpolate;
