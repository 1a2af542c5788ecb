// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Handle-addressed table storage.
//!
//! [`TableRegistry`] owns every table it creates and hands out [`Handle`]s,
//! which are insertion indices. Handles are never recycled: clearing a table
//! empties it in place and the handle stays usable.
//!
//! Every operation validates the handle and all indices before touching any
//! data, so a failed call leaves every table unchanged.
//!
//! # Usage
//!
//! ```rust
//! use csvtable::TableRegistry;
//!
//! let mut registry = TableRegistry::new();
//! let id = registry.load("0,5\n1,6\n2,7\n".as_bytes(), 0).unwrap();
//! assert_eq!(registry.row_count(id).unwrap(), 3);
//!
//! registry.write(id, 1, 1, 6.5).unwrap();
//! let copy = registry.copy(id).unwrap();
//! registry.clear(id).unwrap();
//!
//! assert_eq!(registry.row_count(id).unwrap(), 0);
//! assert_eq!(registry.read(copy, 1, 1).unwrap(), 6.5);
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::{decode_table, encode_table};
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::interpolate::interpolate;
use crate::types::{Axis, Element, Handle, Table};

/// An owned, append-only collection of tables.
///
/// The registry does no locking of its own. Callers that share one between
/// threads wrap it in a lock, as [`ffi`](crate::ffi) does.
#[derive(Debug, Default)]
pub struct TableRegistry {
    /// Handle index -> table.
    tables: Vec<Table>,
    /// Runtime configuration.
    config: TableConfig,
    /// Decoded files keyed by path and skipped line count.
    cache: HashMap<(PathBuf, usize), Table>,
}

impl TableRegistry {
    /// Creates an empty registry with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with custom configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The configuration this registry was created with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Number of handles issued so far.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no handle was issued yet.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn insert(&mut self, table: Table) -> Handle {
        let handle = Handle::from_index(self.tables.len());
        tracing::debug!(
            %handle,
            rows = table.row_count(),
            cols = table.col_count(),
            "registered table"
        );
        self.tables.push(table);
        handle
    }

    fn table(&self, handle: Handle) -> Result<&Table> {
        self.tables
            .get(handle.index())
            .ok_or(TableError::InvalidHandle(handle.index() as i64))
    }

    fn table_mut(&mut self, handle: Handle) -> Result<&mut Table> {
        self.tables
            .get_mut(handle.index())
            .ok_or(TableError::InvalidHandle(handle.index() as i64))
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Registers a `rows` x `cols` table filled with `fill`.
    pub fn create(&mut self, rows: usize, cols: usize, fill: Element) -> Handle {
        self.insert(Table::filled(rows, cols, fill))
    }

    /// Registers an already built table.
    pub fn adopt(&mut self, table: Table) -> Handle {
        self.insert(table)
    }

    /// Decodes a table from `reader` and registers it.
    ///
    /// Malformed content yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// * [`TableError::Io`] if reading fails; nothing is registered then
    pub fn load<R: Read>(&mut self, reader: R, skip_lines: usize) -> Result<Handle> {
        let table = decode_table(reader, skip_lines)?;
        Ok(self.insert(table))
    }

    /// Decodes the CSV file at `path` and registers it.
    ///
    /// With [`TableConfig::cache_loads`] set, each `(path, skip_lines)` pair
    /// is decoded once and later loads get a copy of the cached table.
    ///
    /// # Errors
    ///
    /// * [`TableError::Io`] if the file cannot be opened or read
    pub fn load_file(&mut self, path: impl AsRef<Path>, skip_lines: usize) -> Result<Handle> {
        let path = path.as_ref();
        let table = if self.config.cache_loads {
            let key = (path.to_path_buf(), skip_lines);
            match self.cache.get(&key) {
                Some(table) => {
                    tracing::debug!(path = %path.display(), "serving table from cache");
                    table.clone()
                }
                None => {
                    let table = decode_table(BufReader::new(File::open(path)?), skip_lines)?;
                    self.cache.insert(key, table.clone());
                    table
                }
            }
        } else {
            decode_table(BufReader::new(File::open(path)?), skip_lines)?
        };

        if table.is_empty() {
            tracing::warn!(path = %path.display(), "no data rows decoded");
        }
        Ok(self.insert(table))
    }

    /// Registers a deep copy of the table at `handle`.
    pub fn copy(&mut self, handle: Handle) -> Result<Handle> {
        let table = self.table(handle)?.clone();
        Ok(self.insert(table))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Encodes the table at `handle` into `writer` using the configured separator.
    ///
    /// Returns the number of rows written.
    pub fn save<W: Write>(&self, handle: Handle, writer: W) -> Result<usize> {
        let table = self.table(handle)?;
        encode_table(writer, table, self.config.separator)?;
        Ok(table.row_count())
    }

    /// Writes the table at `handle` to the file at `path`, replacing it.
    ///
    /// The handle is validated before the file is created.
    pub fn save_file(&self, handle: Handle, path: impl AsRef<Path>) -> Result<usize> {
        self.table(handle)?;
        let file = File::create(path.as_ref())?;
        let rows = self.save(handle, BufWriter::new(file))?;
        tracing::debug!(%handle, rows, path = %path.as_ref().display(), "saved table");
        Ok(rows)
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Empties the table in place. The handle stays valid.
    pub fn clear(&mut self, handle: Handle) -> Result<()> {
        self.table_mut(handle)?.clear();
        tracing::debug!(%handle, "cleared table");
        Ok(())
    }

    /// Number of rows of the table at `handle`.
    pub fn row_count(&self, handle: Handle) -> Result<usize> {
        Ok(self.table(handle)?.row_count())
    }

    /// Length of the first row of the table at `handle`, 0 if it has no rows.
    ///
    /// Other rows may be shorter or longer.
    pub fn col_count(&self, handle: Handle) -> Result<usize> {
        Ok(self.table(handle)?.col_count())
    }

    /// Shortest and longest row of the table at `handle`.
    pub fn width_range(&self, handle: Handle) -> Result<Option<(usize, usize)>> {
        Ok(self.table(handle)?.width_range())
    }

    /// Forces the table to `rows` rows of exactly `cols` elements each.
    ///
    /// Elements inside the new bounds keep their value, new cells get `fill`.
    pub fn resize(
        &mut self,
        handle: Handle,
        rows: usize,
        cols: usize,
        fill: Element,
    ) -> Result<()> {
        self.table_mut(handle)?.resize(rows, cols, fill);
        tracing::debug!(%handle, rows, cols, "resized table");
        Ok(())
    }

    // =========================================================================
    // Element access
    // =========================================================================

    /// Reads one element. `col` is checked against the length of row `row`.
    pub fn read(&self, handle: Handle, row: usize, col: usize) -> Result<Element> {
        self.table(handle)?.get(row, col)
    }

    /// Overwrites one element. The table never grows.
    pub fn write(&mut self, handle: Handle, row: usize, col: usize, value: Element) -> Result<()> {
        *self.table_mut(handle)?.get_mut(row, col)? = value;
        Ok(())
    }

    /// Reads `count` elements of column `col`, starting at row `start_row`.
    ///
    /// The whole span is validated first: if it runs past the last row, or
    /// any row in it is too short for `col`, nothing is returned.
    pub fn read_column(
        &self,
        handle: Handle,
        start_row: usize,
        col: usize,
        count: usize,
    ) -> Result<Vec<Element>> {
        let table = self.table(handle)?;
        let rows = table.row_count();
        let end = start_row.checked_add(count).unwrap_or(usize::MAX);
        if start_row >= rows && count > 0 {
            return Err(TableError::OutOfRange {
                axis: Axis::Row,
                index: start_row as i64,
                extent: rows,
            });
        }
        if end > rows {
            return Err(TableError::OutOfRange {
                axis: Axis::Row,
                index: end.saturating_sub(1) as i64,
                extent: rows,
            });
        }
        (start_row..end).map(|row| table.get(row, col)).collect()
    }

    /// Reads `count` elements of row `row`, starting at column `start_col`.
    pub fn read_row(
        &self,
        handle: Handle,
        row: usize,
        start_col: usize,
        count: usize,
    ) -> Result<&[Element]> {
        let cells = self.table(handle)?.row(row)?;
        let end = start_col.checked_add(count).unwrap_or(usize::MAX);
        if end > cells.len() {
            return Err(TableError::OutOfRange {
                axis: Axis::Column,
                index: end.saturating_sub(1) as i64,
                extent: cells.len(),
            });
        }
        Ok(&cells[start_col..end])
    }

    /// Interpolates `value_col` at `key` along `key_col`.
    ///
    /// See [`interpolate`](crate::interpolate::interpolate) for the rules.
    pub fn interpolate(
        &self,
        handle: Handle,
        key: Element,
        key_col: usize,
        value_col: usize,
    ) -> Result<Element> {
        interpolate(self.table(handle)?, key, key_col, value_col)
    }
}
