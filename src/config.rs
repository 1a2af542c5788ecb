// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Runtime configuration.
//!
//! [`TableConfig`] is a plain struct with defaults. Hosts that cannot pass
//! configuration through the C ABI use [`TableConfig::from_env`], which is
//! what the process-wide registry in [`ffi`](crate::ffi) does.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `CSVTABLE_SEPARATOR` | [`separator`](TableConfig::separator) | `,` |
//! | `CSVTABLE_CACHE` | [`cache_loads`](TableConfig::cache_loads) | off |
//! | `CSVTABLE_ERROR_LOG` | [`error_log`](TableConfig::error_log) | `error.log` |

use std::path::PathBuf;

use crate::codec::is_valid_separator;

/// Environment variable overriding [`TableConfig::separator`].
pub const ENV_SEPARATOR: &str = "CSVTABLE_SEPARATOR";

/// Environment variable overriding [`TableConfig::cache_loads`].
pub const ENV_CACHE: &str = "CSVTABLE_CACHE";

/// Environment variable overriding [`TableConfig::error_log`].
pub const ENV_ERROR_LOG: &str = "CSVTABLE_ERROR_LOG";

/// Default path of the diagnostic log, relative to the working directory.
pub const DEFAULT_ERROR_LOG: &str = "error.log";

/// Runtime configuration for a [`TableRegistry`](crate::TableRegistry).
///
/// # Examples
///
/// ```rust
/// use csvtable::{TableConfig, TableRegistry};
///
/// let config = TableConfig {
///     separator: ';',
///     cache_loads: true,
///     ..Default::default()
/// };
/// let registry = TableRegistry::with_config(config);
/// assert_eq!(registry.config().separator, ';');
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    /// Separator written between elements when saving.
    ///
    /// Decoding accepts any separator regardless of this setting.
    pub separator: char,

    /// Decode each CSV file once and serve later loads from memory.
    ///
    /// Every load still gets a fresh handle and its own copy of the data.
    /// Changes made to the file after the first load are not seen.
    pub cache_loads: bool,

    /// Where the boundary layer appends diagnostic records.
    pub error_log: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            cache_loads: false,
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
        }
    }
}

impl TableConfig {
    /// Defaults overridden by the `CSVTABLE_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SEPARATOR) {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if is_valid_separator(c) => config.separator = c,
                (Some(_), None) => {
                    tracing::warn!(%value, "ignoring {}: not a usable separator", ENV_SEPARATOR)
                }
                _ => tracing::warn!(%value, "ignoring {}: expected one character", ENV_SEPARATOR),
            }
        }

        if let Some(value) = lookup(ENV_CACHE) {
            match parse_flag(&value) {
                Some(flag) => config.cache_loads = flag,
                None => tracing::warn!(%value, "ignoring {}: expected a boolean", ENV_CACHE),
            }
        }

        if let Some(value) = lookup(ENV_ERROR_LOG) {
            if value.is_empty() {
                tracing::warn!("ignoring empty {}", ENV_ERROR_LOG);
            } else {
                config.error_log = PathBuf::from(value);
            }
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
