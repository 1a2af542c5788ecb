// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! Out-of-band diagnostics for the C boundary.
//!
//! A host calling through [`ffi`](crate::ffi) only ever sees sentinels, so
//! the reason behind a failure is recorded through a [`DiagnosticSink`].
//! [`ErrorLog`] appends one line per record to a file:
//!
//! ```text
//! 1718000000.123456 row 7 is out of range in read_double at src/ffi.rs:212
//! ```
//!
//! The file is truncated on the first record after it was (re)configured and
//! appended to afterwards, so each host session starts with a fresh log.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Where a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Name of the boundary function.
    pub function: &'static str,
    /// Source file, as given by `file!()`.
    pub file: &'static str,
    /// Source line, as given by `line!()`.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.function, self.file, self.line)
    }
}

/// Builds a [`SourceLocation`] for the current line.
///
/// ```rust
/// let here = csvtable::location!("table_rows");
/// assert_eq!(here.function, "table_rows");
/// assert!(here.file.ends_with(".rs"));
/// ```
#[macro_export]
macro_rules! location {
    ($function:expr) => {
        $crate::diagnostics::SourceLocation {
            function: $function,
            file: file!(),
            line: line!(),
        }
    };
}

/// Receiver of diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    /// Records `message` raised at `location`.
    fn record(&self, message: &str, location: &SourceLocation);
}

/// Formats one log line without the trailing newline.
pub fn format_record(message: &str, location: &SourceLocation, at: SystemTime) -> String {
    let since = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "{}.{:06} {} in {}",
        since.as_secs(),
        since.subsec_micros(),
        message,
        location
    )
}

#[derive(Debug)]
struct LogState {
    path: PathBuf,
    /// Whether this session already truncated the file.
    owned: bool,
}

/// File-backed [`DiagnosticSink`].
#[derive(Debug)]
pub struct ErrorLog {
    state: Mutex<LogState>,
}

impl ErrorLog {
    /// Creates a log writing to `path`. Nothing is touched until the first record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(LogState {
                path: path.into(),
                owned: false,
            }),
        }
    }

    /// Current log file path.
    pub fn path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Redirects later records to `path`; the next record truncates it.
    pub fn set_path(&self, path: impl Into<PathBuf>) {
        let mut state = self.state.lock();
        state.path = path.into();
        state.owned = false;
    }

    fn open(path: &Path, truncate: bool) -> std::io::Result<File> {
        if truncate {
            File::create(path)
        } else {
            OpenOptions::new().create(true).append(true).open(path)
        }
    }
}

impl DiagnosticSink for ErrorLog {
    fn record(&self, message: &str, location: &SourceLocation) {
        let mut state = self.state.lock();
        let line = format_record(message, location, SystemTime::now());
        let written = Self::open(&state.path, !state.owned)
            .and_then(|mut file| writeln!(file, "{line}"));
        match written {
            Ok(()) => state.owned = true,
            Err(err) => tracing::error!(
                path = %state.path.display(),
                error = %err,
                "failed to write diagnostic record"
            ),
        }
    }
}

/// [`DiagnosticSink`] forwarding records to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, message: &str, location: &SourceLocation) {
        tracing::warn!(
            function = location.function,
            file = location.file,
            line = location.line,
            "{message}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_format_record() {
        let at = UNIX_EPOCH + Duration::from_micros(12_000_042);
        let here = SourceLocation {
            function: "read_double",
            file: "src/ffi.rs",
            line: 7,
        };
        assert_eq!(
            format_record("row 3 is out of range", &here, at),
            "12.000042 row 3 is out of range in read_double at src/ffi.rs:7"
        );
    }

    #[test]
    fn test_error_log_truncates_once() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("errors.log");
        std::fs::write(&path, "stale\n").unwrap();

        let log = ErrorLog::new(&path);
        log.record("first", &crate::location!("test"));
        log.record("second", &crate::location!("test"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" first in test at "));
        assert!(lines[1].contains(" second in test at "));
    }

    #[test]
    fn test_set_path_starts_new_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let log = ErrorLog::new(dir.path().join("a.log"));
        log.record("one", &crate::location!("test"));

        let other = dir.path().join("b.log");
        log.set_path(&other);
        assert_eq!(log.path(), other);
        log.record("two", &crate::location!("test"));

        let a = std::fs::read_to_string(dir.path().join("a.log")).unwrap();
        let b = std::fs::read_to_string(&other).unwrap();
        assert_eq!(a.lines().count(), 1);
        assert_eq!(b.lines().count(), 1);
        assert!(b.contains(" two in "));
    }
}
