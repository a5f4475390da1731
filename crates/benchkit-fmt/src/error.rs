// Dweve Benchkit - Benchmark Result Processing
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for reading and writing benchmark results.
//!
//! Two kinds of failure exist and they are deliberately kept apart:
//!
//! - [`FormatError`]: fatal. The input could not be opened or read (or an
//!   output could not be written). A reader reports it once and then behaves
//!   as if the stream ended.
//! - [`SyntaxError`]: per line. A malformed measurement or unit line is
//!   reported as a record of its own and reading continues with the next line.
//!
//! # Examples
//!
//! ```rust
//! use benchkit_fmt::{Reader, Record};
//! use std::io::Cursor;
//!
//! let input = "BenchmarkA x 1 ns/op\nBenchmarkB 1 1 ns/op\n";
//! let mut reader = Reader::new(Cursor::new(input), "input.txt");
//!
//! let mut errors = Vec::new();
//! let mut results = 0;
//! while let Some(record) = reader.next_record().unwrap() {
//!     match record {
//!         Record::SyntaxError(err) => errors.push(err.to_string()),
//!         Record::Result(_) => results += 1,
//!         Record::UnitMetadata(_) => {}
//!     }
//! }
//! assert_eq!(results, 1);
//! assert!(errors[0].starts_with("input.txt:1:"));
//! ```

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Fatal errors while reading or writing benchmark results.
#[derive(Error, Debug)]
pub enum FormatError {
    /// IO error on the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An input file could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The record kind has no textual form.
    #[error("cannot write {0} record")]
    Unwritable(&'static str),
}

impl FormatError {
    /// Get the path of the input involved, if known.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Open { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for reading and writing operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// A malformed line in benchmark output.
///
/// Syntax errors never abort reading; they are delivered as
/// [`Record::SyntaxError`](crate::Record::SyntaxError) and the reader moves
/// on to the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{file_name}:{line}: {message}")]
pub struct SyntaxError {
    /// Name of the input the line came from.
    pub file_name: Arc<str>,
    /// Line number (1-based).
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error.
    #[inline]
    pub fn new(file_name: Arc<str>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file_name,
            line,
            message: message.into(),
        }
    }

    /// Source name and line of the offending input.
    #[inline]
    pub fn pos(&self) -> (&str, usize) {
        (&self.file_name, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== FormatError tests ====================

    #[test]
    fn test_io_error_display() {
        let err = FormatError::Io(io::Error::new(io::ErrorKind::Other, "disk gone"));
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("disk gone"));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_open_error_carries_path() {
        let err = FormatError::Open {
            path: "missing.txt".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.path(), Some("missing.txt"));
        assert!(err.to_string().starts_with("cannot open missing.txt"));
    }

    #[test]
    fn test_from_io_error() {
        let err: FormatError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn test_unwritable_display() {
        let err = FormatError::Unwritable("syntax error");
        assert_eq!(err.to_string(), "cannot write syntax error record");
    }

    // ==================== SyntaxError tests ====================

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(Arc::from("bench.txt"), 12, "missing units");
        assert_eq!(err.to_string(), "bench.txt:12: missing units");
        assert_eq!(err.pos(), ("bench.txt", 12));
    }
}
