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

//! Error types for filter and projection queries.

use thiserror::Error;

/// Errors from parsing or compiling a query.
///
/// Every variant carries the byte offset in the query text where the problem
/// was found, so callers can point at it:
///
/// ```rust
/// use benchkit_proc::Filter;
///
/// let query = "goos:linux AND .bogus:x";
/// let err = Filter::parse(query).unwrap_err();
/// assert_eq!(&query[err.offset()..], ".bogus:x");
/// ```
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// Malformed query text.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A `.`-prefixed key that names no known field.
    #[error("unknown key {key:?} at offset {offset}")]
    UnknownKey { offset: usize, key: String },

    /// A known key used where it is not allowed.
    #[error("key {key:?} not allowed at offset {offset}: {reason}")]
    KeyNotAllowed {
        offset: usize,
        key: String,
        reason: &'static str,
    },

    /// A `/regexp/` that does not compile.
    #[error("bad regexp at offset {offset}: {source}")]
    Regex {
        offset: usize,
        #[source]
        source: regex::Error,
    },
}

impl QueryError {
    /// Create a syntax error.
    #[inline]
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Create an unknown key error.
    #[inline]
    pub fn unknown_key(offset: usize, key: impl Into<String>) -> Self {
        Self::UnknownKey {
            offset,
            key: key.into(),
        }
    }

    /// Create a key-not-allowed error.
    #[inline]
    pub fn not_allowed(offset: usize, key: impl Into<String>, reason: &'static str) -> Self {
        Self::KeyNotAllowed {
            offset,
            key: key.into(),
            reason,
        }
    }

    /// Byte offset in the query text.
    #[inline]
    pub fn offset(&self) -> usize {
        match self {
            Self::Syntax { offset, .. }
            | Self::UnknownKey { offset, .. }
            | Self::KeyNotAllowed { offset, .. }
            | Self::Regex { offset, .. } => *offset,
        }
    }
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
