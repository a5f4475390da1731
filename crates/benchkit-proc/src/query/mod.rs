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

//! Query syntax.
//!
//! Two small languages are parsed here. Filters select results (or single
//! values of a result):
//!
//! ```text
//! expr    := and (OR and)*
//! and     := match (AND? match)*
//! match   := '-' match | '(' expr ')' | '*'
//!          | key ':' value | key ':' '(' value (OR value)* ')'
//! value   := word | "quoted" | /regexp/
//! ```
//!
//! Projections list the fields results are grouped by:
//!
//! ```text
//! fields  := field ((',' | whitespace) field)*
//! field   := key ('@' order)?
//! order   := word | '(' word+ ')'
//! ```
//!
//! This module only produces syntax trees; key validation and compilation
//! happen in [`Filter`](crate::Filter) and
//! [`ProjectionParser`](crate::ProjectionParser).
//!
//! # Examples
//!
//! ```rust
//! use benchkit_proc::query::{parse_filter, Expr, Pattern};
//!
//! let expr = parse_filter("goos:linux -.name:/^Slow/").unwrap();
//! let Expr::And(terms) = &expr else { panic!() };
//! assert_eq!(terms.len(), 2);
//! assert_eq!(expr.to_string(), "(goos:linux AND -.name:/^Slow/)");
//! ```

mod parser;
mod tokens;

use std::fmt;

pub use parser::{parse_filter, parse_projection};

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// All sub-expressions must match.
    And(Vec<Expr>),
    /// At least one sub-expression must match.
    Or(Vec<Expr>),
    /// The sub-expression must not match.
    Not(Box<Expr>),
    /// Matches everything (`*`).
    All,
    /// `key:value` or `key:(value OR ...)`.
    Match {
        /// Key being tested.
        key: String,
        /// Byte offset of the key in the query.
        offset: usize,
        /// Alternatives; the match succeeds if any matches.
        patterns: Vec<Pattern>,
    },
}

/// One value alternative of a [`Expr::Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Exact string comparison.
    Exact(String),
    /// Unanchored regular expression.
    Regexp {
        /// Expression source, with `\/` already resolved to `/`.
        source: String,
        /// Byte offset of the opening `/` in the query.
        offset: usize,
    },
}

/// One field of a parsed projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key naming the field.
    pub key: String,
    /// Byte offset of the key in the query.
    pub offset: usize,
    /// Explicit sort order, if any.
    pub order: Option<OrderSpec>,
}

/// Sort order of a projection field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSpec {
    /// A built-in order by name (`alpha`, `num`).
    Named {
        /// Order name.
        name: String,
        /// Byte offset of the name.
        offset: usize,
    },
    /// An explicit enumeration of values in order.
    Fixed {
        /// Values in order.
        values: Vec<String>,
        /// Byte offset of the opening parenthesis.
        offset: usize,
    },
}

/// Quote `s` for use as a key or value in a query, if it needs quoting.
///
/// ```rust
/// use benchkit_proc::query::quote_word;
///
/// assert_eq!(quote_word("linux"), "linux");
/// assert_eq!(quote_word("Intel Xeon"), "\"Intel Xeon\"");
/// assert_eq!(quote_word("OR"), "\"OR\"");
/// ```
pub fn quote_word(s: &str) -> String {
    if tokens::is_plain_word(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(s) => f.write_str(&quote_word(s)),
            Pattern::Regexp { source, .. } => write!(f, "/{}/", source.replace('/', "\\/")),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => {
                let op = if matches!(self, Expr::And(_)) { " AND " } else { " OR " };
                f.write_str("(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(op)?;
                    }
                    write!(f, "{}", expr)?;
                }
                f.write_str(")")
            }
            Expr::Not(expr) => write!(f, "-{}", expr),
            Expr::All => f.write_str("*"),
            Expr::Match { key, patterns, .. } => {
                write!(f, "{}:", quote_word(key))?;
                if let [single] = patterns.as_slice() {
                    return write!(f, "{}", single);
                }
                f.write_str("(")?;
                for (i, pattern) in patterns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" OR ")?;
                    }
                    write!(f, "{}", pattern)?;
                }
                f.write_str(")")
            }
        }
    }
}
