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

//! Benchmark Result Processing
//!
//! Filtering and grouping for benchmark results read by `benchkit-fmt`.
//!
//! # Features
//!
//! - **Filters**: select results, or single measurements by unit, with a small
//!   boolean query language (`goos:linux -.name:/^Slow/ .unit:sec/op`)
//! - **Projections**: group results by fields such as configuration keys,
//!   name parts or units, yielding interned [`Key`]s
//! - **Ordering**: first-observation, alphabetic, numeric and fixed orders per
//!   field, with [`sort_keys`] and [`KeyHeader`] for tabular output
//! - **Residue**: [`ProjectionParser::residue`] captures whatever the explicit
//!   projections left out, so results that differ only there are not merged
//!   silently
//!
//! # Example
//!
//! ```rust
//! use benchkit_fmt::{Reader, Record};
//! use benchkit_proc::{sort_keys, Filter, ProjectionParser};
//! use std::collections::HashMap;
//! use std::io::Cursor;
//!
//! let input = "\
//! goos: linux
//! BenchmarkEncode/size=10-8 1000 1234 ns/op
//! BenchmarkEncode/size=100-8 100 12034 ns/op
//! goos: darwin
//! BenchmarkEncode/size=10-8 1000 1100 ns/op
//! ";
//!
//! let mut filter = Filter::parse(".name:Encode").unwrap();
//! let mut parser = ProjectionParser::new();
//! let mut rows = parser.parse("/size@num", &mut filter).unwrap();
//! let mut cols = parser.parse("goos", &mut filter).unwrap();
//!
//! let mut groups: HashMap<_, Vec<f64>> = HashMap::new();
//! let mut reader = Reader::new(Cursor::new(input), "bench.txt");
//! while let Some(record) = reader.next_record().unwrap() {
//!     let Record::Result(res) = record else { continue };
//!     if !filter.apply(res) {
//!         continue;
//!     }
//!     let key = (rows.project(res), cols.project(res));
//!     groups.entry(key).or_default().push(res.values[0].value);
//! }
//! assert_eq!(groups.len(), 3);
//!
//! let mut row_keys: Vec<_> = groups.keys().map(|(r, _)| r.clone()).collect();
//! sort_keys(&mut row_keys);
//! row_keys.dedup();
//! let labels: Vec<String> = row_keys.iter().map(|k| k.string_values()).collect();
//! assert_eq!(labels, vec!["10", "100"]);
//! ```

mod error;
mod extract;
mod filter;
mod header;
mod key;
mod mask;
mod projection;
pub mod query;
mod schema;
mod sort;

pub use error::{QueryError, QueryResult};
pub use filter::{Filter, Match};
pub use header::{non_singular_fields, KeyHeader, KeyHeaderNode};
pub use key::Key;
pub use projection::{Projection, ProjectionParser};
pub use schema::Field;
pub use sort::sort_keys;
