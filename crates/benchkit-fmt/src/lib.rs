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

//! Benchmark Result Format
//!
//! This crate reads and writes the line-oriented benchmark result format
//! produced by benchmark harnesses:
//!
//! ```text
//! goos: linux
//! goarch: amd64
//! Unit ns/op assume=nothing
//!
//! BenchmarkEncode/size=10-8    1000000    1234 ns/op    16 B/op
//! BenchmarkEncode/size=100-8    100000   12034 ns/op   128 B/op
//! ```
//!
//! # Features
//!
//! - **Streaming**: one record per call, with the record's storage reused
//!   between calls
//! - **Normalized units**: measurements are rescaled to canonical units
//!   (`ns/op` becomes `sec/op`) while keeping their original form
//! - **Resilient**: malformed lines become syntax error records and reading
//!   continues
//! - **Multi-file**: [`Files`] chains inputs and labels every result with its
//!   source
//! - **Round-trip**: [`Writer`] re-emits records in the same format
//!
//! # Reading
//!
//! ```rust
//! use benchkit_fmt::{Reader, Record};
//! use std::io::Cursor;
//!
//! let input = "\
//! goos: linux
//! BenchmarkEncode-8 1000 1234 ns/op 16 B/op
//! BenchmarkDecode-8 2000 567 ns/op 0 B/op
//! ";
//!
//! let mut reader = Reader::new(Cursor::new(input), "bench.txt");
//! let mut total = 0.0;
//! while let Some(record) = reader.next_record().unwrap() {
//!     match record {
//!         Record::Result(res) => total += res.value_of("sec/op").unwrap_or(0.0),
//!         Record::SyntaxError(err) => eprintln!("{}", err),
//!         Record::UnitMetadata(_) => {}
//!     }
//! }
//! assert!((total - 1801e-9).abs() < 1e-15);
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: derive `Serialize`/`Deserialize` for records

mod error;
mod files;
mod intern;
mod reader;
mod result;
mod scan;
mod units;
mod writer;

pub use error::{FormatError, FormatResult, SyntaxError};
pub use files::{Files, FilesConfig};
pub use reader::{OwnedRecord, Reader, ReaderConfig, Record};
pub use result::{BenchResult, Config, Name, Value};
pub use units::{UnitMetadata, UnitMetadataKey, UnitMetadataMap};
pub use writer::Writer;
