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

//! Streaming reader for the benchmark result text format.
//!
//! The format is line oriented:
//!
//! ```text
//! goos: linux                       <- configuration line
//! Unit ns/op assume=exact           <- unit metadata line
//! BenchmarkEncode/size=10-8  1000  1234 ns/op  16 B/op
//! ```
//!
//! Configuration persists until changed and applies to every following
//! benchmark line. Anything else is ignored.
//!
//! # Basic Usage
//!
//! ```rust
//! use benchkit_fmt::{Reader, Record};
//! use std::io::Cursor;
//!
//! let input = "goos: linux\nBenchmarkEncode-8 1000 1234 ns/op\n";
//! let mut reader = Reader::new(Cursor::new(input), "bench.txt");
//!
//! while let Some(record) = reader.next_record().unwrap() {
//!     if let Record::Result(res) = record {
//!         assert_eq!(res.name.base(), "Encode");
//!         assert_eq!(res.get_config("goos"), Some("linux"));
//!         assert_eq!(&*res.values[0].unit, "sec/op");
//!     }
//! }
//! ```

use crate::error::{FormatError, FormatResult, SyntaxError};
use crate::intern::Interner;
use crate::result::{BenchResult, Value};
use crate::scan::{parse_number, parse_uint, split_field, starts_with_space, trim};
use crate::units::{Declared, UnitMetadata, UnitMetadataKey, UnitMetadataMap};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use tracing::warn;

const BENCHMARK_PREFIX: &str = "Benchmark";

/// Configuration options for the reader.
///
/// # Examples
///
/// ```rust
/// use benchkit_fmt::ReaderConfig;
///
/// let config = ReaderConfig::default();
/// assert_eq!(config.buffer_size, 64 * 1024);
/// assert_eq!(config.intern_capacity, 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for reading input.
    ///
    /// Default: 64KB
    pub buffer_size: usize,

    /// Maximum number of distinct config keys and units kept interned.
    ///
    /// When the table is full an arbitrary entry is evicted. Zero disables
    /// interning.
    ///
    /// Default: 1024
    pub intern_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            intern_capacity: 1024,
        }
    }
}

/// One record produced by the reader.
///
/// The referenced storage belongs to the reader and is overwritten by the
/// next advance.
#[derive(Debug)]
pub enum Record<'a> {
    /// A benchmark measurement line.
    Result(&'a mut BenchResult),
    /// A newly declared unit metadata fact.
    UnitMetadata(&'a UnitMetadata),
    /// A malformed line.
    SyntaxError(&'a SyntaxError),
}

impl Record<'_> {
    /// Source name and line of the record.
    pub fn pos(&self) -> (&str, usize) {
        match self {
            Self::Result(res) => res.pos(),
            Self::UnitMetadata(md) => md.pos(),
            Self::SyntaxError(err) => err.pos(),
        }
    }

    /// Get the result if this is a measurement record.
    pub fn as_result(&self) -> Option<&BenchResult> {
        match self {
            Self::Result(res) => Some(res),
            _ => None,
        }
    }

    /// Whether this is a measurement record.
    #[inline]
    pub fn is_result(&self) -> bool {
        matches!(self, Self::Result(_))
    }
}

#[derive(Debug)]
enum Queued {
    Unit(UnitMetadata),
    Syntax(SyntaxError),
}

#[derive(Debug)]
enum Current {
    Nothing,
    Result,
    Unit(UnitMetadata),
    Syntax(SyntaxError),
}

/// Streaming reader for benchmark results.
///
/// Yields one [`Record`] per call to [`next_record`](Self::next_record). A
/// single [`BenchResult`] is reused for every measurement line, so reading
/// allocates only for new config values and names longer than any seen
/// before.
///
/// # Error Handling
///
/// Malformed lines are returned as [`Record::SyntaxError`] and reading
/// continues. An IO error is returned once; afterwards the reader reports end
/// of stream.
///
/// # Encoding
///
/// Lines are split on bytes, but each line is decoded as UTF-8 before its
/// fields are scanned. Invalid sequences become U+FFFD in names, config
/// values and units, so a [`Writer`](crate::Writer) reproduces only inputs
/// that were valid UTF-8.
pub struct Reader<R: Read> {
    source: Option<BufReader<R>>,
    config: ReaderConfig,
    file_name: Arc<str>,
    line_number: usize,
    line: Vec<u8>,
    result: BenchResult,
    units: UnitMetadataMap,
    interner: Interner,
    queue: VecDeque<Queued>,
    current: Current,
}

impl<R: Read> Reader<R> {
    /// Create a reader over `source`, naming it `file_name` in positions.
    pub fn new(source: R, file_name: &str) -> Self {
        Self::with_config(source, file_name, ReaderConfig::default())
    }

    /// Create a reader with custom configuration.
    pub fn with_config(source: R, file_name: &str, config: ReaderConfig) -> Self {
        let mut reader = Self::idle(config);
        reader.reset(source, file_name, &[]);
        reader
    }

    /// A reader with no source; it reports end of stream until reset.
    pub(crate) fn idle(config: ReaderConfig) -> Self {
        Self {
            source: None,
            interner: Interner::new(config.intern_capacity),
            config,
            file_name: Arc::from(""),
            line_number: 0,
            line: Vec::new(),
            result: BenchResult::default(),
            units: UnitMetadataMap::new(),
            queue: VecDeque::new(),
            current: Current::Nothing,
        }
    }

    /// Start reading a new source.
    ///
    /// All configuration is cleared and `init_config` is installed as
    /// internal (non-file) configuration that every result will carry. Unit
    /// metadata accumulated so far is kept.
    pub fn reset(&mut self, source: R, file_name: &str, init_config: &[(&str, &str)]) {
        self.source = Some(BufReader::with_capacity(self.config.buffer_size, source));
        self.file_name = Arc::from(file_name);
        self.line_number = 0;
        self.queue.clear();
        self.current = Current::Nothing;
        self.result.clear_config();
        self.result.values.clear();
        for (key, value) in init_config {
            if !value.is_empty() {
                let key = self.interner.intern(key);
                self.result.upsert_config(key, value, false);
            }
        }
    }

    /// Unit metadata declared so far.
    #[inline]
    pub fn units(&self) -> &UnitMetadataMap {
        &self.units
    }

    /// Name of the current source.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Number of the last line read from the current source.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Advance to and return the next record, or `None` at end of stream.
    pub fn next_record(&mut self) -> FormatResult<Option<Record<'_>>> {
        if self.advance()? {
            Ok(self.record())
        } else {
            Ok(None)
        }
    }

    /// Advance to the next record. Returns `false` at end of stream.
    pub fn advance(&mut self) -> FormatResult<bool> {
        self.current = Current::Nothing;
        loop {
            if let Some(queued) = self.queue.pop_front() {
                self.current = match queued {
                    Queued::Unit(md) => Current::Unit(md),
                    Queued::Syntax(err) => Current::Syntax(err),
                };
                return Ok(true);
            }

            let Some(source) = self.source.as_mut() else {
                return Ok(false);
            };
            self.line.clear();
            match source.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.source = None;
                    return Ok(false);
                }
                Ok(_) => {}
                Err(e) => {
                    self.source = None;
                    return Err(FormatError::Io(e));
                }
            }
            self.line_number += 1;
            if self.line.last() == Some(&b'\n') {
                self.line.pop();
                if self.line.last() == Some(&b'\r') {
                    self.line.pop();
                }
            }

            let bytes = std::mem::take(&mut self.line);
            let produced = self.parse_line(&String::from_utf8_lossy(&bytes));
            self.line = bytes;
            if produced {
                self.current = Current::Result;
                return Ok(true);
            }
        }
    }

    /// The record most recently advanced to.
    pub fn record(&mut self) -> Option<Record<'_>> {
        match &self.current {
            Current::Nothing => None,
            Current::Result => Some(Record::Result(&mut self.result)),
            Current::Unit(md) => Some(Record::UnitMetadata(md)),
            Current::Syntax(err) => Some(Record::SyntaxError(err)),
        }
    }

    /// Parse one line. Returns `true` if it produced a measurement; unit
    /// metadata and syntax errors are queued instead.
    fn parse_line(&mut self, line: &str) -> bool {
        if let Some((key, value)) = parse_config_line(line) {
            if value.is_empty() {
                self.result.delete_config(key);
            } else {
                let key = self.interner.intern(key);
                self.result.upsert_config(key, value, true);
            }
            return false;
        }

        let (first, rest) = split_field(line);
        if first == "Unit" && !starts_with_space(line) {
            self.parse_unit_line(rest);
            return false;
        }
        if first.starts_with(BENCHMARK_PREFIX) && !starts_with_space(line) {
            return self.parse_benchmark_line(&first[BENCHMARK_PREFIX.len()..], rest);
        }
        false
    }

    fn parse_benchmark_line(&mut self, name: &str, rest: &str) -> bool {
        let (iters, mut rest) = split_field(rest);
        if iters.is_empty() {
            // "BenchmarkX" alone is progress output from verbose runs.
            return false;
        }

        self.result.name.set(name);
        self.result.values.clear();
        self.result
            .set_pos(Arc::clone(&self.file_name), self.line_number);

        match parse_uint(iters) {
            Some(n) => self.result.iters = n,
            None => {
                self.syntax_error(format!("parsing iteration count {:?}: invalid syntax", iters));
                return false;
            }
        }

        loop {
            let (field, after) = split_field(rest);
            if field.is_empty() {
                break;
            }
            let Some(value) = parse_number(field) else {
                self.syntax_error(format!("parsing measurement {:?}: invalid syntax", field));
                return false;
            };
            let (unit, after) = split_field(after);
            if unit.is_empty() {
                self.syntax_error(format!("missing units for measurement {:?}", field));
                return false;
            }
            rest = after;

            let unit = self.interner.intern(unit);
            let value = match self.interner.tidy(&unit) {
                Some((canonical, factor)) => Value {
                    value: value * factor,
                    unit: canonical,
                    original: Some((value, unit)),
                },
                None => Value {
                    value,
                    unit,
                    original: None,
                },
            };
            self.result.values.push(value);
        }

        if self.result.values.is_empty() {
            self.syntax_error("missing measurements");
            return false;
        }
        true
    }

    fn parse_unit_line(&mut self, rest: &str) {
        let (unit, mut rest) = split_field(rest);
        if unit.is_empty() {
            self.syntax_error("missing unit");
            return;
        }
        let orig_unit = self.interner.intern(unit);
        let canonical = match self.interner.tidy(&orig_unit) {
            Some((canonical, _)) => canonical,
            None => Arc::clone(&orig_unit),
        };

        loop {
            let (field, after) = split_field(rest);
            if field.is_empty() {
                break;
            }
            rest = after;
            let Some((key, value)) = field.split_once('=').filter(|(k, _)| !k.is_empty()) else {
                self.syntax_error(format!("expected key=value, got {:?}", field));
                return;
            };

            let md = UnitMetadata::from_parts(
                UnitMetadataKey {
                    unit: Arc::clone(&canonical),
                    key: self.interner.intern(key),
                },
                Arc::clone(&orig_unit),
                value,
                Arc::clone(&self.file_name),
                self.line_number,
            );
            match self.units.declare(&md) {
                Declared::New => self.queue.push_back(Queued::Unit(md)),
                Declared::Duplicate => {}
                Declared::Conflict(have) => {
                    warn!(
                        "{}:{}: conflicting metadata {} for unit {} (keeping {:?})",
                        self.file_name, self.line_number, key, unit, have
                    );
                    self.syntax_error(format!(
                        "metadata {} of unit {} already set to {}",
                        key, unit, have
                    ));
                }
            }
        }
    }

    fn syntax_error(&mut self, message: impl Into<String>) {
        self.queue.push_back(Queued::Syntax(SyntaxError::new(
            Arc::clone(&self.file_name),
            self.line_number,
            message,
        )));
    }
}

/// Recognize a `key: value` configuration line.
///
/// The key must start with a lower-case letter and contain neither
/// whitespace nor upper-case letters; the colon must be followed by
/// whitespace or the end of the line.
fn parse_config_line(line: &str) -> Option<(&str, &str)> {
    let first = line.chars().next()?;
    if !first.is_lowercase() {
        return None;
    }
    for (i, ch) in line.char_indices() {
        if ch == ':' {
            let rest = &line[i + 1..];
            if !rest.is_empty() && !starts_with_space(rest) {
                return None;
            }
            return Some((&line[..i], trim(rest)));
        }
        if ch.is_whitespace() || ch.is_uppercase() {
            return None;
        }
    }
    None
}

impl<R: Read> Iterator for Reader<R> {
    type Item = FormatResult<OwnedRecord>;

    /// Iterate over owned copies of the records.
    ///
    /// Cloning every result costs an allocation per record; prefer
    /// [`next_record`](Reader::next_record) in hot loops.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(OwnedRecord::from(record))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// An owned copy of a [`Record`].
#[derive(Debug, Clone)]
pub enum OwnedRecord {
    /// A benchmark measurement line.
    Result(BenchResult),
    /// A newly declared unit metadata fact.
    UnitMetadata(UnitMetadata),
    /// A malformed line.
    SyntaxError(SyntaxError),
}

impl OwnedRecord {
    /// Source name and line of the record.
    pub fn pos(&self) -> (&str, usize) {
        match self {
            Self::Result(res) => res.pos(),
            Self::UnitMetadata(md) => md.pos(),
            Self::SyntaxError(err) => err.pos(),
        }
    }

    /// Borrow as a [`Record`].
    pub fn as_record(&mut self) -> Record<'_> {
        match self {
            Self::Result(res) => Record::Result(res),
            Self::UnitMetadata(md) => Record::UnitMetadata(md),
            Self::SyntaxError(err) => Record::SyntaxError(err),
        }
    }
}

impl From<Record<'_>> for OwnedRecord {
    fn from(record: Record<'_>) -> Self {
        match record {
            Record::Result(res) => Self::Result(res.clone()),
            Record::UnitMetadata(md) => Self::UnitMetadata(md.clone()),
            Record::SyntaxError(err) => Self::SyntaxError(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn read_all(input: &str) -> Vec<OwnedRecord> {
        Reader::new(Cursor::new(input.to_string()), "test")
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn results(input: &str) -> Vec<BenchResult> {
        read_all(input)
            .into_iter()
            .filter_map(|r| match r {
                OwnedRecord::Result(res) => Some(res),
                _ => None,
            })
            .collect()
    }

    fn errors(input: &str) -> Vec<SyntaxError> {
        read_all(input)
            .into_iter()
            .filter_map(|r| match r {
                OwnedRecord::SyntaxError(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    // ==================== Config line tests ====================

    #[test]
    fn test_parse_config_line() {
        assert_eq!(parse_config_line("goos: linux"), Some(("goos", "linux")));
        assert_eq!(parse_config_line("cpu: Intel(R) Xeon"), Some(("cpu", "Intel(R) Xeon")));
        assert_eq!(parse_config_line("key:"), Some(("key", "")));
        assert_eq!(parse_config_line("key:   "), Some(("key", "")));
        assert_eq!(parse_config_line("key-2.x: v"), Some(("key-2.x", "v")));
        assert_eq!(parse_config_line("Key: v"), None);
        assert_eq!(parse_config_line("kEy: v"), None);
        assert_eq!(parse_config_line("my key: v"), None);
        assert_eq!(parse_config_line("http://example"), None);
        assert_eq!(parse_config_line("nocolon"), None);
        assert_eq!(parse_config_line(""), None);
        assert_eq!(parse_config_line("ünicode: ok"), Some(("ünicode", "ok")));
    }

    #[test]
    fn test_config_persists_and_changes() {
        let res = results("a: 1\nBenchmarkX 1 1 ns/op\nBenchmarkY 1 1 ns/op\na: 2\nBenchmarkZ 1 1 ns/op\n");
        assert_eq!(res.len(), 3);
        assert_eq!(res[0].get_config("a"), Some("1"));
        assert_eq!(res[1].get_config("a"), Some("1"));
        assert_eq!(res[2].get_config("a"), Some("2"));
        assert!(res[2].config()[0].file);
    }

    #[test]
    fn test_config_delete() {
        let res = results("a: 1\nb: 2\nBenchmarkX 1 1 ns/op\na:\nBenchmarkY 1 1 ns/op\n");
        assert_eq!(res[0].config().len(), 2);
        assert_eq!(res[1].get_config("a"), None);
        assert_eq!(res[1].get_config("b"), Some("2"));
    }

    // ==================== Benchmark line tests ====================

    #[test]
    fn test_benchmark_line() {
        let res = results("BenchmarkEncode/size=10-8   1000   1234 ns/op   16 B/op\n");
        assert_eq!(res.len(), 1);
        let r = &res[0];
        assert_eq!(r.name.full(), "Encode/size=10-8");
        assert_eq!(r.iters, 1000);
        assert_eq!(r.values.len(), 2);
        assert_eq!(&*r.values[0].unit, "sec/op");
        assert_eq!(r.values[0].orig_value(), 1234.0);
        assert_eq!(r.values[0].orig_unit(), "ns/op");
        assert_eq!(&*r.values[1].unit, "B/op");
        assert_eq!(r.values[1].original, None);
        assert_eq!(r.pos(), ("test", 1));
    }

    #[test]
    fn test_bare_benchmark_line_skipped() {
        let records = read_all("BenchmarkVerbose\nBenchmarkVerbose   \n");
        assert!(records.is_empty());
    }

    #[test]
    fn test_benchmark_syntax_errors() {
        let errs = errors(
            "BenchmarkA x 1 ns/op\nBenchmarkB 1 y ns/op\nBenchmarkC 1 1\nBenchmarkD 1\n",
        );
        assert_eq!(errs.len(), 4);
        assert!(errs[0].message.contains("iteration count"));
        assert_eq!(errs[0].line, 1);
        assert!(errs[1].message.contains("measurement"));
        assert!(errs[2].message.contains("missing units"));
        assert!(errs[3].message.contains("missing measurements"));
        assert_eq!(errs[3].line, 4);
    }

    #[test]
    fn test_errors_do_not_abort() {
        let records = read_all("BenchmarkA x\nBenchmarkB 1 1 ns/op\n");
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], OwnedRecord::SyntaxError(_)));
        assert!(matches!(records[1], OwnedRecord::Result(_)));
    }

    #[test]
    fn test_ignored_lines() {
        let records = read_all("PASS\nok  pkg 1.2s\n\n  BenchmarkIndented 1 1 ns/op\n--- FAIL\n");
        assert!(records.is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let res = results("a: 1\r\nBenchmarkX 1 2 ns/op\r\n");
        assert_eq!(res[0].get_config("a"), Some("1"));
        assert_eq!(res[0].values[0].orig_unit(), "ns/op");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let input: &[u8] = b"BenchmarkX\xff 1 1 ns/op\n";
        let mut reader = Reader::new(Cursor::new(input), "bytes");
        let record = reader.next_record().unwrap().unwrap();
        let res = record.as_result().unwrap();
        assert_eq!(res.name.full(), "X\u{fffd}");

        let input: &[u8] = b"cpu: x\xfe86\nBenchmarkX 1 1 ns/op\n";
        let mut reader = Reader::new(Cursor::new(input), "bytes");
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.as_result().unwrap().get_config("cpu"), Some("x\u{fffd}86"));
    }

    #[test]
    fn test_record_storage_is_reused() {
        let mut reader = Reader::new(Cursor::new("BenchmarkA 1 1 ns/op\nBenchmarkB 2 1 ns/op\n"), "t");
        let first_ptr = match reader.next_record().unwrap() {
            Some(Record::Result(res)) => res as *const BenchResult,
            _ => panic!("expected result"),
        };
        match reader.next_record().unwrap() {
            Some(Record::Result(res)) => {
                assert_eq!(res as *const BenchResult, first_ptr);
                assert_eq!(res.name.full(), "B");
            }
            _ => panic!("expected result"),
        }
    }

    // ==================== Unit line tests ====================

    #[test]
    fn test_unit_metadata_records() {
        let records = read_all("Unit ns/op assume=exact better=lower\n");
        assert_eq!(records.len(), 2);
        match &records[0] {
            OwnedRecord::UnitMetadata(md) => {
                assert_eq!(&*md.key.unit, "sec/op");
                assert_eq!(&*md.key.key, "assume");
                assert_eq!(&*md.orig_unit, "ns/op");
                assert_eq!(md.value, "exact");
            }
            other => panic!("expected unit metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_duplicate_is_silent() {
        let records = read_all("Unit B/op assume=exact\nUnit B/op assume=exact\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_unit_conflict_is_diagnostic() {
        let mut reader = Reader::new(
            Cursor::new("Unit B/op assume=exact\nUnit B/op assume=nothing\nBenchmarkX 1 1 B/op\n"),
            "t",
        );
        let mut kinds = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            kinds.push(match record {
                Record::Result(_) => "result",
                Record::UnitMetadata(_) => "unit",
                Record::SyntaxError(err) => {
                    assert!(err.message.contains("already set to exact"));
                    assert_eq!(err.line, 2);
                    "error"
                }
            });
        }
        assert_eq!(kinds, vec!["unit", "error", "result"]);
        assert_eq!(reader.units().get("B/op", "assume"), Some("exact"));
    }

    #[test]
    fn test_unit_line_malformed() {
        let errs = errors("Unit\nUnit B/op novalue\nUnit B/op =x\n");
        assert_eq!(errs.len(), 3);
        assert!(errs[0].message.contains("missing unit"));
        assert!(errs[1].message.contains("key=value"));
    }

    #[test]
    fn test_unit_partial_line_keeps_earlier_pairs() {
        let records = read_all("Unit B/op a=1 broken b=2\n");
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], OwnedRecord::UnitMetadata(_)));
        assert!(matches!(records[1], OwnedRecord::SyntaxError(_)));
    }

    // ==================== Reset tests ====================

    #[test]
    fn test_reset_installs_internal_config() {
        let mut reader = Reader::new(Cursor::new("a: 1\n".to_string()), "first");
        while reader.next_record().unwrap().is_some() {}
        reader.reset(Cursor::new("BenchmarkX 1 1 ns/op\n".to_string()), "second", &[(".file", "second#1")]);
        let record = reader.next_record().unwrap().unwrap();
        let res = record.as_result().unwrap();
        assert_eq!(res.get_config("a"), None);
        assert_eq!(res.get_config(".file"), Some("second#1"));
        assert!(!res.config()[0].file);
        assert_eq!(res.pos(), ("second", 1));
    }

    // ==================== IO error tests ====================

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
            }
            self.served = true;
            let line = b"BenchmarkA 1 1 ns/op\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_io_error_is_sticky_once() {
        let mut reader = Reader::new(FailingReader { served: false }, "dev");
        assert!(reader.next_record().unwrap().is_some());
        let err = reader.next_record().unwrap_err();
        assert!(err.to_string().contains("device unplugged"));
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.next_record().unwrap().is_none());
    }
}
