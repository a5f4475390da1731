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

//! Writing records back to the benchmark text format.
//!
//! The writer tracks the file configuration it has already emitted and only
//! writes configuration lines when a result's configuration differs from the
//! previous one. Internal configuration (such as `.file`) is never written.
//! Output read back through [`Reader`](crate::Reader) yields the same results.
//!
//! ```rust
//! use benchkit_fmt::{Reader, Writer};
//! use std::io::Cursor;
//!
//! let input = "goos: linux\n\nBenchmarkX\t100\t5 ns/op\n";
//! let mut reader = Reader::new(Cursor::new(input), "in");
//! let mut writer = Writer::new(Vec::new());
//! while let Some(record) = reader.next_record().unwrap() {
//!     writer.write(&record).unwrap();
//! }
//! assert_eq!(String::from_utf8(writer.into_inner().unwrap()).unwrap(), input);
//! ```

use crate::error::{FormatError, FormatResult};
use crate::reader::Record;
use crate::result::{BenchResult, Config};
use crate::units::{UnitMetadata, UnitMetadataKey};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

// ==================== Buffer Capacity Constants ====================

/// Initial capacity of the per-record line buffer.
const INITIAL_LINE_BUFFER_CAPACITY: usize = 256;

/// Writer for the benchmark text format.
pub struct Writer<W: Write> {
    writer: W,
    buf: Vec<u8>,
    first: bool,
    file_config: HashMap<Arc<str>, String>,
    order: Vec<Arc<str>>,
    units: HashSet<UnitMetadataKey>,
}

impl<W: Write> Writer<W> {
    /// Create a writer emitting to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: Vec::with_capacity(INITIAL_LINE_BUFFER_CAPACITY),
            first: true,
            file_config: HashMap::new(),
            order: Vec::new(),
            units: HashSet::new(),
        }
    }

    /// Write one record.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Unwritable`] for syntax error records, which
    /// have no textual form, and [`FormatError::Io`] if writing fails.
    pub fn write(&mut self, record: &Record<'_>) -> FormatResult<()> {
        match record {
            Record::Result(res) => self.write_result(res),
            Record::UnitMetadata(md) => self.write_unit_metadata(md),
            Record::SyntaxError(_) => Err(FormatError::Unwritable("syntax error")),
        }
    }

    /// Write a measurement, preceded by any configuration changes.
    pub fn write_result(&mut self, res: &BenchResult) -> FormatResult<()> {
        self.buf.clear();
        self.write_config(res)?;

        write!(self.buf, "Benchmark{}\t{}", res.name, res.iters)?;
        for value in &res.values {
            write!(self.buf, "\t{} {}", value.orig_value(), value.orig_unit())?;
        }
        self.buf.push(b'\n');
        self.first = false;

        self.writer.write_all(&self.buf)?;
        Ok(())
    }

    /// Write a unit metadata line, unless the same fact was already written.
    pub fn write_unit_metadata(&mut self, md: &UnitMetadata) -> FormatResult<()> {
        if self.units.contains(&md.key) {
            return Ok(());
        }
        self.units.insert(md.key.clone());

        self.buf.clear();
        writeln!(self.buf, "Unit {} {}={}", md.orig_unit, md.key.key, md.value)?;
        self.first = false;
        self.writer.write_all(&self.buf)?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> FormatResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> FormatResult<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Emit the configuration block for `res` if its file configuration
    /// differs from what was last written.
    fn write_config(&mut self, res: &BenchResult) -> FormatResult<()> {
        let mut changed = false;

        for key in &self.order {
            if file_entry(res, key).is_none() {
                if !changed {
                    if !self.first {
                        self.buf.push(b'\n');
                    }
                    changed = true;
                }
                writeln!(self.buf, "{}:", key)?;
            }
        }
        for cfg in res.config().iter().filter(|c| c.file) {
            if self.file_config.get(&cfg.key) != Some(&cfg.value) {
                if !changed {
                    if !self.first {
                        self.buf.push(b'\n');
                    }
                    changed = true;
                }
                writeln!(self.buf, "{}: {}", cfg.key, cfg.value)?;
            }
        }

        if changed {
            self.buf.push(b'\n');
            self.file_config.clear();
            self.order.clear();
            for cfg in res.config().iter().filter(|c| c.file) {
                self.file_config
                    .insert(Arc::clone(&cfg.key), cfg.value.clone());
                self.order.push(Arc::clone(&cfg.key));
            }
        }
        Ok(())
    }
}

fn file_entry<'a>(res: &'a BenchResult, key: &str) -> Option<&'a Config> {
    res.config_index(key)
        .map(|i| &res.config()[i])
        .filter(|c| c.file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Value;
    use crate::SyntaxError;

    fn output(writer: Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    // ==================== Result tests ====================

    #[test]
    fn test_write_plain_result() {
        let mut res = BenchResult::new("Encode-8", 1000);
        res.values.push(Value::tidied(1234.0, "ns/op"));
        res.values.push(Value::new(16.0, "B/op"));

        let mut writer = Writer::new(Vec::new());
        writer.write_result(&res).unwrap();
        assert_eq!(output(writer), "BenchmarkEncode-8\t1000\t1234 ns/op\t16 B/op\n");
    }

    #[test]
    fn test_fractional_values() {
        let mut res = BenchResult::new("X", 1);
        res.values.push(Value::new(2.5, "B/op"));
        let mut writer = Writer::new(Vec::new());
        writer.write_result(&res).unwrap();
        assert_eq!(output(writer), "BenchmarkX\t1\t2.5 B/op\n");
    }

    // ==================== Config tests ====================

    #[test]
    fn test_config_written_only_on_change() {
        let mut res = BenchResult::new("A", 1);
        res.values.push(Value::new(1.0, "B/op"));
        res.set_file_config("goos", "linux");

        let mut writer = Writer::new(Vec::new());
        writer.write_result(&res).unwrap();
        writer.write_result(&res).unwrap();
        res.set_file_config("goos", "darwin");
        writer.write_result(&res).unwrap();

        assert_eq!(
            output(writer),
            "goos: linux\n\nBenchmarkA\t1\t1 B/op\nBenchmarkA\t1\t1 B/op\n\
             \ngoos: darwin\n\nBenchmarkA\t1\t1 B/op\n"
        );
    }

    #[test]
    fn test_deleted_config_written_empty() {
        let mut res = BenchResult::new("A", 1);
        res.values.push(Value::new(1.0, "B/op"));
        res.set_file_config("a", "1");
        res.set_file_config("b", "2");

        let mut writer = Writer::new(Vec::new());
        writer.write_result(&res).unwrap();
        res.delete_config("a");
        writer.write_result(&res).unwrap();

        assert_eq!(
            output(writer),
            "a: 1\nb: 2\n\nBenchmarkA\t1\t1 B/op\n\na:\n\nBenchmarkA\t1\t1 B/op\n"
        );
    }

    #[test]
    fn test_internal_config_not_written() {
        let mut res = BenchResult::new("A", 1);
        res.values.push(Value::new(1.0, "B/op"));
        res.set_config(".file", "x.txt");

        let mut writer = Writer::new(Vec::new());
        writer.write_result(&res).unwrap();
        assert_eq!(output(writer), "BenchmarkA\t1\t1 B/op\n");
    }

    // ==================== Unit metadata tests ====================

    #[test]
    fn test_unit_metadata_written_once() {
        let md = UnitMetadata::new("ns/op", "assume", "exact");
        let mut writer = Writer::new(Vec::new());
        writer.write_unit_metadata(&md).unwrap();
        writer.write_unit_metadata(&md).unwrap();
        // Same fact under another spelling of the unit.
        writer
            .write_unit_metadata(&UnitMetadata::new("ms/op", "assume", "exact"))
            .unwrap();
        assert_eq!(output(writer), "Unit ns/op assume=exact\n");
    }

    #[test]
    fn test_syntax_error_unwritable() {
        let err = SyntaxError::new(Arc::from("f"), 1, "bad");
        let mut writer = Writer::new(Vec::new());
        let result = writer.write(&Record::SyntaxError(&err));
        assert!(matches!(result, Err(FormatError::Unwritable(_))));
        assert_eq!(output(writer), "");
    }
}
