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

//! Reading a sequence of named inputs as one stream.
//!
//! Every result read through [`Files`] carries an internal `.file` config
//! entry naming the input it came from, so results from different runs can
//! be told apart (and grouped by) downstream.
//!
//! ```rust,no_run
//! use benchkit_fmt::{Files, FilesConfig, Record};
//!
//! let config = FilesConfig {
//!     allow_labels: true,
//!     ..FilesConfig::default()
//! };
//! let mut files = Files::with_config(["old=before.txt", "new=after.txt"], config);
//! while let Some(record) = files.next_record()? {
//!     if let Record::Result(res) = record {
//!         println!("{} {}", res.get_config(".file").unwrap_or(""), res.name);
//!     }
//! }
//! # Ok::<(), benchkit_fmt::FormatError>(())
//! ```

use crate::error::{FormatError, FormatResult};
use crate::reader::{Reader, ReaderConfig, Record};
use crate::units::UnitMetadataMap;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{self, Read};
use tracing::debug;

/// Configuration for [`Files`].
#[derive(Debug, Clone, Default)]
pub struct FilesConfig {
    /// Treat the path `-` as standard input.
    ///
    /// Default: false
    pub allow_stdin: bool,

    /// Accept `label=path` arguments, using `label` as the `.file` value.
    ///
    /// Default: false
    pub allow_labels: bool,

    /// Configuration of the underlying reader.
    pub reader: ReaderConfig,
}

/// A sequence of inputs read through a single [`Reader`].
///
/// Inputs are opened lazily, one at a time. Unit metadata accumulates across
/// all of them.
pub struct Files {
    paths: VecDeque<String>,
    config: FilesConfig,
    reader: Reader<Box<dyn Read>>,
    active: bool,
    done: bool,
    seen: HashMap<String, usize>,
}

impl Files {
    /// Create a sequence over `paths` with default configuration.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(paths, FilesConfig::default())
    }

    /// Create a sequence over `paths` with custom configuration.
    pub fn with_config<I, S>(paths: I, config: FilesConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            reader: Reader::idle(config.reader.clone()),
            config,
            active: false,
            done: false,
            seen: HashMap::new(),
        }
    }

    /// Unit metadata declared so far, across all inputs.
    #[inline]
    pub fn units(&self) -> &UnitMetadataMap {
        self.reader.units()
    }

    /// Advance to and return the next record, or `None` once every input is
    /// exhausted.
    pub fn next_record(&mut self) -> FormatResult<Option<Record<'_>>> {
        if self.advance()? {
            Ok(self.reader.record())
        } else {
            Ok(None)
        }
    }

    /// Advance to the next record. Returns `false` at the end of the last
    /// input.
    ///
    /// An input that cannot be opened or read ends the whole sequence: the
    /// error is returned once and every later call returns `false`.
    pub fn advance(&mut self) -> FormatResult<bool> {
        loop {
            if self.done {
                return Ok(false);
            }
            if self.active {
                match self.reader.advance() {
                    Ok(true) => return Ok(true),
                    Ok(false) => self.active = false,
                    Err(e) => {
                        self.done = true;
                        return Err(e);
                    }
                }
                continue;
            }

            let Some(arg) = self.paths.pop_front() else {
                self.done = true;
                return Ok(false);
            };
            if let Err(e) = self.open(&arg) {
                self.done = true;
                return Err(e);
            }
        }
    }

    /// The record most recently advanced to.
    #[inline]
    pub fn record(&mut self) -> Option<Record<'_>> {
        self.reader.record()
    }

    fn open(&mut self, arg: &str) -> FormatResult<()> {
        let (label, path) = self.label(arg);
        let source: Box<dyn Read> = if path == "-" && self.config.allow_stdin {
            Box::new(io::stdin())
        } else {
            let file = File::open(path).map_err(|source| FormatError::Open {
                path: path.to_string(),
                source,
            })?;
            Box::new(file)
        };

        debug!("Reading {} as {:?}", path, label);
        self.reader.reset(source, path, &[(".file", label.as_str())]);
        self.active = true;
        Ok(())
    }

    /// Split an argument into its `.file` label and the path to open.
    fn label<'a>(&mut self, arg: &'a str) -> (String, &'a str) {
        if self.config.allow_labels {
            if let Some((label, path)) = arg.split_once('=') {
                return (label.to_string(), path);
            }
        }

        let count = self.seen.entry(arg.to_string()).or_insert(0);
        let label = if *count == 0 {
            arg.to_string()
        } else {
            format!("{}#{}", arg, count)
        };
        *count += 1;
        (label, arg)
    }
}
