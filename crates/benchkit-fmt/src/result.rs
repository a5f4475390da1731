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

//! Measurement records.
//!
//! A [`BenchResult`] is one `Benchmark...` line together with the
//! configuration that was in effect when it was read. The reader reuses a
//! single `BenchResult` for every line, so callers that keep a result past the
//! next advance must clone it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One configuration entry of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Configuration key.
    pub key: Arc<str>,
    /// Configuration value; never empty.
    pub value: String,
    /// Whether the entry came from a `key: value` line of the input, as
    /// opposed to being set internally (e.g. the `.file` label).
    pub file: bool,
}

/// One measurement of a result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    /// Measured value in the canonical unit.
    pub value: f64,
    /// Canonical unit.
    pub unit: Arc<str>,
    /// Value and unit as written in the input, present only when tidying
    /// changed the unit.
    pub original: Option<(f64, Arc<str>)>,
}

impl Value {
    /// Create a value with no original form.
    pub fn new(value: f64, unit: impl Into<Arc<str>>) -> Self {
        Self {
            value,
            unit: unit.into(),
            original: None,
        }
    }

    /// Create a value from input form, tidying it to its canonical unit.
    ///
    /// ```rust
    /// use benchkit_fmt::Value;
    ///
    /// let v = Value::tidied(1.0, "ns/op");
    /// assert_eq!(&*v.unit, "sec/op");
    /// assert_eq!(v.orig_unit(), "ns/op");
    /// assert_eq!(v.orig_value(), 1.0);
    /// ```
    pub fn tidied(value: f64, unit: &str) -> Self {
        match benchkit_unit::tidy_unit(unit) {
            Some((tidied, factor)) => Self {
                value: value * factor,
                unit: Arc::from(tidied),
                original: Some((value, Arc::from(unit))),
            },
            None => Self::new(value, unit),
        }
    }

    /// Value as written in the input.
    #[inline]
    pub fn orig_value(&self) -> f64 {
        self.original.as_ref().map_or(self.value, |(v, _)| *v)
    }

    /// Unit as written in the input.
    #[inline]
    pub fn orig_unit(&self) -> &str {
        self.original.as_ref().map_or(&self.unit, |(_, u)| u)
    }
}

/// A benchmark name, without the `Benchmark` prefix.
///
/// A name consists of a base name, zero or more sub-benchmark parts each
/// starting with `/` (either positional like `/small` or keyed like
/// `/size=10`), and an optional trailing `-N` parallelism suffix. The
/// decomposition is lossless: the base followed by the parts is the full name.
///
/// ```rust
/// use benchkit_fmt::Name;
///
/// let name = Name::new("Test/foo=123-42");
/// let (base, parts) = name.parts();
/// assert_eq!(base, "Test");
/// assert_eq!(parts, vec!["/foo=123", "-42"]);
/// assert_eq!(name.sub_value("foo"), Some("123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(String);

impl Name {
    /// Create a name from its full text.
    pub fn new(full: impl Into<String>) -> Self {
        Self(full.into())
    }

    /// Full name text.
    #[inline]
    pub fn full(&self) -> &str {
        &self.0
    }

    /// Base name: everything before the first `/` and the `-N` suffix.
    pub fn base(&self) -> &str {
        let (head, _) = split_procs(&self.0);
        match memchr::memchr(b'/', head.as_bytes()) {
            Some(i) => &head[..i],
            None => head,
        }
    }

    /// Split the name into its base and sub-benchmark parts.
    ///
    /// Each `/` part keeps its leading slash and the `-N` suffix, if any, is
    /// the last part.
    pub fn parts(&self) -> (&str, Vec<&str>) {
        let (head, procs) = split_procs(&self.0);
        let bytes = head.as_bytes();
        let mut slashes = memchr::memchr_iter(b'/', bytes);
        let mut parts = Vec::new();

        let base = match slashes.next() {
            Some(first) => {
                let mut start = first;
                for next in slashes {
                    parts.push(&head[start..next]);
                    start = next;
                }
                parts.push(&head[start..]);
                &head[..first]
            }
            None => head,
        };
        if let Some(procs) = procs {
            parts.push(procs);
        }
        (base, parts)
    }

    /// The `-N` parallelism suffix without its dash, if present.
    pub fn procs(&self) -> Option<&str> {
        split_procs(&self.0).1.map(|p| &p[1..])
    }

    /// Value of the `/key=value` part named `key`, if present.
    pub fn sub_value(&self, key: &str) -> Option<&str> {
        let (head, _) = split_procs(&self.0);
        head.split('/').skip(1).find_map(|part| match part.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        })
    }

    pub(crate) fn set(&mut self, full: &str) {
        self.0.clear();
        self.0.push_str(full);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Split a trailing `-N` (digits only) off a name.
fn split_procs(name: &str) -> (&str, Option<&str>) {
    let bytes = name.as_bytes();
    let mut i = bytes.len();
    while i > 0 && bytes[i - 1].is_ascii_digit() {
        i -= 1;
    }
    if i < bytes.len() && i > 0 && bytes[i - 1] == b'-' {
        (&name[..i - 1], Some(&name[i - 1..]))
    } else {
        (name, None)
    }
}

/// A single benchmark result: name, iteration count, measurements and the
/// configuration in effect.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BenchResult {
    config: Vec<Config>,
    /// Benchmark name.
    pub name: Name,
    /// Number of iterations the measurements were averaged over.
    pub iters: u64,
    /// Measurements in input order.
    pub values: Vec<Value>,
    #[cfg_attr(feature = "serde", serde(skip))]
    config_pos: HashMap<Arc<str>, usize>,
    file_name: Arc<str>,
    line: usize,
}

impl BenchResult {
    /// Create an empty result with the given name and iteration count.
    pub fn new(name: impl Into<Name>, iters: u64) -> Self {
        Self {
            name: name.into(),
            iters,
            ..Self::default()
        }
    }

    /// Configuration entries in order.
    #[inline]
    pub fn config(&self) -> &[Config] {
        &self.config
    }

    /// Index of `key` in [`config`](Self::config).
    #[inline]
    pub fn config_index(&self, key: &str) -> Option<usize> {
        self.config_pos.get(key).copied()
    }

    /// Value of configuration `key`, whether file or internal.
    pub fn get_config(&self, key: &str) -> Option<&str> {
        self.config_index(key).map(|i| self.config[i].value.as_str())
    }

    /// Set an internal configuration entry. An empty value deletes the key.
    pub fn set_config(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.delete_config(key);
        } else {
            let key = match self.config_pos.get_key_value(key) {
                Some((k, _)) => Arc::clone(k),
                None => Arc::from(key),
            };
            self.upsert_config(key, value, false);
        }
    }

    /// Set a file configuration entry, as a `key: value` line would.
    pub fn set_file_config(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.delete_config(key);
        } else {
            self.upsert_config(Arc::from(key), value, true);
        }
    }

    /// Delete configuration `key`.
    ///
    /// The last entry takes the deleted entry's place, so only those two
    /// entries change position. Returns whether the key was present.
    pub fn delete_config(&mut self, key: &str) -> bool {
        let Some(pos) = self.config_pos.remove(key) else {
            return false;
        };
        self.config.swap_remove(pos);
        if let Some(moved) = self.config.get(pos) {
            self.config_pos.insert(Arc::clone(&moved.key), pos);
        }
        true
    }

    /// Remove all configuration.
    pub fn clear_config(&mut self) {
        self.config.clear();
        self.config_pos.clear();
    }

    /// Insert or overwrite an entry, reusing the existing value buffer.
    pub(crate) fn upsert_config(&mut self, key: Arc<str>, value: &str, file: bool) {
        match self.config_pos.get(&*key) {
            Some(&pos) => {
                let cfg = &mut self.config[pos];
                cfg.value.clear();
                cfg.value.push_str(value);
                cfg.file = file;
            }
            None => {
                self.config_pos.insert(Arc::clone(&key), self.config.len());
                self.config.push(Config {
                    key,
                    value: value.to_string(),
                    file,
                });
            }
        }
    }

    /// First measurement in canonical `unit`.
    pub fn value_of(&self, unit: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| &*v.unit == unit)
            .map(|v| v.value)
    }

    /// Source name and line this result was read from.
    #[inline]
    pub fn pos(&self) -> (&str, usize) {
        (&self.file_name, self.line)
    }

    /// Set the source position.
    pub fn set_pos(&mut self, file_name: Arc<str>, line: usize) {
        self.file_name = file_name;
        self.line = line;
    }
}
