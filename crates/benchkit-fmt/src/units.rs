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

//! Unit metadata declared with `Unit <unit> <key>=<value>` lines.

use benchkit_unit::Assumption;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifies one metadata fact: a canonical unit and a metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitMetadataKey {
    /// Canonical (tidied) unit.
    pub unit: Arc<str>,
    /// Metadata key, e.g. `assume`.
    pub key: Arc<str>,
}

/// One unit metadata fact.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitMetadata {
    /// Canonical unit and metadata key.
    pub key: UnitMetadataKey,
    /// Unit as written in the input.
    pub orig_unit: Arc<str>,
    /// Metadata value.
    pub value: String,
    file_name: Arc<str>,
    line: usize,
}

impl UnitMetadata {
    /// Create a metadata fact for `orig_unit`, tidying the unit for its key.
    pub fn new(orig_unit: &str, key: &str, value: impl Into<String>) -> Self {
        let orig_unit: Arc<str> = Arc::from(orig_unit);
        let unit = match benchkit_unit::tidy_unit(&orig_unit) {
            Some((tidied, _)) => Arc::from(tidied),
            None => Arc::clone(&orig_unit),
        };
        Self {
            key: UnitMetadataKey {
                unit,
                key: Arc::from(key),
            },
            orig_unit,
            value: value.into(),
            file_name: Arc::from(""),
            line: 0,
        }
    }

    pub(crate) fn from_parts(
        key: UnitMetadataKey,
        orig_unit: Arc<str>,
        value: &str,
        file_name: Arc<str>,
        line: usize,
    ) -> Self {
        Self {
            key,
            orig_unit,
            value: value.to_string(),
            file_name,
            line,
        }
    }

    /// Source name and line the fact was declared at.
    #[inline]
    pub fn pos(&self) -> (&str, usize) {
        (&self.file_name, self.line)
    }
}

/// Outcome of adding a fact to a [`UnitMetadataMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Declared {
    /// The fact is new.
    New,
    /// The same fact was already declared.
    Duplicate,
    /// A different value was already declared; carries that value.
    Conflict(String),
}

/// All unit metadata seen so far, keyed by canonical unit.
///
/// Lookups accept either the canonical or the original spelling of a unit.
///
/// ```rust
/// use benchkit_fmt::{Reader, UnitMetadataMap};
/// use benchkit_unit::Assumption;
/// use std::io::Cursor;
///
/// let mut reader = Reader::new(Cursor::new("Unit ns/op assume=exact\n"), "in");
/// while reader.next_record().unwrap().is_some() {}
///
/// let units: &UnitMetadataMap = reader.units();
/// assert_eq!(units.get("ns/op", "assume"), Some("exact"));
/// assert_eq!(units.get("sec/op", "assume"), Some("exact"));
/// assert_eq!(units.assumption("sec/op"), Assumption::Exact);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitMetadataMap {
    by_unit: HashMap<Arc<str>, HashMap<Arc<str>, UnitMetadata>>,
    len: usize,
}

impl UnitMetadataMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata value of `key` for `unit` (canonical or original spelling).
    pub fn get(&self, unit: &str, key: &str) -> Option<&str> {
        self.get_metadata(unit, key).map(|md| md.value.as_str())
    }

    /// Full metadata fact of `key` for `unit`.
    pub fn get_metadata(&self, unit: &str, key: &str) -> Option<&UnitMetadata> {
        let unit = canonical(unit);
        self.by_unit.get(&*unit)?.get(key)
    }

    /// The statistical assumption declared for `unit`.
    ///
    /// Units without an `assume` declaration, or with an unrecognized one,
    /// assume nothing.
    pub fn assumption(&self, unit: &str) -> Assumption {
        self.get(unit, "assume")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Number of facts.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no facts have been declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all facts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitMetadata> {
        self.by_unit.values().flat_map(|keys| keys.values())
    }

    /// Record a fact; the first declared value wins.
    pub(crate) fn declare(&mut self, md: &UnitMetadata) -> Declared {
        let keys = self.by_unit.entry(Arc::clone(&md.key.unit)).or_default();
        match keys.get(&md.key.key) {
            Some(have) if have.value == md.value => Declared::Duplicate,
            Some(have) => Declared::Conflict(have.value.clone()),
            None => {
                keys.insert(Arc::clone(&md.key.key), md.clone());
                self.len += 1;
                Declared::New
            }
        }
    }
}

fn canonical(unit: &str) -> Cow<'_, str> {
    match benchkit_unit::tidy_unit(unit) {
        Some((tidied, _)) => Cow::Owned(tidied),
        None => Cow::Borrowed(unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tidies_key_unit() {
        let md = UnitMetadata::new("ns/op", "assume", "exact");
        assert_eq!(&*md.key.unit, "sec/op");
        assert_eq!(&*md.orig_unit, "ns/op");
    }

    #[test]
    fn test_declare_outcomes() {
        let mut map = UnitMetadataMap::new();
        let md = UnitMetadata::new("B/op", "assume", "exact");
        assert_eq!(map.declare(&md), Declared::New);
        assert_eq!(map.declare(&md), Declared::Duplicate);

        let other = UnitMetadata::new("B/op", "assume", "nothing");
        assert_eq!(map.declare(&other), Declared::Conflict("exact".to_string()));
        assert_eq!(map.get("B/op", "assume"), Some("exact"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_lookup_by_either_spelling() {
        let mut map = UnitMetadataMap::new();
        map.declare(&UnitMetadata::new("MB/s", "better", "higher"));
        assert_eq!(map.get("MB/s", "better"), Some("higher"));
        assert_eq!(map.get("B/s", "better"), Some("higher"));
        assert_eq!(map.get("B/s", "assume"), None);
    }

    #[test]
    fn test_assumption_defaults() {
        let mut map = UnitMetadataMap::new();
        assert_eq!(map.assumption("B/op"), Assumption::Nothing);
        map.declare(&UnitMetadata::new("B/op", "assume", "bogus"));
        assert_eq!(map.assumption("B/op"), Assumption::Nothing);
        map.declare(&UnitMetadata::new("allocs/op", "assume", "exact"));
        assert_eq!(map.assumption("allocs/op"), Assumption::Exact);
    }

    #[test]
    fn test_iter_and_is_empty() {
        let mut map = UnitMetadataMap::new();
        assert!(map.is_empty());
        map.declare(&UnitMetadata::new("B/op", "a", "1"));
        map.declare(&UnitMetadata::new("B/op", "b", "2"));
        map.declare(&UnitMetadata::new("ns/op", "a", "3"));
        assert_eq!(map.iter().count(), 3);
    }
}
