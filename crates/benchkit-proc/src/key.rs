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

//! Interned projection keys.

use crate::query::quote_word;
use crate::schema::{Field, Shared};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The projected values of a result.
///
/// A projection returns the same `Key` for results that project to the same
/// values, so keys compare equal, and hash, by identity. Keys are cheap to
/// clone and safe to share between threads.
///
/// Keys of one projection are ordered field by field using each field's
/// order. Keys of different projections are never equal and order by which
/// projection was created first.
#[derive(Clone)]
pub struct Key(Arc<KeyNode>);

struct KeyNode {
    shared: Arc<Shared>,
    /// Values by slot, with trailing empty values trimmed.
    vals: Box<[Box<str>]>,
}

impl Key {
    pub(crate) fn new(shared: &Arc<Shared>, vals: Box<[Box<str>]>) -> Self {
        Self(Arc::new(KeyNode {
            shared: Arc::clone(shared),
            vals,
        }))
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.0.shared
    }

    #[inline]
    pub(crate) fn vals(&self) -> &[Box<str>] {
        &self.0.vals
    }

    /// Value of a leaf field.
    ///
    /// Returns the empty string for fields of other projections, group
    /// fields and fields added after this key was created.
    pub fn get(&self, field: &Field) -> &str {
        if !Arc::ptr_eq(&field.shared, self.shared()) {
            return "";
        }
        let slot = field.shared.schema.read().leaf_slot(field.id);
        slot.and_then(|slot| self.0.vals.get(slot))
            .map_or("", |v| &**v)
    }

    /// Leaf fields of this key's projection in sort order.
    pub fn fields(&self) -> Vec<Field> {
        Field::flattened(self.shared())
    }

    /// Values of every leaf field, comma-separated.
    pub fn string_values(&self) -> String {
        let fields = self.fields();
        let mut out = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(self.get(field));
        }
        out
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        if !Arc::ptr_eq(self.shared(), other.shared()) {
            return self.shared().id.cmp(&other.shared().id);
        }
        self.shared()
            .schema
            .read()
            .compare(self.vals(), other.vals())
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `field:value` pairs for non-empty values, space-separated.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for field in self.fields() {
            let value = self.get(&field);
            if value.is_empty() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}:{}", quote_word(&field.name()), quote_word(value))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}
