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

//! Table headers over sorted keys.

use crate::key::Key;
use crate::schema::Field;

/// A common-prefix tree over a sorted list of keys, for rendering
/// multi-level table headers.
///
/// There is one level per flattened field. Each node covers a run of
/// adjacent keys that share its value and the values of all its ancestors.
#[derive(Debug, Clone)]
pub struct KeyHeader {
    /// The keys, in the order given.
    pub keys: Vec<Key>,
    /// The field of each level.
    pub levels: Vec<Field>,
    /// Nodes of the first level.
    pub top: Vec<KeyHeaderNode>,
}

/// One run of keys in a [`KeyHeader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHeaderNode {
    /// Level of this node (index into [`KeyHeader::levels`]).
    pub field: usize,
    /// Value shared by the keys in this run.
    pub value: String,
    /// Index of the first key in the run.
    pub start: usize,
    /// Number of keys in the run.
    pub len: usize,
    /// Nodes of the next level within this run.
    pub children: Vec<KeyHeaderNode>,
}

impl KeyHeader {
    /// Build the header for `keys`, which should be sorted and come from a
    /// single projection.
    pub fn new(keys: Vec<Key>) -> Self {
        let levels = keys.first().map(Key::fields).unwrap_or_default();
        let top = build_level(&keys, &levels, 0, 0, keys.len());
        Self { keys, levels, top }
    }
}

fn build_level(
    keys: &[Key],
    levels: &[Field],
    level: usize,
    start: usize,
    end: usize,
) -> Vec<KeyHeaderNode> {
    let Some(field) = levels.get(level) else {
        return Vec::new();
    };
    let mut nodes = Vec::new();
    let mut run = start;
    while run < end {
        let value = keys[run].get(field);
        let mut next = run + 1;
        while next < end && keys[next].get(field) == value {
            next += 1;
        }
        nodes.push(KeyHeaderNode {
            field: level,
            value: value.to_string(),
            start: run,
            len: next - run,
            children: build_level(keys, levels, level + 1, run, next),
        });
        run = next;
    }
    nodes
}

/// The flattened fields whose value is not the same across all `keys`.
///
/// Useful for omitting constant columns from a table.
pub fn non_singular_fields(keys: &[Key]) -> Vec<Field> {
    let Some(first) = keys.first() else {
        return Vec::new();
    };
    let mut fields = first.fields();
    fields.retain(|field| {
        let value = first.get(field);
        keys[1..].iter().any(|key| key.get(field) != value)
    });
    fields
}
