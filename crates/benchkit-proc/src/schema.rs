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

//! Field layout of a projection.
//!
//! The schema is shared between a [`Projection`](crate::Projection) and every
//! [`Key`](crate::Key) it creates. It only ever grows: a `.config` group gains
//! a leaf the first time a new configuration key is seen, and existing keys
//! read the new leaf as empty.

use crate::sort::{Order, OrderKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_PROJECTION_ID: AtomicUsize = AtomicUsize::new(0);

/// State shared by a projection, its fields and its keys.
#[derive(Debug)]
pub(crate) struct Shared {
    /// Creation order of the projection.
    pub(crate) id: usize,
    pub(crate) schema: RwLock<Schema>,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_PROJECTION_ID.fetch_add(1, Ordering::Relaxed),
            schema: RwLock::new(Schema::default()),
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct Schema {
    /// Every field, indexed by field id.
    fields: Vec<FieldData>,
    /// Top-level field ids in projection order.
    top: Vec<usize>,
    /// Leaf field ids, groups expanded in place.
    flat: Vec<usize>,
    /// Number of leaf slots handed out.
    slots: usize,
    /// Number of keys observed so far.
    observed: usize,
}

#[derive(Debug)]
struct FieldData {
    name: Arc<str>,
    kind: FieldKind,
}

#[derive(Debug)]
enum FieldKind {
    Leaf {
        slot: usize,
        order: Order,
    },
    Group {
        children: Vec<usize>,
        by_name: HashMap<Arc<str>, usize>,
        order: OrderKind,
    },
}

impl Schema {
    /// Add a leaf, at the top level or as the last child of `parent`.
    /// Returns the new field id.
    pub(crate) fn add_leaf(&mut self, name: &str, order: Order, parent: Option<usize>) -> usize {
        let id = self.fields.len();
        let name: Arc<str> = Arc::from(name);
        self.fields.push(FieldData {
            name: Arc::clone(&name),
            kind: FieldKind::Leaf {
                slot: self.slots,
                order,
            },
        });
        self.slots += 1;
        match parent {
            Some(parent) => {
                if let FieldKind::Group {
                    children, by_name, ..
                } = &mut self.fields[parent].kind
                {
                    children.push(id);
                    by_name.insert(name, id);
                }
            }
            None => self.top.push(id),
        }
        self.rebuild_flat();
        id
    }

    /// Add an empty top-level group whose leaves use `order`.
    pub(crate) fn add_group(&mut self, name: &str, order: OrderKind) -> usize {
        let id = self.fields.len();
        self.fields.push(FieldData {
            name: Arc::from(name),
            kind: FieldKind::Group {
                children: Vec::new(),
                by_name: HashMap::new(),
                order,
            },
        });
        self.top.push(id);
        id
    }

    /// Slot of the child of `group` named `name`, if it exists.
    pub(crate) fn group_child_slot(&self, group: usize, name: &str) -> Option<usize> {
        match &self.fields[group].kind {
            FieldKind::Group { by_name, .. } => {
                by_name.get(name).and_then(|&id| self.leaf_slot(id))
            }
            FieldKind::Leaf { .. } => None,
        }
    }

    /// Order used by the leaves of `group`.
    pub(crate) fn group_order(&self, group: usize) -> OrderKind {
        match &self.fields[group].kind {
            FieldKind::Group { order, .. } => *order,
            FieldKind::Leaf { .. } => OrderKind::FirstObserved,
        }
    }

    /// Slot of a leaf field; `None` for groups.
    pub(crate) fn leaf_slot(&self, id: usize) -> Option<usize> {
        match self.fields.get(id)?.kind {
            FieldKind::Leaf { slot, .. } => Some(slot),
            FieldKind::Group { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.slots
    }

    #[inline]
    pub(crate) fn flat(&self) -> &[usize] {
        &self.flat
    }

    /// Whether any key has been observed yet.
    #[inline]
    pub(crate) fn has_keys(&self) -> bool {
        self.observed > 0
    }

    /// Record the values of a new key in the leaves' orders.
    pub(crate) fn observe(&mut self, vals: &[Box<str>]) {
        self.observed += 1;
        for field in &mut self.fields {
            if let FieldKind::Leaf { slot, order } = &mut field.kind {
                order.observe(vals.get(*slot).map_or("", |v| &**v));
            }
        }
    }

    /// Compare two value rows leaf by leaf in flattened order.
    pub(crate) fn compare(&self, a: &[Box<str>], b: &[Box<str>]) -> std::cmp::Ordering {
        for &id in &self.flat {
            if let FieldKind::Leaf { slot, order } = &self.fields[id].kind {
                let va = a.get(*slot).map_or("", |v| &**v);
                let vb = b.get(*slot).map_or("", |v| &**v);
                let ord = order.compare(va, vb);
                if ord.is_ne() {
                    return ord;
                }
            }
        }
        std::cmp::Ordering::Equal
    }

    fn rebuild_flat(&mut self) {
        self.flat.clear();
        for &id in &self.top {
            match &self.fields[id].kind {
                FieldKind::Leaf { .. } => self.flat.push(id),
                FieldKind::Group { children, .. } => self.flat.extend_from_slice(children),
            }
        }
    }
}

/// A field of a projection.
///
/// Fields compare equal only to the same field of the same projection.
#[derive(Clone)]
pub struct Field {
    pub(crate) shared: Arc<Shared>,
    pub(crate) id: usize,
}

impl Field {
    pub(crate) fn new(shared: &Arc<Shared>, id: usize) -> Self {
        Self {
            shared: Arc::clone(shared),
            id,
        }
    }

    /// Leaf fields of `shared` in flattened order.
    pub(crate) fn flattened(shared: &Arc<Shared>) -> Vec<Field> {
        let schema = shared.schema.read();
        schema.flat().iter().map(|&id| Field::new(shared, id)).collect()
    }

    /// The key this field was projected from (or the configuration key,
    /// for a leaf of `.config`).
    pub fn name(&self) -> Arc<str> {
        Arc::clone(&self.shared.schema.read().fields[self.id].name)
    }

    /// Whether this is a group field such as `.config`.
    pub fn is_group(&self) -> bool {
        matches!(
            self.shared.schema.read().fields[self.id].kind,
            FieldKind::Group { .. }
        )
    }

    /// Current children of a group field; empty for leaves.
    pub fn children(&self) -> Vec<Field> {
        let schema = self.shared.schema.read();
        match &schema.fields[self.id].kind {
            FieldKind::Group { children, .. } => children
                .iter()
                .map(|&id| Field::new(&self.shared, id))
                .collect(),
            FieldKind::Leaf { .. } => Vec::new(),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) && self.id == other.id
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name()).finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
