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

//! Value orders for projection fields.

use crate::key::Key;
use benchkit_unit::parse_value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in orders that need no per-field state to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrderKind {
    FirstObserved,
    Alpha,
    Numeric,
}

impl OrderKind {
    /// Look up an order by its query name.
    pub(crate) fn by_name(name: &str) -> Option<Self> {
        match name {
            "first" => Some(Self::FirstObserved),
            "alpha" => Some(Self::Alpha),
            "num" => Some(Self::Numeric),
            _ => None,
        }
    }
}

/// Dense ranks assigned to values.
#[derive(Debug, Clone, Default)]
pub(crate) struct RankTable {
    ranks: HashMap<Arc<str>, usize>,
}

impl RankTable {
    /// A table ranking `values` in the given order.
    pub(crate) fn fixed(values: &[String]) -> Self {
        let mut table = Self::default();
        for v in values {
            table.observe(v);
        }
        table
    }

    /// Give `value` the next rank if it has none yet.
    pub(crate) fn observe(&mut self, value: &str) {
        if !self.ranks.contains_key(value) {
            let rank = self.ranks.len();
            self.ranks.insert(Arc::from(value), rank);
        }
    }

    /// Rank of `value`; unranked values come last.
    #[inline]
    fn rank(&self, value: &str) -> usize {
        self.ranks.get(value).copied().unwrap_or(usize::MAX)
    }
}

/// How the values of one field are ordered.
#[derive(Debug, Clone)]
pub(crate) enum Order {
    /// In the order values were first seen.
    FirstObserved(RankTable),
    /// Byte-wise.
    Alpha,
    /// Numbers (with SI/IEC suffixes) first, then other strings, then NaN.
    Numeric,
    /// In the order of an explicit enumeration.
    Fixed(RankTable),
}

impl Order {
    pub(crate) fn from_kind(kind: OrderKind) -> Self {
        match kind {
            OrderKind::FirstObserved => Self::FirstObserved(RankTable::default()),
            OrderKind::Alpha => Self::Alpha,
            OrderKind::Numeric => Self::Numeric,
        }
    }

    /// Record a value as seen.
    pub(crate) fn observe(&mut self, value: &str) {
        if let Self::FirstObserved(table) = self {
            table.observe(value);
        }
    }

    /// Compare two values. Distinct strings never compare equal.
    pub(crate) fn compare(&self, a: &str, b: &str) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let ord = match self {
            Self::FirstObserved(table) | Self::Fixed(table) => table.rank(a).cmp(&table.rank(b)),
            Self::Alpha => Ordering::Equal,
            Self::Numeric => compare_numeric(a, b),
        };
        ord.then_with(|| a.cmp(b))
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let (ca, va) = numeric_class(a);
    let (cb, vb) = numeric_class(b);
    ca.cmp(&cb)
        .then_with(|| va.partial_cmp(&vb).unwrap_or(Ordering::Equal))
}

/// Class (0 number, 1 other string, 2 NaN) and value of `s`.
fn numeric_class(s: &str) -> (u8, f64) {
    match parse_value(s) {
        Some(v) if v.is_nan() => (2, 0.0),
        Some(v) => (0, v),
        None => (1, 0.0),
    }
}

/// Sort keys by their projection's field orders.
///
/// The sort is stable. Keys of different projections are ordered by when
/// the projection was created.
pub fn sort_keys(keys: &mut [Key]) {
    keys.sort();
}
