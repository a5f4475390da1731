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

//! Bounded string interning for config keys and units.
//!
//! The same handful of keys and units repeat on every line of a benchmark
//! log. Interning them avoids an allocation per field, and bounding the table
//! keeps adversarial inputs (e.g. a unique unit per line) from growing it
//! without limit. When full, one arbitrary entry is evicted; evicted strings
//! stay alive for as long as records reference them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Tidying outcome for an interned unit: canonical unit and scale factor.
type Tidied = Option<(Arc<str>, f64)>;

#[derive(Debug)]
pub(crate) struct Interner {
    strings: HashSet<Arc<str>>,
    tidied: HashMap<Arc<str>, Tidied>,
    capacity: usize,
}

impl Interner {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            strings: HashSet::new(),
            tidied: HashMap::new(),
            capacity,
        }
    }

    /// Return the shared copy of `s`, adding it if needed.
    pub(crate) fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(shared) = self.strings.get(s) {
            return Arc::clone(shared);
        }
        let shared: Arc<str> = Arc::from(s);
        if self.capacity == 0 {
            return shared;
        }
        if self.strings.len() >= self.capacity {
            if let Some(victim) = self.strings.iter().next().cloned() {
                trace!("Intern table full ({} entries), evicting {:?}", self.capacity, victim);
                self.strings.remove(&victim);
            }
        }
        self.strings.insert(Arc::clone(&shared));
        shared
    }

    /// Tidy an interned unit, caching the result.
    pub(crate) fn tidy(&mut self, unit: &Arc<str>) -> Tidied {
        if let Some(cached) = self.tidied.get(unit) {
            return cached.clone();
        }
        let tidied = benchkit_unit::tidy_unit(unit)
            .map(|(canonical, factor)| (self.intern(&canonical), factor));
        if self.capacity > 0 {
            if self.tidied.len() >= self.capacity {
                if let Some(victim) = self.tidied.keys().next().cloned() {
                    self.tidied.remove(&victim);
                }
            }
            self.tidied.insert(Arc::clone(unit), tidied.clone());
        }
        tidied
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.strings.len()
    }
}
