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

//! Unit tidying.
//!
//! A unit is a `/`-separated list of parts: the first part is the numerator,
//! every following part a denominator (`ns/op`, `B/s`, `allocs/op`). Each part
//! that names a scaled form of a base unit is replaced by the base unit and
//! the value is rescaled accordingly.

use std::borrow::Cow;

/// Scaled unit spellings and their canonical base unit.
const SCALED_UNITS: &[(&str, &str, f64)] = &[
    ("ns", "sec", 1e-9),
    ("us", "sec", 1e-6),
    ("µs", "sec", 1e-6),
    ("ms", "sec", 1e-3),
    ("MB", "B", 1e6),
];

/// Compute the canonical form of `unit`.
///
/// Returns `None` when the unit is already canonical. Otherwise returns the
/// canonical unit and the factor a value in `unit` must be multiplied by to be
/// expressed in the canonical unit.
///
/// # Examples
///
/// ```rust
/// use benchkit_unit::tidy_unit;
///
/// assert_eq!(tidy_unit("ns/op"), Some(("sec/op".to_string(), 1e-9)));
/// assert_eq!(tidy_unit("MB/s"), Some(("B/s".to_string(), 1e6)));
/// assert_eq!(tidy_unit("B/op"), None);
/// ```
pub fn tidy_unit(unit: &str) -> Option<(String, f64)> {
    let mut factor = 1.0;
    let mut changed = false;
    let mut tidied = String::with_capacity(unit.len() + 2);

    for (i, part) in unit.split('/').enumerate() {
        if i > 0 {
            tidied.push('/');
        }
        match SCALED_UNITS.iter().find(|(scaled, _, _)| *scaled == part) {
            Some((_, base, scale)) => {
                changed = true;
                tidied.push_str(base);
                if i == 0 {
                    factor *= scale;
                } else {
                    factor /= scale;
                }
            }
            None => tidied.push_str(part),
        }
    }

    changed.then_some((tidied, factor))
}

/// Rescale `value` measured in `unit` to the canonical unit.
///
/// The unit is borrowed back unchanged when it is already canonical.
pub fn tidy(value: f64, unit: &str) -> (f64, Cow<'_, str>) {
    match tidy_unit(unit) {
        Some((tidied, factor)) => (value * factor, Cow::Owned(tidied)),
        None => (value, Cow::Borrowed(unit)),
    }
}
