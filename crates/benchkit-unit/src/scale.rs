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

//! Magnitude-suffixed number parsing.

/// IEC binary prefixes, checked before the single-character SI prefixes so
/// that `Mi` is not read as `M` followed by garbage.
const IEC_PREFIXES: &[(&str, i32)] = &[
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
    ("Zi", 7),
    ("Yi", 8),
];

const SI_PREFIXES: &[(char, f64)] = &[
    ('k', 1e3),
    ('M', 1e6),
    ('G', 1e9),
    ('T', 1e12),
    ('P', 1e15),
    ('E', 1e18),
    ('Z', 1e21),
    ('Y', 1e24),
    ('m', 1e-3),
    ('µ', 1e-6),
    ('u', 1e-6),
    ('n', 1e-9),
    ('p', 1e-12),
    ('f', 1e-15),
    ('a', 1e-18),
    ('z', 1e-21),
    ('y', 1e-24),
];

/// Split a magnitude prefix off the end of `s`.
///
/// Returns the remaining number text and the multiplier of the suffix, or
/// `None` if `s` does not end in a known SI or IEC prefix.
pub fn split_magnitude(s: &str) -> Option<(&str, f64)> {
    for (suffix, power) in IEC_PREFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some((number, 1024f64.powi(*power)));
        }
    }
    let last = s.chars().next_back()?;
    SI_PREFIXES
        .iter()
        .find(|(prefix, _)| *prefix == last)
        .map(|(_, scale)| (&s[..s.len() - last.len_utf8()], *scale))
}

/// Parse a number with an optional SI or IEC magnitude suffix.
///
/// Plain floats (including `inf` and `NaN`) are accepted as-is. Returns
/// `None` for anything that is not a number.
///
/// # Examples
///
/// ```rust
/// use benchkit_unit::parse_value;
///
/// assert_eq!(parse_value("20"), Some(20.0));
/// assert_eq!(parse_value("2k"), Some(2000.0));
/// assert_eq!(parse_value("1Mi"), Some(1_048_576.0));
/// assert_eq!(parse_value("1.5Ki"), Some(1536.0));
/// assert_eq!(parse_value("fast"), None);
/// ```
pub fn parse_value(s: &str) -> Option<f64> {
    if let Ok(value) = s.parse::<f64>() {
        return Some(value);
    }
    let (number, scale) = split_magnitude(s)?;
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().map(|value| value * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== parse_value tests ====================

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_value("0"), Some(0.0));
        assert_eq!(parse_value("-3.25"), Some(-3.25));
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert_eq!(parse_value("inf"), Some(f64::INFINITY));
        assert!(parse_value("NaN").unwrap().is_nan());
    }

    #[test]
    fn test_si_and_iec() {
        assert_eq!(parse_value("1M"), Some(1_000_000.0));
        assert_eq!(parse_value("1Mi"), Some(1_048_576.0));
        assert_eq!(parse_value("2k"), Some(2000.0));
        assert_eq!(parse_value("4Gi"), Some(4.0 * 1024.0 * 1024.0 * 1024.0));
        assert_eq!(parse_value("1m"), Some(1e-3));
        assert_eq!(parse_value("1µ"), Some(1e-6));
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("a"), None);
        assert_eq!(parse_value("Mi"), None);
        assert_eq!(parse_value("10x"), None);
        assert_eq!(parse_value("1kk"), None);
    }

    // ==================== split_magnitude tests ====================

    #[test]
    fn test_split_magnitude() {
        assert_eq!(split_magnitude("12Ki"), Some(("12", 1024.0)));
        assert_eq!(split_magnitude("12k"), Some(("12", 1000.0)));
        assert_eq!(split_magnitude("12"), None);
        assert_eq!(split_magnitude(""), None);
    }

    proptest! {
        #[test]
        fn prop_integers_parse_exactly(n in -1_000_000_i64..1_000_000) {
            prop_assert_eq!(parse_value(&n.to_string()), Some(n as f64));
        }

        #[test]
        fn prop_kilo_scales(n in 0_u32..100_000) {
            prop_assert_eq!(parse_value(&format!("{}k", n)), Some(n as f64 * 1000.0));
            prop_assert_eq!(parse_value(&format!("{}Ki", n)), Some(n as f64 * 1024.0));
        }
    }
}
