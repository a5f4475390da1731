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

//! Byte-level scanning helpers for the line parser.
//!
//! Benchmark output is overwhelmingly ASCII, so whitespace is classified with
//! a lookup table and only bytes >= 0x80 pay for UTF-8 decoding.

/// ASCII whitespace classes, matching `char::is_whitespace` on ASCII.
static ASCII_SPACE: [bool; 256] = {
    let mut table = [false; 256];
    table[b' ' as usize] = true;
    table[b'\t' as usize] = true;
    table[b'\n' as usize] = true;
    table[0x0b] = true;
    table[0x0c] = true;
    table[b'\r' as usize] = true;
    table
};

/// Whether the character starting at byte `i` of `s` is whitespace, and its
/// length in bytes.
#[inline]
fn space_at(s: &str, i: usize) -> (bool, usize) {
    let b = s.as_bytes()[i];
    if b < 0x80 {
        return (ASCII_SPACE[b as usize], 1);
    }
    match s[i..].chars().next() {
        Some(ch) => (ch.is_whitespace(), ch.len_utf8()),
        None => (false, 1),
    }
}

/// Whether `s` begins with whitespace.
#[inline]
pub(crate) fn starts_with_space(s: &str) -> bool {
    !s.is_empty() && space_at(s, 0).0
}

/// Skip leading whitespace.
pub(crate) fn trim_start(s: &str) -> &str {
    let mut i = 0;
    while i < s.len() {
        let (space, len) = space_at(s, i);
        if !space {
            break;
        }
        i += len;
    }
    &s[i..]
}

/// Strip leading and trailing whitespace.
pub(crate) fn trim(s: &str) -> &str {
    let s = trim_start(s);
    let mut end = s.len();
    while end > 0 {
        let b = s.as_bytes()[end - 1];
        if b < 0x80 {
            if !ASCII_SPACE[b as usize] {
                break;
            }
            end -= 1;
        } else {
            match s[..end].chars().next_back() {
                Some(ch) if ch.is_whitespace() => end -= ch.len_utf8(),
                _ => break,
            }
        }
    }
    &s[..end]
}

/// Split off the next whitespace-delimited field.
///
/// Returns the field (empty at end of line) and the remainder, which starts
/// at the whitespace following the field.
pub(crate) fn split_field(s: &str) -> (&str, &str) {
    let s = trim_start(s);
    let mut i = 0;
    while i < s.len() {
        let (space, len) = space_at(s, i);
        if space {
            break;
        }
        i += len;
    }
    (&s[..i], &s[i..])
}

/// Parse a non-negative decimal integer, rejecting signs and overflow.
pub(crate) fn parse_uint(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in s.as_bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }
    Some(n)
}

/// Parse a measurement value: plain integers take a fast path, everything
/// else goes through the general float parser.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    // 15 digits always fit in an f64 mantissa exactly.
    if digits.len() <= 15 {
        if let Some(n) = parse_uint(digits) {
            let v = n as f64;
            return Some(if digits.len() < s.len() { -v } else { v });
        }
    }
    s.parse::<f64>().ok()
}
