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

//! Compiled filters.
//!
//! A [`Filter`] is compiled once from a query and then evaluated against
//! each result. Most predicates test the result as a whole and produce a
//! single boolean; predicates on `.unit` test each value separately and
//! produce a bitmask over the result's values. Combining the two broadcasts
//! the boolean over every value.

use crate::error::{QueryError, QueryResult};
use crate::extract::{Extractor, KeyKind};
use crate::mask::Mask;
use crate::query::{self, Expr, Pattern};
use benchkit_fmt::BenchResult;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// A compiled filter query.
///
/// # Examples
///
/// ```rust
/// use benchkit_fmt::{BenchResult, Value};
/// use benchkit_proc::Filter;
///
/// let mut res = BenchResult::new("Encode-8", 100);
/// res.set_file_config("goos", "linux");
/// res.values.push(Value::new(12.5, "sec/op"));
/// res.values.push(Value::new(4096.0, "B/op"));
///
/// let filter = Filter::parse("goos:linux .unit:sec/op").unwrap();
/// let m = filter.matches(&res);
/// assert!(m.any() && !m.all());
/// assert!(m.test(0) && !m.test(1));
///
/// assert!(filter.apply(&mut res));
/// assert_eq!(res.values.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    root: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Not(Box<Matcher>),
    And(Vec<Matcher>),
    Or(Vec<Matcher>),
    /// Whole-result predicate.
    Term(Term),
    /// Per-value predicate on the unit.
    Unit(ValueSet),
}

#[derive(Debug, Clone)]
struct Term {
    kind: KeyKind,
    /// Built on first evaluation.
    extractor: OnceLock<Option<Extractor>>,
    values: ValueSet,
}

impl Term {
    fn test(&self, res: &BenchResult) -> bool {
        let extractor = self
            .extractor
            .get_or_init(|| Extractor::for_kind(&self.kind, None));
        match extractor {
            Some(extractor) => self.values.matches(&extractor.extract(res)),
            None => false,
        }
    }
}

/// Alternatives of one match: exact strings and regular expressions.
#[derive(Debug, Clone, Default)]
struct ValueSet {
    exact: Vec<String>,
    regexes: Vec<Regex>,
}

impl ValueSet {
    fn compile(patterns: &[Pattern]) -> QueryResult<Self> {
        let mut set = Self::default();
        for pattern in patterns {
            match pattern {
                Pattern::Exact(s) => set.exact.push(s.clone()),
                Pattern::Regexp { source, offset } => {
                    let re = Regex::new(source).map_err(|source| QueryError::Regex {
                        offset: *offset,
                        source,
                    })?;
                    set.regexes.push(re);
                }
            }
        }
        Ok(set)
    }

    fn matches(&self, s: &str) -> bool {
        self.exact.iter().any(|e| e == s) || self.regexes.iter().any(|re| re.is_match(s))
    }
}

/// Result of evaluating a sub-expression.
#[derive(Debug)]
enum Truth {
    Bool(bool),
    Mask(Mask),
}

impl Matcher {
    fn compile(expr: &Expr) -> QueryResult<Self> {
        Ok(match expr {
            Expr::All => Matcher::All,
            Expr::Not(inner) => Matcher::Not(Box::new(Self::compile(inner)?)),
            Expr::And(exprs) => Matcher::And(exprs.iter().map(Self::compile).collect::<QueryResult<_>>()?),
            Expr::Or(exprs) => Matcher::Or(exprs.iter().map(Self::compile).collect::<QueryResult<_>>()?),
            Expr::Match {
                key,
                offset,
                patterns,
            } => {
                let kind = KeyKind::parse(key, *offset)?;
                let values = ValueSet::compile(patterns)?;
                match kind {
                    KeyKind::ConfigGroup => {
                        return Err(QueryError::not_allowed(
                            *offset,
                            key.as_str(),
                            "cannot filter on .config",
                        ))
                    }
                    KeyKind::Unit => Matcher::Unit(values),
                    kind => Matcher::Term(Term {
                        kind,
                        extractor: OnceLock::new(),
                        values,
                    }),
                }
            }
        })
    }

    fn eval(&self, res: &BenchResult) -> Truth {
        match self {
            Matcher::All => Truth::Bool(true),
            Matcher::Term(term) => Truth::Bool(term.test(res)),
            Matcher::Unit(values) => {
                let mut mask = Mask::new(res.values.len());
                for (i, v) in res.values.iter().enumerate() {
                    if values.matches(&v.unit) || values.matches(v.orig_unit()) {
                        mask.set(i);
                    }
                }
                Truth::Mask(mask)
            }
            Matcher::Not(inner) => match inner.eval(res) {
                Truth::Bool(b) => Truth::Bool(!b),
                Truth::Mask(mut mask) => {
                    mask.not();
                    Truth::Mask(mask)
                }
            },
            Matcher::And(matchers) => combine(matchers, res, false, Mask::and_with),
            Matcher::Or(matchers) => combine(matchers, res, true, Mask::or_with),
        }
    }
}

/// Fold AND (`decisive == false`) or OR (`decisive == true`) operands.
///
/// A boolean operand equal to `decisive` decides the result alone; other
/// booleans are the identity and drop out.
fn combine(
    matchers: &[Matcher],
    res: &BenchResult,
    decisive: bool,
    merge: fn(&mut Mask, &Mask),
) -> Truth {
    let mut acc: Option<Mask> = None;
    for matcher in matchers {
        match matcher.eval(res) {
            Truth::Bool(b) if b == decisive => return Truth::Bool(decisive),
            Truth::Bool(_) => {}
            Truth::Mask(mask) => {
                acc = Some(match acc.take() {
                    Some(mut acc) => {
                        merge(&mut acc, &mask);
                        acc
                    }
                    None => mask,
                });
            }
        }
    }
    match acc {
        Some(mask) => Truth::Mask(mask),
        None => Truth::Bool(!decisive),
    }
}

impl Filter {
    /// Compile a filter query.
    ///
    /// An empty query matches everything.
    pub fn parse(query: &str) -> QueryResult<Self> {
        let expr = query::parse_filter(query)?;
        let root = Matcher::compile(&expr)?;
        debug!("Compiled filter {:?} as {}", query, expr);
        Ok(Self { root })
    }

    /// A filter that matches every result and value.
    pub fn match_all() -> Self {
        Self { root: Matcher::All }
    }

    /// Evaluate the filter against `res`.
    pub fn matches(&self, res: &BenchResult) -> Match {
        Match {
            n: res.values.len(),
            truth: self.root.eval(res),
        }
    }

    /// Evaluate the filter and drop the values of `res` that fail it.
    ///
    /// Returns whether any values remain. See [`Match::apply`].
    pub fn apply(&self, res: &mut BenchResult) -> bool {
        let m = self.matches(res);
        m.apply(res)
    }

    /// Require `extractor` to yield one of `values`.
    pub(crate) fn constrain(&mut self, kind: KeyKind, extractor: Extractor, values: &[String]) {
        self.and(Matcher::Term(Term {
            kind,
            extractor: OnceLock::from(Some(extractor)),
            values: ValueSet {
                exact: values.to_vec(),
                regexes: Vec::new(),
            },
        }));
    }

    /// Require each kept value's unit to be one of `values`.
    pub(crate) fn constrain_unit(&mut self, values: &[String]) {
        self.and(Matcher::Unit(ValueSet {
            exact: values.to_vec(),
            regexes: Vec::new(),
        }));
    }

    fn and(&mut self, matcher: Matcher) {
        self.root = match std::mem::replace(&mut self.root, Matcher::All) {
            Matcher::All => matcher,
            Matcher::And(mut matchers) => {
                matchers.push(matcher);
                Matcher::And(matchers)
            }
            root => Matcher::And(vec![root, matcher]),
        };
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::match_all()
    }
}

/// The outcome of evaluating a [`Filter`] against one result.
#[derive(Debug)]
pub struct Match {
    n: usize,
    truth: Truth,
}

impl Match {
    /// Number of values in the evaluated result.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the evaluated result had no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether every value matched.
    pub fn all(&self) -> bool {
        match &self.truth {
            Truth::Bool(b) => *b,
            Truth::Mask(mask) => mask.all(),
        }
    }

    /// Whether any value matched.
    pub fn any(&self) -> bool {
        match &self.truth {
            Truth::Bool(b) => *b,
            Truth::Mask(mask) => mask.any(),
        }
    }

    /// Whether value `i` matched.
    pub fn test(&self, i: usize) -> bool {
        match &self.truth {
            Truth::Bool(b) => *b && i < self.n,
            Truth::Mask(mask) => mask.get(i),
        }
    }

    /// Remove the values of `res` that did not match, keeping order.
    ///
    /// Returns whether any values remain, so a result without values is
    /// always rejected. When everything matched the result is left untouched.
    pub fn apply(&self, res: &mut BenchResult) -> bool {
        debug_assert_eq!(res.values.len(), self.n);
        if self.all() {
            return !res.values.is_empty();
        }
        if !self.any() {
            res.values.clear();
            return false;
        }
        let mut i = 0;
        res.values.retain(|_| {
            let keep = self.test(i);
            i += 1;
            keep
        });
        !res.values.is_empty()
    }
}
