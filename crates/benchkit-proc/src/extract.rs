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

//! Extracting the value of a query key from a result.

use crate::error::{QueryError, QueryResult};
use benchkit_fmt::BenchResult;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// What a query key refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyKind {
    /// `.name`: base benchmark name.
    Name,
    /// `.fullname`: full benchmark name.
    FullName,
    /// `.config`: every file configuration key.
    ConfigGroup,
    /// `.unit`: measurement unit.
    Unit,
    /// `/key`: a sub-benchmark name part.
    SubName(String),
    /// Anything else: a configuration key (including `.file`).
    Config(String),
}

impl KeyKind {
    /// Classify `key`, rejecting unknown `.` keys.
    pub(crate) fn parse(key: &str, offset: usize) -> QueryResult<Self> {
        match key {
            "" => Err(QueryError::syntax(offset, "empty key")),
            ".name" => Ok(Self::Name),
            ".fullname" => Ok(Self::FullName),
            ".config" => Ok(Self::ConfigGroup),
            ".unit" => Ok(Self::Unit),
            ".file" => Ok(Self::Config(key.to_string())),
            "/" => Err(QueryError::syntax(offset, "missing sub-benchmark key after '/'")),
            _ if key.starts_with('.') => Err(QueryError::unknown_key(offset, key)),
            _ => match key.strip_prefix('/') {
                Some(sub) => Ok(Self::SubName(sub.to_string())),
                None => Ok(Self::Config(key.to_string())),
            },
        }
    }
}

/// Keys named by the projections of one parser.
#[derive(Debug, Clone, Default)]
pub(crate) struct Claims {
    /// Configuration keys.
    pub(crate) config: HashSet<String>,
    /// Sub-benchmark keys (`gomaxprocs` for the `-N` suffix).
    pub(crate) sub_names: HashSet<String>,
    pub(crate) full_name: bool,
    pub(crate) config_group: bool,
}

impl Claims {
    /// Record that `kind` is projected explicitly.
    pub(crate) fn claim(&mut self, kind: &KeyKind) {
        match kind {
            KeyKind::FullName => self.full_name = true,
            KeyKind::ConfigGroup => self.config_group = true,
            KeyKind::Name | KeyKind::Unit => {}
            KeyKind::SubName(key) => {
                self.sub_names.insert(key.clone());
            }
            KeyKind::Config(key) => {
                self.config.insert(key.clone());
            }
        }
    }
}

/// The claims of a parser as of first use.
///
/// Extractors that exclude claimed keys read the shared set once, the first
/// time they run, so that projections parsed later by the same parser are
/// taken into account.
#[derive(Debug, Clone)]
pub(crate) struct ClaimsSnapshot {
    source: Arc<RwLock<Claims>>,
    snapshot: OnceLock<Claims>,
}

impl ClaimsSnapshot {
    pub(crate) fn new(source: &Arc<RwLock<Claims>>) -> Self {
        Self {
            source: Arc::clone(source),
            snapshot: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> &Claims {
        self.snapshot.get_or_init(|| self.source.read().clone())
    }
}

/// Extracts one string from a result.
#[derive(Debug, Clone)]
pub(crate) enum Extractor {
    Name,
    /// Full name, minus claimed sub-benchmark parts when claims are given.
    FullName(Option<ClaimsSnapshot>),
    SubName(String),
    /// The `-N` suffix, or empty.
    Gomaxprocs,
    Config(String),
}

impl Extractor {
    /// Extractor for a key outside of any projection.
    ///
    /// Returns `None` for `.config` and `.unit`, which are not single values
    /// of a result.
    pub(crate) fn for_kind(kind: &KeyKind, claims: Option<&Arc<RwLock<Claims>>>) -> Option<Self> {
        Some(match kind {
            KeyKind::Name => Self::Name,
            KeyKind::FullName => Self::FullName(claims.map(ClaimsSnapshot::new)),
            KeyKind::SubName(key) if key == "gomaxprocs" => Self::Gomaxprocs,
            KeyKind::SubName(key) => Self::SubName(key.clone()),
            KeyKind::Config(key) => Self::Config(key.clone()),
            KeyKind::ConfigGroup | KeyKind::Unit => return None,
        })
    }

    pub(crate) fn extract<'a>(&self, res: &'a BenchResult) -> Cow<'a, str> {
        match self {
            Self::Name => Cow::Borrowed(res.name.base()),
            Self::FullName(None) => Cow::Borrowed(res.name.full()),
            Self::FullName(Some(claims)) => strip_claimed(res, claims.get()),
            Self::SubName(key) => Cow::Borrowed(res.name.sub_value(key).unwrap_or("")),
            Self::Gomaxprocs => Cow::Borrowed(res.name.procs().unwrap_or("")),
            Self::Config(key) => Cow::Borrowed(res.get_config(key).unwrap_or("")),
        }
    }
}

/// Remove the name parts of claimed sub-benchmark keys.
fn strip_claimed<'a>(res: &'a BenchResult, claims: &Claims) -> Cow<'a, str> {
    if claims.sub_names.is_empty() {
        return Cow::Borrowed(res.name.full());
    }
    let (base, parts) = res.name.parts();
    let mut out = String::with_capacity(res.name.full().len());
    out.push_str(base);
    for part in parts {
        let claimed = if part.starts_with('-') {
            claims.sub_names.contains("gomaxprocs")
        } else {
            match part[1..].split_once('=') {
                Some((key, _)) => claims.sub_names.contains(key),
                None => false,
            }
        };
        if !claimed {
            out.push_str(part);
        }
    }
    Cow::Owned(out)
}
