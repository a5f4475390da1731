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

//! Projections: grouping results by a list of fields.
//!
//! A [`ProjectionParser`] compiles projection queries into [`Projection`]s.
//! Projecting a result extracts its value for each field and returns the
//! interned [`Key`] for that combination of values.
//!
//! All projections from one parser cooperate: keys named explicitly by any
//! of them are left out of `.fullname` and `.config`, and out of the
//! parser's [`residue`](ProjectionParser::residue).

use crate::error::{QueryError, QueryResult};
use crate::extract::{Claims, ClaimsSnapshot, Extractor, KeyKind};
use crate::filter::Filter;
use crate::key::Key;
use crate::query::{self, OrderSpec};
use crate::schema::{Field, Shared};
use crate::sort::{Order, OrderKind, RankTable};
use benchkit_fmt::BenchResult;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Compiles projection queries that share one set of claimed keys.
///
/// # Examples
///
/// ```rust
/// use benchkit_fmt::BenchResult;
/// use benchkit_proc::{Filter, ProjectionParser};
///
/// let mut parser = ProjectionParser::new();
/// let mut filter = Filter::match_all();
/// let mut by_os = parser.parse("goos", &mut filter).unwrap();
///
/// let mut a = BenchResult::new("Encode", 1);
/// a.set_file_config("goos", "linux");
/// let mut b = BenchResult::new("Decode", 1);
/// b.set_file_config("goos", "linux");
///
/// let ka = by_os.project(&a);
/// assert_eq!(ka, by_os.project(&b));
/// assert_eq!(ka.to_string(), "goos:linux");
/// ```
#[derive(Debug, Default)]
pub struct ProjectionParser {
    claims: Arc<RwLock<Claims>>,
}

/// A compiled field, before the schema is built.
struct Planned {
    name: String,
    kind: KeyKind,
    order: FieldOrder,
}

enum FieldOrder {
    Kind(OrderKind),
    Fixed(Vec<String>),
}

impl ProjectionParser {
    /// Create a parser with no claimed keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a projection.
    ///
    /// Fields with a fixed order also restrict `filter` to results whose
    /// value for that field is one of the listed values. `.unit` is not
    /// allowed; use [`parse_with_unit`](Self::parse_with_unit).
    pub fn parse(&mut self, query: &str, filter: &mut Filter) -> QueryResult<Projection> {
        self.compile(query, filter, false)
    }

    /// Compile a projection over individual values.
    ///
    /// A `.unit` field is appended if the query does not name one. Returns the
    /// projection and its unit field.
    pub fn parse_with_unit(
        &mut self,
        query: &str,
        filter: &mut Filter,
    ) -> QueryResult<(Projection, Field)> {
        let projection = self.compile(query, filter, true)?;
        match projection.unit_field.clone() {
            Some(unit) => Ok((projection, unit)),
            None => Err(QueryError::syntax(0, "projection has no unit field")),
        }
    }

    /// A projection of everything not claimed by this parser's projections:
    /// `.fullname` without claimed sub-benchmark keys, and `.config` without
    /// claimed configuration keys.
    ///
    /// Either field is omitted if it was itself projected.
    pub fn residue(&self) -> Projection {
        let mut planned = Vec::with_capacity(2);
        {
            let claims = self.claims.read();
            if !claims.full_name {
                planned.push(Planned {
                    name: ".fullname".to_string(),
                    kind: KeyKind::FullName,
                    order: FieldOrder::Kind(OrderKind::FirstObserved),
                });
            }
            if !claims.config_group {
                planned.push(Planned {
                    name: ".config".to_string(),
                    kind: KeyKind::ConfigGroup,
                    order: FieldOrder::Kind(OrderKind::FirstObserved),
                });
            }
        }
        Projection::build(&planned, &self.claims)
    }

    fn compile(&mut self, query: &str, filter: &mut Filter, with_unit: bool) -> QueryResult<Projection> {
        let specs = query::parse_projection(query)?;

        let mut planned = Vec::with_capacity(specs.len() + 1);
        let mut seen = HashSet::new();
        for spec in &specs {
            let kind = KeyKind::parse(&spec.key, spec.offset)?;
            if !seen.insert(kind.clone()) {
                return Err(QueryError::syntax(
                    spec.offset,
                    format!("duplicate key {:?}", spec.key),
                ));
            }
            if kind == KeyKind::Unit && !with_unit {
                return Err(QueryError::not_allowed(
                    spec.offset,
                    spec.key.as_str(),
                    ".unit is only allowed when projecting values",
                ));
            }
            let order = match &spec.order {
                None => FieldOrder::Kind(OrderKind::FirstObserved),
                Some(OrderSpec::Named { name, offset }) => match OrderKind::by_name(name) {
                    Some(kind) => FieldOrder::Kind(kind),
                    None => {
                        return Err(QueryError::syntax(
                            *offset,
                            format!("unknown order {:?}", name),
                        ))
                    }
                },
                Some(OrderSpec::Fixed { .. }) if kind == KeyKind::ConfigGroup => {
                    return Err(QueryError::not_allowed(
                        spec.offset,
                        spec.key.as_str(),
                        "fixed order not allowed on a group",
                    ))
                }
                Some(OrderSpec::Fixed { values, .. }) => FieldOrder::Fixed(values.clone()),
            };
            planned.push(Planned {
                name: spec.key.clone(),
                kind,
                order,
            });
        }
        if with_unit && !seen.contains(&KeyKind::Unit) {
            planned.push(Planned {
                name: ".unit".to_string(),
                kind: KeyKind::Unit,
                order: FieldOrder::Kind(OrderKind::FirstObserved),
            });
        }

        {
            let mut claims = self.claims.write();
            for p in &planned {
                claims.claim(&p.kind);
            }
        }

        for p in &planned {
            let FieldOrder::Fixed(values) = &p.order else {
                continue;
            };
            match &p.kind {
                KeyKind::Unit => filter.constrain_unit(values),
                kind => {
                    if let Some(extractor) = Extractor::for_kind(kind, Some(&self.claims)) {
                        filter.constrain(kind.clone(), extractor, values);
                    }
                }
            }
        }

        debug!("Compiled projection {:?} with {} fields", query, planned.len());
        Ok(Projection::build(&planned, &self.claims))
    }
}

/// The `.config` group of a projection.
struct ConfigGroup {
    id: usize,
    claims: ClaimsSnapshot,
}

/// A compiled projection.
///
/// Projections are stateful: they intern keys, learn first-observation
/// orders, and grow a leaf in `.config` for each new configuration key.
pub struct Projection {
    shared: Arc<Shared>,
    fields: Vec<Field>,
    /// Leaf slot and extractor of each single-valued field.
    extractors: Vec<(usize, Extractor)>,
    config_group: Option<ConfigGroup>,
    unit_slot: Option<usize>,
    unit_field: Option<Field>,
    /// Reused value buffer, one string per slot.
    row: Vec<String>,
    /// Interned keys by row hash.
    keys: HashMap<u64, Vec<Key>>,
}

impl Projection {
    fn build(planned: &[Planned], claims: &Arc<RwLock<Claims>>) -> Self {
        let shared = Shared::new();
        let mut top = Vec::with_capacity(planned.len());
        let mut extractors = Vec::new();
        let mut config_group = None;
        let mut unit_slot = None;
        let mut unit_id = None;
        {
            let mut schema = shared.schema.write();
            for p in planned {
                if p.kind == KeyKind::ConfigGroup {
                    let kind = match p.order {
                        FieldOrder::Kind(kind) => kind,
                        FieldOrder::Fixed(_) => OrderKind::FirstObserved,
                    };
                    let id = schema.add_group(&p.name, kind);
                    config_group = Some(ConfigGroup {
                        id,
                        claims: ClaimsSnapshot::new(claims),
                    });
                    top.push(id);
                    continue;
                }

                let order = match &p.order {
                    FieldOrder::Kind(kind) => Order::from_kind(*kind),
                    FieldOrder::Fixed(values) => Order::Fixed(RankTable::fixed(values)),
                };
                let slot = schema.slots();
                let id = schema.add_leaf(&p.name, order, None);
                top.push(id);
                if p.kind == KeyKind::Unit {
                    unit_slot = Some(slot);
                    unit_id = Some(id);
                } else if let Some(extractor) = Extractor::for_kind(&p.kind, Some(claims)) {
                    extractors.push((slot, extractor));
                }
            }
        }

        Self {
            fields: top.into_iter().map(|id| Field::new(&shared, id)).collect(),
            unit_field: unit_id.map(|id| Field::new(&shared, id)),
            shared,
            extractors,
            config_group,
            unit_slot,
            row: Vec::new(),
            keys: HashMap::new(),
        }
    }

    /// Top-level fields in projection order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Leaf fields in sort order, with `.config` expanded to its current
    /// children.
    pub fn flattened_fields(&self) -> Vec<Field> {
        Field::flattened(&self.shared)
    }

    /// The `.unit` field, for projections from
    /// [`ProjectionParser::parse_with_unit`].
    pub fn unit_field(&self) -> Option<&Field> {
        self.unit_field.as_ref()
    }

    /// Project a result to its key.
    ///
    /// The unit field, if any, is left empty.
    pub fn project(&mut self, res: &BenchResult) -> Key {
        self.fill_row(res);
        self.intern()
    }

    /// Project each value of a result to its key, in value order.
    pub fn project_values(&mut self, res: &BenchResult) -> Vec<Key> {
        self.fill_row(res);
        let mut keys = Vec::with_capacity(res.values.len());
        for value in &res.values {
            if let Some(slot) = self.unit_slot {
                let cell = &mut self.row[slot];
                cell.clear();
                cell.push_str(&value.unit);
            }
            keys.push(self.intern());
        }
        keys
    }

    fn fill_row(&mut self, res: &BenchResult) {
        let slots = self.shared.schema.read().slots();
        self.row.resize_with(slots, String::new);
        for cell in &mut self.row {
            cell.clear();
        }
        for (slot, extractor) in &self.extractors {
            self.row[*slot].push_str(&extractor.extract(res));
        }

        let Some(group) = &self.config_group else {
            return;
        };
        let claims = group.claims.get();
        for cfg in res.config() {
            if !cfg.file || cfg.value.is_empty() || claims.config.contains(&*cfg.key) {
                continue;
            }
            let slot = config_slot(&self.shared, group.id, &cfg.key);
            if slot >= self.row.len() {
                self.row.resize_with(slot + 1, String::new);
            }
            self.row[slot].push_str(&cfg.value);
        }
    }

    /// Return the key for the current row, creating it if needed.
    fn intern(&mut self) -> Key {
        let len = self
            .row
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |i| i + 1);
        let row = &self.row[..len];

        let mut hasher = DefaultHasher::new();
        row.hash(&mut hasher);
        let bucket = self.keys.entry(hasher.finish()).or_default();

        let existing = bucket.iter().find(|key| {
            let vals = key.vals();
            vals.len() == len && vals.iter().zip(row).all(|(a, b)| &**a == b.as_str())
        });
        if let Some(key) = existing {
            return key.clone();
        }

        let vals: Box<[Box<str>]> = row.iter().map(|cell| Box::from(cell.as_str())).collect();
        self.shared.schema.write().observe(&vals);
        let key = Key::new(&self.shared, vals);
        bucket.push(key.clone());
        key
    }
}

/// Slot of the `.config` leaf for `name`, adding the leaf if it is new.
fn config_slot(shared: &Arc<Shared>, group: usize, name: &str) -> usize {
    let existing = shared.schema.read().group_child_slot(group, name);
    if let Some(slot) = existing {
        return slot;
    }

    let mut schema = shared.schema.write();
    if let Some(slot) = schema.group_child_slot(group, name) {
        return slot;
    }
    let slot = schema.slots();
    let mut order = Order::from_kind(schema.group_order(group));
    // Every existing key holds the empty value in the new leaf.
    if schema.has_keys() {
        order.observe("");
    }
    schema.add_leaf(name, order, Some(group));
    debug!("Projection discovered config field {:?}", name);
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchkit_fmt::Value;

    fn result(name: &str, config: &[(&str, &str)]) -> BenchResult {
        let mut res = BenchResult::new(name, 1);
        for (k, v) in config {
            res.set_file_config(k, v);
        }
        res
    }

    fn names(fields: &[Field]) -> Vec<String> {
        fields.iter().map(|f| f.name().to_string()).collect()
    }

    // ==================== Parse tests ====================

    #[test]
    fn test_parse_fields() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let p = parser.parse(".name /size@num goos", &mut filter).unwrap();
        assert_eq!(names(p.fields()), vec![".name", "/size", "goos"]);
        assert!(p.unit_field().is_none());
    }

    #[test]
    fn test_parse_errors() {
        let mut filter = Filter::match_all();
        let cases = [
            ("goos goos", 5),
            (".unit", 0),
            ("a@bogus", 2),
            (".config@(x y)", 0),
            (".bogus", 0),
        ];
        for (query, offset) in cases {
            let mut parser = ProjectionParser::new();
            let err = parser.parse(query, &mut filter).err().unwrap();
            assert_eq!(err.offset(), offset, "query {:?}: {}", query, err);
        }
    }

    #[test]
    fn test_failed_parse_claims_nothing() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        assert!(parser.parse("goos .unit", &mut filter).is_err());
        assert!(parser.claims.read().config.is_empty());
    }

    #[test]
    fn test_parse_with_unit_appends_unit() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let (p, unit) = parser.parse_with_unit("goos", &mut filter).unwrap();
        assert_eq!(names(p.fields()), vec!["goos", ".unit"]);
        assert_eq!(&*unit.name(), ".unit");

        let (p, _) = parser.parse_with_unit(".unit goarch", &mut filter).unwrap();
        assert_eq!(names(p.fields()), vec![".unit", "goarch"]);
    }

    // ==================== Projection tests ====================

    #[test]
    fn test_project_values_per_unit() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let (mut p, unit) = parser.parse_with_unit(".name", &mut filter).unwrap();

        let mut res = result("Encode-8", &[]);
        res.values.push(Value::new(1.0, "sec/op"));
        res.values.push(Value::new(2.0, "B/op"));
        let keys = p.project_values(&res);
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert_eq!(keys[0].get(&unit), "sec/op");
        assert_eq!(keys[1].get(&unit), "B/op");
        assert_eq!(keys[0].to_string(), ".name:Encode .unit:sec/op");

        // Same values project to the same keys again.
        assert_eq!(p.project_values(&res), keys);
    }

    #[test]
    fn test_config_group_grows() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let mut p = parser.parse(".config", &mut filter).unwrap();
        assert!(p.fields()[0].is_group());
        assert!(p.flattened_fields().is_empty());

        let k1 = p.project(&result("A", &[("goos", "linux")]));
        let k2 = p.project(&result("A", &[("goos", "linux"), ("cpu", "xeon")]));
        assert_ne!(k1, k2);
        assert_eq!(names(&p.flattened_fields()), vec!["goos", "cpu"]);
        assert_eq!(names(&p.fields()[0].children()), vec!["goos", "cpu"]);

        // The first key reads the new leaf as empty and is still reused.
        let fields = p.flattened_fields();
        assert_eq!(k1.get(&fields[1]), "");
        assert_eq!(k2.get(&fields[1]), "xeon");
        assert_eq!(p.project(&result("B", &[("goos", "linux")])), k1);
    }

    #[test]
    fn test_claims_apply_across_parse_order() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let mut cfg = parser.parse(".config .fullname", &mut filter).unwrap();
        // Claimed after the first projection was parsed.
        let _ = parser.parse("goos /size", &mut filter).unwrap();

        let res = result("Encode/size=10/mode=a", &[("goos", "linux"), ("goarch", "amd64")]);
        let key = cfg.project(&res);
        assert_eq!(key.to_string(), "goarch:amd64 .fullname:Encode/mode=a");
    }

    #[test]
    fn test_fixed_order_constrains_filter() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let _ = parser.parse("goarch@(arm64 amd64)", &mut filter).unwrap();
        assert!(filter.matches(&result("A", &[("goarch", "amd64")])).all());
        assert!(!filter.matches(&result("A", &[("goarch", "386")])).any());
    }

    #[test]
    fn test_residue() {
        let mut parser = ProjectionParser::new();
        let mut filter = Filter::match_all();
        let _ = parser.parse("goos /gomaxprocs", &mut filter).unwrap();
        let mut residue = parser.residue();
        assert_eq!(names(residue.fields()), vec![".fullname", ".config"]);

        let key = residue.project(&result("Encode/size=1-8", &[("goos", "linux"), ("cpu", "xeon")]));
        assert_eq!(key.to_string(), ".fullname:Encode/size=1 cpu:xeon");

        let _ = parser.parse(".config", &mut filter).unwrap();
        assert_eq!(names(parser.residue().fields()), vec![".fullname"]);
    }

    #[test]
    fn test_keys_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Key>();
        assert_send_sync::<Field>();
    }
}
