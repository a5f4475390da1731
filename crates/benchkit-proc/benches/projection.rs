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

//! Filter and projection benchmarks.

use benchkit_fmt::{BenchResult, OwnedRecord, Reader};
use benchkit_proc::{sort_keys, Filter, ProjectionParser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write as _;
use std::io::Cursor;

/// Parsed results for `lines` benchmark lines spread over a few
/// configurations.
fn generate_results(lines: usize) -> Vec<BenchResult> {
    let mut input = String::new();
    for i in 0..lines {
        if i % 50 == 0 {
            let _ = writeln!(input, "goos: {}", ["linux", "darwin", "windows"][i / 50 % 3]);
            let _ = writeln!(input, "commit: {:08x}", i / 50);
        }
        let _ = writeln!(
            input,
            "BenchmarkEncode/size={}/mode={}-8\t{}\t{} ns/op\t{} B/op",
            1 << (i % 12),
            ["fast", "slow"][i % 2],
            1000 + i,
            1234 + i % 91,
            16 * (i % 5),
        );
    }
    Reader::new(Cursor::new(input), "bench")
        .filter_map(|record| match record {
            Ok(OwnedRecord::Result(res)) => Some(res),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Filter Benchmarks
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let results = generate_results(1_000);
    group.throughput(Throughput::Elements(results.len() as u64));

    for query in [
        "goos:linux",
        "goos:linux .unit:sec/op",
        ".name:/^Enc/ -(/mode:slow OR /size:(1 OR 2))",
    ] {
        let filter = Filter::parse(query).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(query), &results, |b, results| {
            b.iter(|| {
                results
                    .iter()
                    .filter(|res| filter.matches(black_box(res)).any())
                    .count()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Projection Benchmarks
// ============================================================================

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    let results = generate_results(1_000);
    group.throughput(Throughput::Elements(results.len() as u64));

    for query in ["goos", "/size@num /mode", ".config"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &results, |b, results| {
            b.iter(|| {
                let mut parser = ProjectionParser::new();
                let mut filter = Filter::match_all();
                let mut projection = parser.parse(query, &mut filter).unwrap();
                let mut keys: Vec<_> = results.iter().map(|res| projection.project(res)).collect();
                keys.dedup();
                keys.len()
            })
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let results = generate_results(5_000);
    let mut parser = ProjectionParser::new();
    let mut filter = Filter::match_all();
    let (mut projection, _) = parser
        .parse_with_unit("goos /size@num /mode", &mut filter)
        .unwrap();
    let keys: Vec<_> = results
        .iter()
        .flat_map(|res| projection.project_values(res))
        .collect();

    c.bench_function("sort_keys_10000", |b| {
        b.iter(|| {
            let mut keys = keys.clone();
            sort_keys(black_box(&mut keys));
            keys.len()
        })
    });
}

criterion_group!(benches, bench_filter, bench_project, bench_sort);
criterion_main!(benches);
