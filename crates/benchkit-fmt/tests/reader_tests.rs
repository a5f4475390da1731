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

//! Integration tests for the reader and writer.

use benchkit_fmt::{BenchResult, OwnedRecord, Reader, ReaderConfig, Record, Value, Writer};
use benchkit_unit::Assumption;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;

fn collect(input: &str) -> Vec<OwnedRecord> {
    Reader::new(Cursor::new(input), "input")
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn rewrite(input: &str) -> String {
    let mut reader = Reader::new(Cursor::new(input), "input");
    let mut writer = Writer::new(Vec::new());
    while let Some(record) = reader.next_record().unwrap() {
        writer.write(&record).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

// ==================== Basic Reading Tests ====================

#[test]
fn test_realistic_output() {
    let input = "\
goos: linux
goarch: amd64
pkg: example.com/codec
cpu: Intel(R) Xeon(R) CPU @ 2.20GHz
BenchmarkEncode/size=10-8   \t 5000000\t       234.5 ns/op\t      16 B/op\t       1 allocs/op
BenchmarkEncode/size=100-8  \t  500000\t      2345 ns/op\t     128 B/op\t       2 allocs/op
PASS
ok  \texample.com/codec\t3.210s
";
    let records = collect(input);
    assert_eq!(records.len(), 2);

    let OwnedRecord::Result(first) = &records[0] else {
        panic!("expected result");
    };
    assert_eq!(first.name.full(), "Encode/size=10-8");
    assert_eq!(first.name.base(), "Encode");
    assert_eq!(first.name.sub_value("size"), Some("10"));
    assert_eq!(first.name.procs(), Some("8"));
    assert_eq!(first.iters, 5_000_000);
    assert_eq!(first.get_config("cpu"), Some("Intel(R) Xeon(R) CPU @ 2.20GHz"));
    assert_eq!(first.config().len(), 4);

    let units: Vec<&str> = first.values.iter().map(|v| &*v.unit).collect();
    assert_eq!(units, vec!["sec/op", "B/op", "allocs/op"]);
    assert!((first.values[0].value - 234.5e-9).abs() < 1e-18);
    assert_eq!(first.values[0].orig_value(), 234.5);
    assert_eq!(first.pos(), ("input", 5));
}

#[test]
fn test_name_decomposition() {
    let records = collect("BenchmarkTest/foo=123-42 1 1 ns/op\n");
    let OwnedRecord::Result(res) = &records[0] else {
        panic!("expected result");
    };
    let (base, parts) = res.name.parts();
    assert_eq!(base, "Test");
    assert_eq!(parts, vec!["/foo=123", "-42"]);
}

#[test]
fn test_config_applies_to_following_results() {
    let input = "key: value\nBenchmarkOne 1 1 ns/op\nkey: value2\nBenchmarkOne 1 1 ns/op\n";
    let values: Vec<String> = collect(input)
        .into_iter()
        .filter_map(|r| match r {
            OwnedRecord::Result(res) => res.get_config("key").map(str::to_string),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec!["value", "value2"]);
}

#[test]
fn test_mega_byte_throughput_is_tidied() {
    let records = collect("BenchmarkCopy 10 250.5 MB/s\n");
    let OwnedRecord::Result(res) = &records[0] else {
        panic!("expected result");
    };
    assert_eq!(&*res.values[0].unit, "B/s");
    assert_eq!(res.values[0].value, 250.5e6);
    assert_eq!(res.values[0].orig_unit(), "MB/s");
}

#[test]
fn test_unit_metadata_lookup_after_reading() {
    let mut reader = Reader::new(
        Cursor::new("Unit ns/op assume=exact\nUnit B/op better=lower\n"),
        "input",
    );
    let mut facts = 0;
    while let Some(record) = reader.next_record().unwrap() {
        assert!(matches!(record, Record::UnitMetadata(_)));
        facts += 1;
    }
    assert_eq!(facts, 2);
    assert_eq!(reader.units().assumption("ns/op"), Assumption::Exact);
    assert_eq!(reader.units().assumption("sec/op"), Assumption::Exact);
    assert_eq!(reader.units().assumption("B/op"), Assumption::Nothing);
    assert_eq!(reader.units().get("B/op", "better"), Some("lower"));
}

#[test]
fn test_record_positions() {
    let mut reader = Reader::new(
        Cursor::new("\nUnit x/op a=1\nBenchmarkA 1\nBenchmarkA 1 2 x/op\nBenchmarkB q\n"),
        "pos.txt",
    );
    let mut positions = Vec::new();
    while let Some(record) = reader.next_record().unwrap() {
        let (file, line) = record.pos();
        positions.push((file.to_string(), line));
    }
    assert_eq!(
        positions,
        vec![
            ("pos.txt".to_string(), 2),
            ("pos.txt".to_string(), 3),
            ("pos.txt".to_string(), 4),
            ("pos.txt".to_string(), 5),
        ]
    );
}

#[test]
fn test_tiny_buffer_and_intern_table() {
    let config = ReaderConfig {
        buffer_size: 8,
        intern_capacity: 2,
    };
    let mut input = String::new();
    for i in 0..50 {
        input.push_str(&format!("k{}: v\nBenchmarkX 1 {} u{}/op\n", i, i, i));
    }
    let mut reader = Reader::with_config(Cursor::new(input), "input", config);
    let mut count = 0;
    while let Some(record) = reader.next_record().unwrap() {
        let res = record.as_result().unwrap();
        assert_eq!(res.config().len(), count + 1);
        assert_eq!(res.values[0].orig_unit(), format!("u{}/op", count));
        count += 1;
    }
    assert_eq!(count, 50);
}

// ==================== Round-trip Tests ====================

#[test]
fn test_round_trip_is_byte_identical() {
    let input = "\
Unit ns/op assume=nothing
Unit B/op assume=exact

goos: linux
goarch: amd64

BenchmarkEncode/size=10-8\t1000\t1234 ns/op\t16 B/op
BenchmarkEncode/size=100-8\t100\t12034 ns/op\t128 B/op

goarch:
commit: abc123

BenchmarkDecode-8\t5000\t2.5 ns/op
";
    assert_eq!(rewrite(input), input);
}

#[test]
fn test_rewrite_normalizes_spacing() {
    let input = "goos: linux\nBenchmarkX   10   5 ns/op\n";
    assert_eq!(rewrite(input), "goos: linux\n\nBenchmarkX\t10\t5 ns/op\n");
}

#[test]
fn test_rewrite_drops_noise() {
    let input = "PASS\nBenchmarkX 1 1 ns/op\nok pkg 1s\n";
    assert_eq!(rewrite(input), "BenchmarkX\t1\t1 ns/op\n");
}

fn result_strategy() -> impl Strategy<Value = (String, u64, Vec<(u32, usize)>, BTreeMap<String, String>)> {
    (
        "[A-Za-z0-9_/=-]{0,20}",
        1u64..1_000_000,
        prop::collection::vec((0u32..1_000_000, 0usize..4), 1..4),
        prop::collection::btree_map("[a-z][a-z0-9_.-]{0,6}", "[A-Za-z0-9_]{1,8}", 0..4),
    )
}

const UNITS: [&str; 4] = ["ns/op", "B/op", "allocs/op", "MB/s"];

proptest! {
    #[test]
    fn prop_written_results_read_back(results in prop::collection::vec(result_strategy(), 1..8)) {
        let mut writer = Writer::new(Vec::new());
        for (name, iters, values, config) in &results {
            let mut res = BenchResult::new(name.as_str(), *iters);
            for (key, value) in config {
                res.set_file_config(key, value);
            }
            for &(v, unit) in values {
                res.values.push(Value::tidied(f64::from(v), UNITS[unit]));
            }
            writer.write_result(&res).unwrap();
        }
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let read: Vec<BenchResult> = collect(&text)
            .into_iter()
            .map(|r| match r {
                OwnedRecord::Result(res) => res,
                other => panic!("unexpected record {:?}", other),
            })
            .collect();
        prop_assert_eq!(read.len(), results.len());

        for (res, (name, iters, values, config)) in read.iter().zip(&results) {
            prop_assert_eq!(res.name.full(), name.as_str());
            prop_assert_eq!(res.iters, *iters);
            let got: Vec<(f64, &str)> = res.values.iter().map(|v| (v.orig_value(), v.orig_unit())).collect();
            let want: Vec<(f64, &str)> = values.iter().map(|&(v, u)| (f64::from(v), UNITS[u])).collect();
            prop_assert_eq!(got, want);
            let got_config: BTreeMap<String, String> = res
                .config()
                .iter()
                .map(|c| (c.key.to_string(), c.value.clone()))
                .collect();
            prop_assert_eq!(&got_config, config);
        }
    }
}
