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

//! Group benchmark results and print the mean of each group.
//!
//! ```text
//! cargo run -p benchkit-proc --example group -- \
//!     --filter '.name:Encode' --row '/size@num' --col goos old.txt new.txt
//! ```
//!
//! Set `RUST_LOG=benchkit_fmt=debug,benchkit_proc=debug` to see which files
//! are opened and which configuration fields are discovered.

use benchkit_fmt::{Files, FilesConfig, Record};
use benchkit_proc::{non_singular_fields, sort_keys, Filter, Key, KeyHeader, ProjectionParser};
use clap::Parser;
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Group benchmark results and print the mean of each group
#[derive(Parser, Debug)]
#[command(name = "group", about, long_about = None)]
struct Args {
    /// Filter query selecting the results to include
    #[arg(short, long, default_value = "")]
    filter: String,

    /// Projection giving the row of each result
    #[arg(short, long, default_value = ".fullname")]
    row: String,

    /// Projection giving the column of each value
    #[arg(short, long, default_value = "")]
    col: String,

    /// Input files, optionally as `label=path`
    #[arg(value_name = "FILES", num_args = 1.., required = true)]
    paths: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut filter = match Filter::parse(&args.filter) {
        Ok(filter) => filter,
        Err(e) => {
            error!("--filter: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut parser = ProjectionParser::new();
    let mut rows = match parser.parse(&args.row, &mut filter) {
        Ok(p) => p,
        Err(e) => {
            error!("--row: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (mut cols, _) = match parser.parse_with_unit(&args.col, &mut filter) {
        Ok(p) => p,
        Err(e) => {
            error!("--col: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut residue = parser.residue();

    let config = FilesConfig {
        allow_labels: true,
        ..FilesConfig::default()
    };
    let mut files = Files::with_config(args.paths, config);

    let mut sums: HashMap<(Key, Key), (f64, usize)> = HashMap::new();
    let mut residues: HashMap<Key, Vec<Key>> = HashMap::new();
    loop {
        let record = match files.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        let res = match record {
            Record::Result(res) => res,
            Record::SyntaxError(err) => {
                warn!("{}", err);
                continue;
            }
            Record::UnitMetadata(_) => continue,
        };
        if !filter.apply(res) {
            continue;
        }

        let row = rows.project(res);
        let rest = residue.project(res);
        let cells = residues.entry(row.clone()).or_default();
        if !cells.contains(&rest) {
            cells.push(rest);
        }
        for (col, value) in cols.project_values(res).into_iter().zip(&res.values) {
            let cell = sums.entry((row.clone(), col)).or_insert((0.0, 0));
            cell.0 += value.value;
            cell.1 += 1;
        }
    }

    for (row, rest) in &residues {
        if rest.len() > 1 {
            let fields: Vec<String> = non_singular_fields(rest)
                .iter()
                .map(|f| f.name().to_string())
                .collect();
            warn!("{}: mixes results that differ in {}", row, fields.join(", "));
        }
    }

    let mut row_keys: Vec<Key> = residues.keys().cloned().collect();
    sort_keys(&mut row_keys);
    let mut col_keys: Vec<Key> = sums.keys().map(|(_, col)| col.clone()).collect();
    sort_keys(&mut col_keys);
    col_keys.dedup();

    let header = KeyHeader::new(col_keys.clone());
    for (level, field) in header.levels.iter().enumerate() {
        let mut line = format!("{:<40}", field.name());
        print_level(&header.top, level, &mut line);
        println!("{}", line.trim_end());
    }
    for row in &row_keys {
        let mut line = format!("{:<40}", row.string_values());
        for col in &col_keys {
            match sums.get(&(row.clone(), col.clone())) {
                Some((sum, n)) => line.push_str(&format!(" {:>14.4e}", sum / *n as f64)),
                None => line.push_str(&format!(" {:>14}", "-")),
            }
        }
        println!("{}", line);
    }

    info!("{} rows, {} columns", row_keys.len(), col_keys.len());
    ExitCode::SUCCESS
}

/// Append one header cell per column for `level`, spanning its run.
fn print_level(nodes: &[benchkit_proc::KeyHeaderNode], level: usize, line: &mut String) {
    for node in nodes {
        if node.field == level {
            let width = 15 * node.len - 1;
            line.push(' ');
            line.push_str(&format!("{:^width$}", node.value, width = width));
        } else {
            print_level(&node.children, level, line);
        }
    }
}
