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

//! Statistical assumptions attached to units.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The assumption downstream statistics may make about a unit's samples.
///
/// Declared in benchmark output with `Unit <unit> assume=<assumption>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Assumption {
    /// No assumption; samples are treated as noisy measurements.
    #[default]
    Nothing,
    /// Samples are exact (e.g. allocation counts) and never vary.
    Exact,
}

impl Assumption {
    /// The spelling used in unit metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an `assume=` value is not recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assumption {0:?}")]
pub struct ParseAssumptionError(pub String);

impl FromStr for Assumption {
    type Err = ParseAssumptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "nothing" => Ok(Self::Nothing),
            "exact" => Ok(Self::Exact),
            other => Err(ParseAssumptionError(other.to_string())),
        }
    }
}
