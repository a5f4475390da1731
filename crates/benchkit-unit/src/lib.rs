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

//! Benchmark unit handling.
//!
//! Benchmark output mixes units of very different scales (`ns/op`, `MB/s`,
//! `B/op`, ...). This crate provides the pieces the reader and the query
//! engine need to treat those uniformly:
//!
//! - [`tidy`] / [`tidy_unit`]: rescale a measurement to its canonical base
//!   unit (`ns/op` becomes `sec/op`, `MB/s` becomes `B/s`)
//! - [`parse_value`]: parse a number with an optional SI (`k`, `M`, `G`, ...)
//!   or IEC (`Ki`, `Mi`, `Gi`, ...) magnitude suffix
//! - [`Assumption`]: the statistical assumption declared for a unit through
//!   unit metadata
//!
//! # Examples
//!
//! ```rust
//! use benchkit_unit::{parse_value, tidy};
//!
//! let (value, unit) = tidy(1500.0, "ns/op");
//! assert_eq!(unit, "sec/op");
//! assert!((value - 1.5e-6).abs() < 1e-18);
//!
//! assert_eq!(parse_value("1Mi"), Some(1_048_576.0));
//! assert_eq!(parse_value("1M"), Some(1_000_000.0));
//! ```

mod assume;
mod scale;
mod tidy;

pub use assume::{Assumption, ParseAssumptionError};
pub use scale::{parse_value, split_magnitude};
pub use tidy::{tidy, tidy_unit};
