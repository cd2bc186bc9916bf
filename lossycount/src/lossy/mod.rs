// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Lossy Counting for approximate item frequencies over data streams.
//!
//! This module implements Lossy Counting (Manku & Motwani, VLDB 2002) with a
//! batching front end. Incoming items are counted exactly in a cache; once
//! `flush_limit` items have accumulated the cache is folded into a frequency
//! table, admitting only items that clear the current bucket-width bar, and the
//! table is pruned whenever it reaches `prune_limit` entries.
//!
//! For every item the counter reports an interval that contains its true
//! frequency, and the interval never widens beyond `eps * N` for a stream of
//! `N` items.
//!
//! # Usage
//!
//! ```rust
//! # use lossycount::lossy::Approximation;
//! # use lossycount::lossy::LossyCounter;
//! let mut counter = LossyCounter::new(0.01).unwrap();
//! counter.count("the quick brown fox jumps over the lazy dog".split(' '));
//!
//! let bounds = counter.bounds(["the"]);
//! assert!(bounds["the"].contains(2));
//!
//! let frequent = counter.frequent_items(0.1, Approximation::Upper).unwrap();
//! assert!(frequent.contains(&"the"));
//! ```
//!
//! # Configuration
//!
//! ```rust
//! # use lossycount::lossy::LossyCounter;
//! let counter = LossyCounter::<u64>::builder()
//!     .eps(0.001)
//!     .prune_limit(5_000)
//!     .build()
//!     .unwrap();
//! assert_eq!(counter.flush_limit(), 10_000);
//! ```

mod builder;
mod cache;
mod counter;
mod query;
mod table;

pub use self::builder::DEFAULT_EPS;
pub use self::builder::DEFAULT_LIMIT_FACTOR;
pub use self::builder::LossyCounterBuilder;
pub use self::counter::LossyCounter;
pub use self::query::Approximation;
pub use self::query::Bounds;
pub use self::query::Threshold;
pub use self::query::ToApproximation;
pub use self::table::CountAndError;
