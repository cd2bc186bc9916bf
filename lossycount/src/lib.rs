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

//! # Lossy Counting in Rust
//!
//! Approximate frequency counts over data streams in bounded memory.
//!
//! [`LossyCounter`](lossy::LossyCounter) reports, for any item, an interval
//! `[lower, upper]` that is guaranteed to contain the item's true frequency,
//! while keeping only `O(1 / eps)` entries regardless of stream length. Items
//! more frequent than `eps` of the stream are never lost.
//!
//! ```rust
//! use lossycount::lossy::LossyCounter;
//!
//! let mut counter = LossyCounter::builder().eps(0.1).flush_limit(10).build().unwrap();
//! counter.cache(["a", "a", "a", "a", "a", "b", "c", "d", "e", "f"]);
//!
//! assert_eq!(counter.bucket_id(), 1);
//! assert_eq!(counter.lower_bound("a"), 5);
//! assert_eq!(counter.upper_bound("b"), 1);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod batch;
pub mod error;
pub mod lossy;
