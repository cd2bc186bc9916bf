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

//! Exact counts for the items seen since the last flush.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub(super) struct BatchCache<K> {
    counts: HashMap<K, u64>,
    total: u64,
}

impl<K> Default for BatchCache<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }
}

impl<K: Eq + Hash> BatchCache<K> {
    /// Adds every item of `batch` and returns how many items were added.
    pub(super) fn extend<I>(&mut self, batch: I) -> u64
    where
        I: IntoIterator<Item = K>,
    {
        let mut added = 0;
        for item in batch {
            *self.counts.entry(item).or_insert(0) += 1;
            added += 1;
        }
        self.total += added;
        added
    }

    /// Number of items cached since the last flush, duplicates included.
    pub(super) fn total(&self) -> u64 {
        self.total
    }

    pub(super) fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Empties the cache, handing back its counts and total.
    pub(super) fn take(&mut self) -> (HashMap<K, u64>, u64) {
        let total = std::mem::replace(&mut self.total, 0);
        (std::mem::take(&mut self.counts), total)
    }
}
