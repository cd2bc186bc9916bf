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

//! Long-lived frequency table and the bucket clock its error bounds are measured against.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Tracked count of an item together with its error bound.
///
/// For a tracked item the true frequency lies in `[count, count + error]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CountAndError {
    /// Occurrences counted since the item was (re-)admitted.
    pub count: u64,
    /// Maximum number of occurrences that may have gone uncounted.
    pub error: u64,
}

impl CountAndError {
    /// Returns the lower bound of the true frequency.
    pub fn lower(&self) -> u64 {
        self.count
    }

    /// Returns the upper bound of the true frequency.
    pub fn upper(&self) -> u64 {
        self.count + self.error
    }

    /// Returns the midpoint between the lower and upper bounds.
    pub fn median(&self) -> f64 {
        self.count as f64 + self.error as f64 / 2.0
    }
}

/// Counts whole buckets of `width` items folded into the table so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct BucketClock {
    width: u64,
    bucket_id: u64,
}

impl BucketClock {
    pub(super) fn new(width: u64) -> Self {
        debug_assert!(width > 0, "bucket width must be positive");
        Self { width, bucket_id: 0 }
    }

    pub(super) fn width(&self) -> u64 {
        self.width
    }

    pub(super) fn bucket_id(&self) -> u64 {
        self.bucket_id
    }

    /// Number of whole buckets spanned by `items` stream items.
    pub(super) fn buckets_in(&self, items: u64) -> u64 {
        items / self.width
    }

    pub(super) fn advance(&mut self, buckets: u64) {
        self.bucket_id += buckets;
    }
}

/// Item to `(count, error)` mapping maintained across flushes.
#[derive(Debug, Clone)]
pub(super) struct FrequencyTable<K> {
    entries: HashMap<K, CountAndError>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> FrequencyTable<K> {
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn get<Q>(&self, key: &Q) -> Option<&CountAndError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (&K, &CountAndError)> {
        self.entries.iter()
    }

    /// Adds `count` to an existing entry. Returns false if `key` is not tracked,
    /// handing the key back to the caller untouched.
    pub(super) fn accumulate(&mut self, key: K, count: u64) -> Result<(), K> {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.count += count;
                Ok(())
            }
            None => Err(key),
        }
    }

    pub(super) fn admit(&mut self, key: K, count: u64, error: u64) {
        let previous = self.entries.insert(key, CountAndError { count, error });
        debug_assert!(previous.is_none(), "admitted an item that was already tracked");
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    /// Removes every entry whose upper bound does not exceed `bucket_id`.
    ///
    /// The scan collects the doomed keys first and deletes them afterwards.
    /// Returns the number of removed entries.
    pub(super) fn prune(&mut self, bucket_id: u64) -> usize {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.upper() <= bucket_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.entries.remove(key);
        }
        doomed.len()
    }
}
