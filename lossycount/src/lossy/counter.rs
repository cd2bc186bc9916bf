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

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::batch::Batched;
use crate::batch::batched;
use crate::error::Error;
use crate::lossy::Bounds;
use crate::lossy::CountAndError;
use crate::lossy::LossyCounterBuilder;
use crate::lossy::Threshold;
use crate::lossy::ToApproximation;
use crate::lossy::cache::BatchCache;
use crate::lossy::table::BucketClock;
use crate::lossy::table::FrequencyTable;

/// Lossy Counting frequency estimator.
///
/// Items are cached exactly until `flush_limit` of them have accumulated, then
/// folded into a long-lived table under the Lossy Counting admission rule.
/// Every tracked item satisfies `count <= true count <= count + error`; an
/// untracked item is only known to occur at most `bucket_id` times.
#[derive(Debug, Clone)]
pub struct LossyCounter<K> {
    eps: f64,
    prune_limit: u64,
    flush_limit: u64,
    clock: BucketClock,
    cache: BatchCache<K>,
    table: FrequencyTable<K>,
    total: u64,
}

impl<K: Eq + Hash> LossyCounter<K> {
    /// Returns a builder with default settings.
    pub fn builder() -> LossyCounterBuilder<K> {
        LossyCounterBuilder::default()
    }

    /// Creates a counter with the given relative error bound and default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::error::ErrorKind::InvalidConfiguration)
    /// if `eps` is not in `(0, 1]`.
    pub fn new(eps: f64) -> Result<Self, Error> {
        Self::builder().eps(eps).build()
    }

    pub(super) fn from_parts(eps: f64, width: u64, prune_limit: u64, flush_limit: u64) -> Self {
        Self {
            eps,
            prune_limit,
            flush_limit,
            clock: BucketClock::new(width),
            cache: BatchCache::default(),
            table: FrequencyTable::default(),
            total: 0,
        }
    }

    /// Returns the relative error bound.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Returns the bucket width `ceil(1 / eps)`.
    pub fn bucket_width(&self) -> u64 {
        self.clock.width()
    }

    /// Returns the table size at which a flush triggers pruning.
    pub fn prune_limit(&self) -> u64 {
        self.prune_limit
    }

    /// Returns the number of cached items that triggers a flush.
    pub fn flush_limit(&self) -> u64 {
        self.flush_limit
    }

    /// Returns the number of buckets folded into the table so far.
    pub fn bucket_id(&self) -> u64 {
        self.clock.bucket_id()
    }

    /// Returns the number of items flushed so far.
    ///
    /// This is exact; items still sitting in the cache are not included.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the number of items currently cached and not yet flushed.
    pub fn cached_total(&self) -> u64 {
        self.cache.total()
    }

    /// Returns the number of items tracked in the frequency table.
    pub fn num_tracked(&self) -> usize {
        self.table.len()
    }

    /// Returns true if nothing has been tracked, flushed or cached.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty() && self.total == 0 && self.cache.total() == 0
    }

    /// Iterates over tracked items and their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&K, CountAndError)> {
        self.table.iter().map(|(key, entry)| (key, *entry))
    }

    /// Caches every item of `batch`, flushing once `flush_limit` items are cached.
    ///
    /// An empty batch leaves the counter untouched.
    pub fn cache<I>(&mut self, batch: I)
    where
        K: Clone,
        I: IntoIterator<Item = K>,
    {
        let added = self.cache.extend(batch);
        tracing::trace!(
            added,
            cached = self.cache.total(),
            distinct = self.cache.distinct(),
            "cached batch"
        );
        if self.cache.total() >= self.flush_limit {
            self.flush();
        }
    }

    /// Folds the cache into the frequency table and advances the bucket clock.
    ///
    /// With `b = floor(cached / w)`, a tracked item accumulates its cached count,
    /// an untracked item is admitted with error `bucket_id` only if its cached
    /// count exceeds `b`, and everything else is dropped. The table is pruned
    /// afterwards if it has reached `prune_limit` entries.
    pub fn flush(&mut self)
    where
        K: Clone,
    {
        let (counts, cached) = self.cache.take();
        let buckets = self.clock.buckets_in(cached);
        let error = self.clock.bucket_id();

        let (mut merged, mut admitted, mut rejected) = (0usize, 0usize, 0usize);
        for (key, count) in counts {
            match self.table.accumulate(key, count) {
                Ok(()) => merged += 1,
                Err(key) if count > buckets => {
                    self.table.admit(key, count, error);
                    admitted += 1;
                }
                Err(_) => rejected += 1,
            }
        }

        self.clock.advance(buckets);
        self.total += cached;
        tracing::debug!(
            merged,
            admitted,
            rejected,
            buckets,
            bucket_id = self.clock.bucket_id(),
            total = self.total,
            "flushed cache"
        );

        if self.table.len() as u64 >= self.prune_limit {
            self.prune();
        }
    }

    /// Drops every tracked item whose upper bound is at most `bucket_id`.
    pub fn prune(&mut self)
    where
        K: Clone,
    {
        let bucket_id = self.clock.bucket_id();
        let removed = self.table.prune(bucket_id);
        tracing::debug!(
            removed,
            remaining = self.table.len(),
            bucket_id,
            "pruned frequency table"
        );
    }

    /// Counts a whole stream in batches of `flush_limit` items.
    ///
    /// See [`count_with_chunk_size`](Self::count_with_chunk_size).
    pub fn count<I>(&mut self, items: I)
    where
        K: Clone,
        I: IntoIterator<Item = K>,
    {
        let size = usize::try_from(self.flush_limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MAX);
        for batch in Batched::new(items.into_iter(), size) {
            self.cache(batch);
        }
        self.finish();
    }

    /// Counts a whole stream in batches of `chunk_size` items.
    ///
    /// Every batch is cached, then the cache is flushed and the table pruned, so
    /// no cached counts remain once this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::error::ErrorKind::InvalidConfiguration)
    /// if `chunk_size` is zero. The counter is left untouched in that case.
    pub fn count_with_chunk_size<I>(&mut self, items: I, chunk_size: usize) -> Result<(), Error>
    where
        K: Clone,
        I: IntoIterator<Item = K>,
    {
        for batch in batched(items, chunk_size)? {
            self.cache(batch);
        }
        self.finish();
        Ok(())
    }

    /// Flushes whatever is still cached and prunes the table.
    ///
    /// Drivers that feed batches through [`cache`](Self::cache) themselves call
    /// this once the stream ends, before querying.
    pub fn finish(&mut self)
    where
        K: Clone,
    {
        self.flush();
        // a flush that reached the limit has pruned already
        if (self.table.len() as u64) < self.prune_limit {
            self.prune();
        }
    }
}

/// Read-only queries. Untracked items answer with count `0` and error `bucket_id`.
impl<K: Eq + Hash> LossyCounter<K> {
    /// Returns the tracked count and error of `key`.
    ///
    /// Untracked items yield `{ count: 0, error: bucket_id }`.
    pub fn entry<Q>(&self, key: &Q) -> CountAndError
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get(key).copied().unwrap_or(CountAndError {
            count: 0,
            error: self.clock.bucket_id(),
        })
    }

    /// Returns a frequency no greater than the true frequency of `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entry(key).lower()
    }

    /// Returns a frequency no less than the true frequency of `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entry(key).upper()
    }

    /// Returns the midpoint between the lower and upper bound of `key`.
    pub fn estimate<Q>(&self, key: &Q) -> f64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entry(key).median()
    }

    /// Returns the estimated frequency of every key under the given approximation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnsupportedApproximation`](crate::error::ErrorKind::UnsupportedApproximation)
    /// if `approx` names an unknown mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use lossycount::lossy::LossyCounter;
    ///
    /// let mut counter = LossyCounter::builder().eps(0.1).flush_limit(10).build().unwrap();
    /// counter.cache(["a", "a", "a", "a", "a", "b", "c", "d", "e", "f"]);
    ///
    /// let counts = counter.counts(["a", "b"], "upper").unwrap();
    /// assert_eq!(counts["a"], 5.0);
    /// assert_eq!(counts["b"], 1.0);
    /// assert!(counter.counts(["a"], "foobar").is_err());
    /// ```
    pub fn counts<I, A>(&self, keys: I, approx: A) -> Result<HashMap<K, f64>, Error>
    where
        I: IntoIterator<Item = K>,
        A: ToApproximation,
    {
        let approx = approx.to_approximation()?;
        Ok(keys
            .into_iter()
            .map(|key| {
                let value = approx.apply(&self.entry(&key));
                (key, value)
            })
            .collect())
    }

    /// Returns the tracked items whose estimate strictly exceeds `threshold`.
    ///
    /// A threshold below 1 is a fraction of [`total`](Self::total), anything else
    /// an occurrence count; [`Threshold::Epsilon`] uses the counter's own `eps`.
    /// Only upper-bound queries guarantee that every item more frequent than
    /// the threshold is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnsupportedApproximation`](crate::error::ErrorKind::UnsupportedApproximation)
    /// if `approx` names an unknown mode.
    pub fn frequent_items<T, A>(&self, threshold: T, approx: A) -> Result<Vec<K>, Error>
    where
        K: Clone,
        T: Into<Threshold>,
        A: ToApproximation,
    {
        let approx = approx.to_approximation()?;
        let threshold = threshold.into().resolve(self.eps, self.total);
        Ok(self
            .table
            .iter()
            .filter(|(_, entry)| approx.apply(entry) > threshold)
            .map(|(key, _)| key.clone())
            .collect())
    }

    /// Returns the tracked count and error bound of every key.
    pub fn counts_and_errors<I>(&self, keys: I) -> HashMap<K, CountAndError>
    where
        I: IntoIterator<Item = K>,
    {
        keys.into_iter()
            .map(|key| {
                let entry = self.entry(&key);
                (key, entry)
            })
            .collect()
    }

    /// Returns the lower and upper frequency bounds of every key.
    pub fn bounds<I>(&self, keys: I) -> HashMap<K, Bounds>
    where
        I: IntoIterator<Item = K>,
    {
        keys.into_iter()
            .map(|key| {
                let bounds = Bounds::from(self.entry(&key));
                (key, bounds)
            })
            .collect()
    }
}
