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

//! Slicing an arbitrary stream into fixed-size batches.
//!
//! [`LossyCounter::cache`](crate::lossy::LossyCounter::cache) accepts any finite
//! batch; this adapter is one way to produce such batches from a long or
//! unbounded iterator without materializing it.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use crate::error::Error;

/// Iterator adapter yielding `Vec`s of at most `size` items.
///
/// Every batch is full except possibly the last one. No empty batch is yielded.
#[derive(Debug, Clone)]
pub struct Batched<I> {
    iter: I,
    size: NonZeroUsize,
}

impl<I: Iterator> Batched<I> {
    /// Wraps `iter` into batches of `size` items.
    pub fn new(iter: I, size: NonZeroUsize) -> Self {
        Self { iter, size }
    }

    /// Returns the configured batch size.
    pub fn size(&self) -> usize {
        self.size.get()
    }
}

impl<I: Iterator> Iterator for Batched<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let (lower, _) = self.iter.size_hint();
        let mut batch = Vec::with_capacity(lower.min(self.size.get()));
        batch.extend(self.iter.by_ref().take(self.size.get()));
        if batch.is_empty() { None } else { Some(batch) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.size.get();
        let (lower, upper) = self.iter.size_hint();
        (lower.div_ceil(size), upper.map(|upper| upper.div_ceil(size)))
    }
}

impl<I: FusedIterator> FusedIterator for Batched<I> {}

/// Splits `items` into batches of `size` items.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidConfiguration`](crate::error::ErrorKind::InvalidConfiguration)
/// if `size` is zero.
///
/// # Examples
///
/// ```
/// use lossycount::batch::batched;
///
/// let batches: Vec<Vec<u32>> = batched(1..=7, 3).unwrap().collect();
/// assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
/// ```
pub fn batched<T>(items: T, size: usize) -> Result<Batched<T::IntoIter>, Error>
where
    T: IntoIterator,
{
    let size = NonZeroUsize::new(size).ok_or_else(|| {
        Error::invalid_configuration("batch size must be at least 1").with_context("size", size)
    })?;
    Ok(Batched::new(items.into_iter(), size))
}
