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

use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::Error;
use crate::lossy::LossyCounter;

/// Default relative error bound.
pub const DEFAULT_EPS: f64 = 1e-6;

/// Multiple of the bucket width used when a limit is left unset.
pub const DEFAULT_LIMIT_FACTOR: u64 = 10;

/// Builder for creating [`LossyCounter`]s.
///
/// Setters only record values; [`build`](Self::build) validates them once and
/// resolves unset limits to `10 * ceil(1 / eps)`.
///
/// # Examples
///
/// ```
/// use lossycount::lossy::LossyCounter;
///
/// let counter = LossyCounter::<&str>::builder()
///     .eps(0.01)
///     .flush_limit(500)
///     .build()
///     .unwrap();
///
/// assert_eq!(counter.bucket_width(), 100);
/// assert_eq!(counter.flush_limit(), 500);
/// assert_eq!(counter.prune_limit(), 1000);
/// ```
#[derive(Debug)]
pub struct LossyCounterBuilder<K> {
    eps: f64,
    prune_limit: Option<u64>,
    flush_limit: Option<u64>,
    _marker: PhantomData<fn(K)>,
}

impl<K> Clone for LossyCounterBuilder<K> {
    fn clone(&self) -> Self {
        Self {
            eps: self.eps,
            prune_limit: self.prune_limit,
            flush_limit: self.flush_limit,
            _marker: PhantomData,
        }
    }
}

impl<K> Default for LossyCounterBuilder<K> {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            prune_limit: None,
            flush_limit: None,
            _marker: PhantomData,
        }
    }
}

impl<K: Eq + Hash> LossyCounterBuilder<K> {
    /// Sets the relative error bound. Must lie in `(0, 1]`.
    pub fn eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the table size at which a flush triggers pruning.
    pub fn prune_limit(mut self, prune_limit: u64) -> Self {
        self.prune_limit = Some(prune_limit);
        self
    }

    /// Sets the number of cached items at which a flush is triggered.
    pub fn flush_limit(mut self, flush_limit: u64) -> Self {
        self.flush_limit = Some(flush_limit);
        self
    }

    /// Builds the counter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::error::ErrorKind::InvalidConfiguration)
    /// if `eps` is not a number in `(0, 1]`, or if either limit is zero.
    pub fn build(self) -> Result<LossyCounter<K>, Error> {
        let width = bucket_width(self.eps)?;
        let default_limit = width.saturating_mul(DEFAULT_LIMIT_FACTOR);
        let prune_limit = resolve_limit("prune_limit", self.prune_limit, default_limit)?;
        let flush_limit = resolve_limit("flush_limit", self.flush_limit, default_limit)?;
        Ok(LossyCounter::from_parts(
            self.eps,
            width,
            prune_limit,
            flush_limit,
        ))
    }
}

/// Computes `ceil(1 / eps)` after checking `eps` is in `(0, 1]`.
fn bucket_width(eps: f64) -> Result<u64, Error> {
    if eps.is_nan() || eps <= 0.0 || eps > 1.0 {
        return Err(Error::invalid_configuration("eps must be in (0, 1]").with_context("eps", eps));
    }
    let width = (1.0 / eps).ceil();
    if width >= u64::MAX as f64 {
        return Err(Error::invalid_configuration("eps is too small").with_context("eps", eps));
    }
    Ok(width as u64)
}

fn resolve_limit(name: &'static str, limit: Option<u64>, default: u64) -> Result<u64, Error> {
    match limit {
        None => Ok(default),
        Some(0) => Err(Error::invalid_configuration(format!("{name} must be at least 1"))
            .with_context(name, 0)),
        Some(limit) => Ok(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_width_rounds_up() {
        assert_eq!(bucket_width(1.0).unwrap(), 1);
        assert_eq!(bucket_width(0.1).unwrap(), 10);
        assert_eq!(bucket_width(0.3).unwrap(), 4);
        assert_eq!(bucket_width(0.0123).unwrap(), 82);
    }

    #[test]
    fn bucket_width_rejects_out_of_range() {
        for eps in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(bucket_width(eps).is_err(), "eps {eps} accepted");
        }
    }
}
