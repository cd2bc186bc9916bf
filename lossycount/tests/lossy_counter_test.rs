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

use std::collections::HashSet;

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use lossycount::error::ErrorKind;
use lossycount::lossy::Approximation;
use lossycount::lossy::Bounds;
use lossycount::lossy::CountAndError;
use lossycount::lossy::LossyCounter;
use lossycount::lossy::Threshold;

fn single_bucket_counter() -> LossyCounter<&'static str> {
    LossyCounter::builder()
        .eps(0.1)
        .flush_limit(10)
        .build()
        .unwrap()
}

const ONE_BUCKET: [&str; 10] = ["a", "a", "a", "a", "a", "b", "c", "d", "e", "f"];

#[test]
fn test_one_bucket_admits_only_frequent_item() {
    let mut counter = single_bucket_counter();
    assert_eq!(counter.bucket_width(), 10);

    counter.cache(ONE_BUCKET);

    assert_eq!(counter.bucket_id(), 1);
    assert_eq!(counter.total(), 10);
    assert_eq!(counter.cached_total(), 0);
    assert_eq!(counter.num_tracked(), 1);
    assert_eq!(counter.entry("a"), CountAndError { count: 5, error: 0 });

    let bounds = counter.bounds(["a", "b"]);
    assert_eq!(bounds["a"], Bounds { lower: 5, upper: 5 });
    assert_eq!(bounds["b"], Bounds { lower: 0, upper: 1 });
}

#[test]
fn test_empty_batch_is_a_no_op() {
    let mut counter = single_bucket_counter();
    counter.cache(Vec::<&str>::new());
    assert!(counter.is_empty());
    assert_eq!(counter.bucket_id(), 0);
    assert_eq!(counter.total(), 0);
    assert_eq!(counter.cached_total(), 0);

    counter.cache(["a", "b"]);
    counter.cache([]);
    assert_eq!(counter.cached_total(), 2);
    assert_eq!(counter.total(), 0);
}

#[test]
fn test_unknown_approximation_leaves_state_untouched() {
    let mut counter = single_bucket_counter();
    counter.cache(ONE_BUCKET);
    counter.cache(["a", "z"]);

    let err = counter.counts(["a"], "foobar").unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::UnsupportedApproximation));
    let rendered = err.to_string();
    assert_that!(rendered.as_str(), contains_substring("foobar"));

    let err = counter.frequent_items(Threshold::Epsilon, "foobar").unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::UnsupportedApproximation));

    assert_eq!(counter.bucket_id(), 1);
    assert_eq!(counter.total(), 10);
    assert_eq!(counter.cached_total(), 2);
    assert_eq!(counter.entry("a"), CountAndError { count: 5, error: 0 });
}

#[test]
fn test_counts_per_approximation() {
    let mut counter = single_bucket_counter();
    counter.cache(ONE_BUCKET);

    let lower = counter.counts(["a", "b"], Approximation::Lower).unwrap();
    let upper = counter.counts(["a", "b"], "upper").unwrap();
    let median = counter.counts(["a", "b"], String::from("median")).unwrap();

    assert_eq!(lower["a"], 5.0);
    assert_eq!(lower["b"], 0.0);
    assert_eq!(upper["a"], 5.0);
    assert_eq!(upper["b"], 1.0);
    assert_eq!(median["a"], 5.0);
    assert_eq!(median["b"], 0.5);
    assert_eq!(counter.estimate("b"), 0.5);
}

#[test]
fn test_counts_and_errors_default_for_untracked() {
    let mut counter = single_bucket_counter();
    counter.cache(ONE_BUCKET);

    let rows = counter.counts_and_errors(["a", "f", "never"]);
    assert_eq!(rows["a"], CountAndError { count: 5, error: 0 });
    assert_eq!(rows["f"], CountAndError { count: 0, error: 1 });
    assert_eq!(rows["never"], CountAndError { count: 0, error: 1 });
}

#[test]
fn test_frequent_items_threshold_forms() {
    let mut counter = single_bucket_counter();
    counter.cache(ONE_BUCKET);

    // eps * total = 1
    let by_eps = counter.frequent_items(Threshold::Epsilon, "lower").unwrap();
    assert_eq!(by_eps, vec!["a"]);
    let by_none = counter.frequent_items(None::<f64>, Approximation::Lower).unwrap();
    assert_eq!(by_none, vec!["a"]);

    // 0.5 * 10 = 5, strictly greater is required
    let relative = counter.frequent_items(0.5, Approximation::Lower).unwrap();
    assert!(relative.is_empty());
    let absolute = counter.frequent_items(4.0, Approximation::Lower).unwrap();
    assert_eq!(absolute, vec!["a"]);
    let absolute = counter.frequent_items(5u64, Approximation::Upper).unwrap();
    assert!(absolute.is_empty());
}

#[test]
fn test_count_drains_cache() {
    let mut counter = LossyCounter::builder()
        .eps(0.1)
        .flush_limit(1_000)
        .build()
        .unwrap();
    counter.count(["x", "y", "x"]);
    assert_eq!(counter.cached_total(), 0);
    assert_eq!(counter.total(), 3);
    assert_eq!(counter.entry("x"), CountAndError { count: 2, error: 0 });

    counter.count_with_chunk_size(["y", "y", "y"], 2).unwrap();
    assert_eq!(counter.total(), 6);
    assert_eq!(counter.lower_bound("y"), 4);

    let err = counter.count_with_chunk_size(["y"], 0).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::InvalidConfiguration));
    assert_eq!(counter.total(), 6);
}

#[test]
fn test_table_stays_below_prune_limit() {
    let prune_limit = 3;
    let mut counter = LossyCounter::builder()
        .eps(0.1)
        .flush_limit(10)
        .prune_limit(prune_limit)
        .build()
        .unwrap();

    let mut noise = 1_000u32;
    for i in 0..50u32 {
        let mut batch = vec![i, i, i];
        for _ in 0..7 {
            batch.push(noise);
            noise += 1;
        }
        counter.cache(batch);
        assert!((counter.num_tracked() as u64) < prune_limit);
        assert!(counter.bounds([i])[&i].contains(3));
    }
    assert_eq!(counter.bucket_id(), 50);
    assert_eq!(counter.total(), 500);
}

#[test]
fn test_heavy_hitter_survives_pruning() {
    let mut counter = LossyCounter::builder()
        .eps(0.1)
        .flush_limit(10)
        .prune_limit(2)
        .build()
        .unwrap();

    let mut noise = 1u32;
    for _ in 0..100 {
        let mut batch = vec![0u32; 4];
        for _ in 0..6 {
            batch.push(noise);
            noise += 1;
        }
        counter.cache(batch);
    }
    assert_eq!(counter.entry(&0u32), CountAndError { count: 400, error: 0 });
    let frequent: HashSet<u32> = counter
        .frequent_items(0.3, Approximation::Lower)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(frequent, HashSet::from([0]));
}

#[test]
fn test_invalid_configuration() {
    for eps in [0.0, -0.1, 1.01, f64::NAN] {
        let err = LossyCounter::<u32>::new(eps).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::InvalidConfiguration));
        let rendered = err.to_string();
        assert_that!(rendered.as_str(), contains_substring("eps"));
    }

    let err = LossyCounter::<u32>::builder()
        .eps(0.5)
        .prune_limit(0)
        .build()
        .unwrap_err();
    assert_that!(err.message(), contains_substring("prune_limit"));

    let err = LossyCounter::<u32>::builder()
        .flush_limit(0)
        .build()
        .unwrap_err();
    assert_that!(err.message(), contains_substring("flush_limit"));
}

#[test]
fn test_default_limits() {
    let counter = LossyCounter::<u32>::builder().build().unwrap();
    assert_eq!(counter.eps(), 1e-6);
    assert_eq!(counter.bucket_width(), 1_000_000);
    assert_eq!(counter.prune_limit(), 10_000_000);
    assert_eq!(counter.flush_limit(), 10_000_000);

    let counter = LossyCounter::<u32>::new(1.0).unwrap();
    assert_eq!(counter.bucket_width(), 1);
    assert_eq!(counter.prune_limit(), 10);
}
