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

//! Command-line front end: counts whitespace-separated tokens and reports the
//! frequent ones together with their frequency bounds.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lossycount::batch::batched;
use lossycount::lossy::Approximation;
use lossycount::lossy::DEFAULT_EPS;
use lossycount::lossy::LossyCounter;
use lossycount::lossy::Threshold;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lossycount")]
#[command(about = "Approximate token frequencies with Lossy Counting")]
#[command(version)]
struct Command {
    /// Relative error bound, in (0, 1].
    #[arg(long, default_value_t = DEFAULT_EPS)]
    eps: f64,

    /// Table size that triggers pruning [default: 10 * ceil(1 / eps)].
    #[arg(long)]
    prune_limit: Option<u64>,

    /// Cached item count that triggers a flush [default: 10 * ceil(1 / eps)].
    #[arg(long)]
    flush_limit: Option<u64>,

    /// Tokens handed to the counter per batch [default: flush limit].
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Report threshold: a fraction below 1, an absolute count, or "eps".
    #[arg(long, default_value = "eps")]
    threshold: Threshold,

    /// Estimate compared against the threshold: lower, upper or median.
    #[arg(long, default_value = "upper")]
    approx: Approximation,

    /// Log flush and prune activity to stderr.
    #[arg(long, short)]
    verbose: bool,

    /// Input files; stdin when none are given.
    inputs: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cmd = Command::parse();
    init_tracing(cmd.verbose);

    let mut builder = LossyCounter::<String>::builder().eps(cmd.eps);
    if let Some(prune_limit) = cmd.prune_limit {
        builder = builder.prune_limit(prune_limit);
    }
    if let Some(flush_limit) = cmd.flush_limit {
        builder = builder.flush_limit(flush_limit);
    }
    let mut counter = builder.build().context("invalid counter configuration")?;
    let chunk_size = match cmd.chunk_size {
        Some(chunk_size) => chunk_size,
        None => usize::try_from(counter.flush_limit()).unwrap_or(usize::MAX),
    };

    if cmd.inputs.is_empty() {
        count_reader(&mut counter, io::stdin().lock(), chunk_size)
            .context("failed to read stdin")?;
    } else {
        for path in &cmd.inputs {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            count_reader(&mut counter, BufReader::new(file), chunk_size)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
    }
    counter.finish();

    tracing::info!(
        total = counter.total(),
        tracked = counter.num_tracked(),
        bucket_id = counter.bucket_id(),
        "counting finished"
    );

    let mut items = counter.frequent_items(cmd.threshold, cmd.approx)?;
    items.sort_unstable();
    let bounds = counter.bounds(items.iter().cloned());

    let mut out = io::stdout().lock();
    writeln!(out, "# total={} tracked={}", counter.total(), counter.num_tracked())?;
    for item in &items {
        let b = bounds[item];
        writeln!(out, "{item}\t{}\t{}", b.lower, b.upper)?;
    }
    Ok(())
}

fn count_reader<R: BufRead>(
    counter: &mut LossyCounter<String>,
    reader: R,
    chunk_size: usize,
) -> anyhow::Result<()> {
    let tokens = reader.lines().flat_map(|line| match line {
        Ok(line) => line
            .split_whitespace()
            .map(|token| Ok(token.to_string()))
            .collect::<Vec<_>>(),
        Err(err) => vec![Err(err)],
    });
    for batch in batched(tokens, chunk_size)? {
        let batch = batch.into_iter().collect::<io::Result<Vec<String>>>()?;
        counter.cache(batch);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
