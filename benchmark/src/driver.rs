// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Echo benchmark driver.
//!
//! For every configured item count the driver builds one suite per
//! host × format × payload entry, starts them all, measures each client
//! operation of each suite in turn and stops them again before moving on.

use std::sync::Arc;

use echobench_core::{
    AnySuite, BenchConfig, BenchResult, ClientOperation, ItemCache, ItemCount,
};
use tokio::runtime::Handle;

use crate::harness::{measure, BenchmarkHarness};
use crate::metrics::{BenchmarkReport, BenchmarkResult};

/// Drives every suite of a configuration through the harness.
pub struct EchoBenchmark {
    config: BenchConfig,
    cache: Arc<ItemCache>,
    handle: Handle,
    keep_samples: bool,
}

impl EchoBenchmark {
    /// The cache is generated here from the configured size and seed.
    pub fn new(config: BenchConfig, handle: Handle) -> Self {
        let cache = Arc::new(ItemCache::generate(
            config.benchmark.cache_size,
            config.benchmark.seed,
        ));
        Self {
            config,
            cache,
            handle,
            keep_samples: false,
        }
    }

    /// Keep raw latency samples in each result.
    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_samples = keep;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    fn harness(&self) -> BenchmarkHarness {
        BenchmarkHarness::new()
            .warmup(self.config.benchmark.warmup_iterations)
            .iterations(self.config.benchmark.iterations)
            .keep_samples(self.keep_samples)
    }

    /// Run the whole matrix. Must be called outside the runtime.
    ///
    /// `progress` sees each result as soon as it is measured. The first
    /// failing call aborts the run after the started suites are stopped.
    pub fn run<F>(&self, mut progress: F) -> BenchResult<BenchmarkReport>
    where
        F: FnMut(&BenchmarkResult),
    {
        let mut report = BenchmarkReport::new();

        for &item_count in &self.config.benchmark.item_counts {
            self.run_item_count(item_count, &mut report, &mut progress)?;
        }

        tracing::info!(results = report.results.len(), "Benchmark run complete");
        Ok(report)
    }

    fn run_item_count<F>(
        &self,
        item_count: ItemCount,
        report: &mut BenchmarkReport,
        progress: &mut F,
    ) -> BenchResult<()>
    where
        F: FnMut(&BenchmarkResult),
    {
        let params = self.config.benchmark.params(item_count);
        let mut suites: Vec<AnySuite> = self
            .config
            .suites()
            .into_iter()
            .map(|entry| {
                AnySuite::new(
                    entry.spec,
                    entry.payload,
                    entry.port.value(),
                    params,
                    self.cache.clone(),
                    self.handle.clone(),
                )
            })
            .collect();

        let (started, elapsed) = measure(|| start_all(&mut suites));
        started?;
        tracing::info!(
            item_count = %item_count,
            suites = suites.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Suites started"
        );

        let measured = self.measure_all(&mut suites, report, progress);
        let stopped = stop_all(&mut suites);
        measured?;
        stopped
    }

    fn measure_all<F>(
        &self,
        suites: &mut [AnySuite],
        report: &mut BenchmarkReport,
        progress: &mut F,
    ) -> BenchResult<()>
    where
        F: FnMut(&BenchmarkResult),
    {
        let harness = self.harness();

        for suite in suites.iter_mut() {
            let spec = suite.spec();
            let payload = suite.payload();
            let params = suite.params();

            for operation in ClientOperation::ALL {
                tracing::debug!(suite = %suite.name(), operation = %operation, "Measuring");

                let (samples, allocations) =
                    harness.try_run_tracked(|| suite.invoke(operation).map(|_| ()))?;

                let result = BenchmarkResult::echo(
                    spec.host,
                    spec.format,
                    payload,
                    operation,
                    params.into(),
                    samples,
                    harness.should_keep_samples(),
                )
                .with_allocations(allocations);

                progress(&result);
                report.add_result(result);
            }
        }

        Ok(())
    }
}

/// Start every suite; on failure stop the ones already running.
fn start_all(suites: &mut [AnySuite]) -> BenchResult<()> {
    for index in 0..suites.len() {
        if let Err(e) = suites[index].start() {
            tracing::error!(suite = %suites[index].name(), error = %e, "Failed to start suite");
            // the start failure is the error worth reporting
            let _ = stop_all(&mut suites[..index]);
            return Err(e);
        }
    }
    Ok(())
}

/// Stop every suite, returning the first failure after trying them all.
fn stop_all(suites: &mut [AnySuite]) -> BenchResult<()> {
    let mut first_error = None;
    for suite in suites.iter_mut() {
        if let Err(e) = suite.stop() {
            tracing::warn!(suite = %suite.name(), error = %e, "Suite did not stop cleanly");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echobench_core::{ConfigLoader, Format, HostKind, PayloadKind};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_small_matrix() {
        let mut config = ConfigLoader::load_string(
            r#"
benchmark:
  base_port: 39411
  item_counts: [0, 3]
  warmup_iterations: 1
  iterations: 4
  cache_size: 10
hosts:
  - host: axum
    format: json
  - host: rpc
    format: msgpack
payloads: [small, large]
"#,
        )
        .unwrap();
        config.filter_hosts(Some(HostKind::Rpc), None);

        let runtime = runtime();
        let benchmark = EchoBenchmark::new(config, runtime.handle().clone());

        let mut seen = 0;
        let report = benchmark.run(|_| seen += 1).unwrap();

        // 2 item counts x 2 payloads x 6 operations
        assert_eq!(report.results.len(), 24);
        assert_eq!(seen, 24);
        assert!(report.results.iter().all(|r| r.iterations == 4));
        assert!(report
            .results
            .iter()
            .all(|r| r.host == HostKind::Rpc && r.format == Format::MessagePack));
        assert_eq!(report.results[0].parameters.item_count, 0);
        assert_eq!(report.results[0].payload, PayloadKind::Small);
        assert_eq!(report.results[23].parameters.item_count, 3);
        assert_eq!(report.results[23].method, "PrecomputedRaw");
    }

    #[test]
    fn test_bind_failure_aborts_run() {
        let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = blocker.local_addr().unwrap().port();

        let config = ConfigLoader::load_string(&format!(
            "benchmark:\n  base_port: {}\n  item_counts: [1]\n  iterations: 1\n  cache_size: 5\nhosts:\n  - host: hyper\n    format: xml\npayloads: [small]\n",
            port
        ))
        .unwrap();

        let runtime = runtime();
        let benchmark = EchoBenchmark::new(config, runtime.handle().clone());
        assert!(benchmark.run(|_| {}).is_err());
    }
}
