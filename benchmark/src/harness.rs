// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark harness for running and timing operations.
//!
//! Warmup iterations run first and are discarded; every measured iteration
//! contributes one nanosecond sample.

use std::time::{Duration, Instant};

use crate::alloc::AllocationProbe;
use crate::metrics::AllocationMetrics;

/// A benchmark harness for measuring operation latency.
pub struct BenchmarkHarness {
    /// Number of warmup iterations before measurement
    warmup_iterations: usize,
    /// Number of measurement iterations
    measurement_iterations: usize,
    /// Whether to keep raw sample data
    keep_raw_samples: bool,
}

impl BenchmarkHarness {
    /// Create a new benchmark harness with default settings.
    pub fn new() -> Self {
        Self {
            warmup_iterations: 10,
            measurement_iterations: 100,
            keep_raw_samples: false,
        }
    }

    /// Set the number of warmup iterations.
    pub fn warmup(mut self, iterations: usize) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of measurement iterations.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    /// Set whether to keep raw sample data.
    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_raw_samples = keep;
        self
    }

    pub fn measurement_iterations(&self) -> usize {
        self.measurement_iterations
    }

    /// Check if raw samples should be kept.
    pub fn should_keep_samples(&self) -> bool {
        self.keep_raw_samples
    }

    /// Run a benchmark and collect latency samples.
    ///
    /// The closure should perform a single iteration of the operation being measured.
    /// Returns a vector of latency samples in nanoseconds.
    pub fn run<F>(&self, mut operation: F) -> Vec<u64>
    where
        F: FnMut(),
    {
        for _ in 0..self.warmup_iterations {
            operation();
        }

        let mut samples = Vec::with_capacity(self.measurement_iterations);
        for _ in 0..self.measurement_iterations {
            let start = Instant::now();
            operation();
            samples.push(start.elapsed().as_nanos() as u64);
        }

        samples
    }

    /// Like [`run`](Self::run), but stops at the first failing iteration,
    /// warmup included.
    pub fn try_run<F, E>(&self, operation: F) -> Result<Vec<u64>, E>
    where
        F: FnMut() -> Result<(), E>,
    {
        self.try_run_tracked(operation).map(|(samples, _)| samples)
    }

    /// Fallible run that also reports allocations over the measured
    /// iterations when heap profiling is active.
    pub fn try_run_tracked<F, E>(
        &self,
        mut operation: F,
    ) -> Result<(Vec<u64>, Option<AllocationMetrics>), E>
    where
        F: FnMut() -> Result<(), E>,
    {
        for _ in 0..self.warmup_iterations {
            operation()?;
        }

        let mut samples = Vec::with_capacity(self.measurement_iterations);
        let probe = AllocationProbe::start();
        for _ in 0..self.measurement_iterations {
            let start = Instant::now();
            operation()?;
            samples.push(start.elapsed().as_nanos() as u64);
        }
        let allocations = probe.map(|probe| probe.finish(samples.len() as u64));

        Ok((samples, allocations))
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Measure the execution time of a closure.
pub fn measure<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    (result, elapsed)
}
