// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Standardized metrics types for benchmark results.
//!
//! This module defines the data structures used to capture and serialize
//! echo measurements: latency distributions, per-call allocations, the
//! parameters of each run and the machine it ran on.

use chrono::{DateTime, Utc};
use echobench_core::{ClientOperation, Format, HostKind, InvocationParams, PayloadKind};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

/// Latency metrics with statistical analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Minimum observed latency in nanoseconds
    pub min_ns: u64,
    /// Maximum observed latency in nanoseconds
    pub max_ns: u64,
    /// Arithmetic mean latency in nanoseconds
    pub mean_ns: f64,
    /// Median (p50) latency in nanoseconds
    pub median_ns: u64,
    /// 95th percentile latency in nanoseconds
    pub p95_ns: u64,
    /// 99th percentile latency in nanoseconds
    pub p99_ns: u64,
    /// Standard deviation in nanoseconds
    pub std_dev_ns: f64,
    /// Raw sample data (optional, downsampled when large)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
}

impl LatencyMetrics {
    /// Calculate metrics from a vector of latency samples (in nanoseconds).
    pub fn from_samples(mut samples: Vec<u64>, keep_raw: bool) -> Self {
        if samples.is_empty() {
            return Self {
                min_ns: 0,
                max_ns: 0,
                mean_ns: 0.0,
                median_ns: 0,
                p95_ns: 0,
                p99_ns: 0,
                std_dev_ns: 0.0,
                samples: None,
            };
        }

        samples.sort_unstable();
        let len = samples.len();

        let min_ns = samples[0];
        let max_ns = samples[len - 1];
        let sum: u64 = samples.iter().sum();
        let mean_ns = sum as f64 / len as f64;
        let median_ns = samples[len / 2];
        let p95_ns = samples[(len as f64 * 0.95) as usize];
        let p99_ns = samples[(len as f64 * 0.99) as usize];

        let variance: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;
        let std_dev_ns = variance.sqrt();

        let raw_samples = if keep_raw {
            if len > 10000 {
                Some(samples.iter().step_by(len / 1000).copied().collect())
            } else {
                Some(samples)
            }
        } else {
            None
        };

        Self {
            min_ns,
            max_ns,
            mean_ns,
            median_ns,
            p95_ns,
            p99_ns,
            std_dev_ns,
            samples: raw_samples,
        }
    }

    /// Format latency in human-readable form (auto-selects ns/μs/ms).
    pub fn format_latency(ns: u64) -> String {
        if ns < 1_000 {
            format!("{}ns", ns)
        } else if ns < 1_000_000 {
            format!("{:.2}μs", ns as f64 / 1_000.0)
        } else if ns < 1_000_000_000 {
            format!("{:.2}ms", ns as f64 / 1_000_000.0)
        } else {
            format!("{:.2}s", ns as f64 / 1_000_000_000.0)
        }
    }
}

/// Heap allocations attributed to one measured operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationMetrics {
    /// Mean number of allocations per call
    pub allocations_per_op: f64,
    /// Mean number of bytes allocated per call
    pub bytes_per_op: f64,
    /// Allocations over the whole measured region
    pub total_allocations: u64,
    /// Bytes allocated over the whole measured region
    pub total_bytes: u64,
}

impl AllocationMetrics {
    pub fn from_totals(allocations: u64, bytes: u64, operations: u64) -> Self {
        let per_op = |total: u64| {
            if operations == 0 {
                0.0
            } else {
                total as f64 / operations as f64
            }
        };

        Self {
            allocations_per_op: per_op(allocations),
            bytes_per_op: per_op(bytes),
            total_allocations: allocations,
            total_bytes: bytes,
        }
    }

    /// Format a byte count in human-readable form.
    pub fn format_bytes(bytes: f64) -> String {
        if bytes < 1024.0 {
            format!("{:.0} B", bytes)
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.2} KB", bytes / 1024.0)
        } else {
            format!("{:.2} MB", bytes / (1024.0 * 1024.0))
        }
    }
}

/// Echo parameters a result was measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoParameters {
    pub item_count: u32,
    pub send_items: bool,
    pub receive_items: bool,
}

impl From<InvocationParams> for EchoParameters {
    fn from(params: InvocationParams) -> Self {
        Self {
            item_count: params.item_count.value(),
            send_items: params.send_items,
            receive_items: params.receive_items,
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// One measured operation of one suite at one parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// `host/format/TypeName/Method`
    pub name: String,
    /// Client operation name
    pub method: String,
    pub host: HostKind,
    pub format: Format,
    pub payload: PayloadKind,
    pub parameters: EchoParameters,
    pub latency: LatencyMetrics,
    /// Present when heap profiling was active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocations: Option<AllocationMetrics>,
    /// Number of measured iterations
    pub iterations: u64,
}

impl BenchmarkResult {
    /// Build a result from latency samples of one operation.
    pub fn echo(
        host: HostKind,
        format: Format,
        payload: PayloadKind,
        operation: ClientOperation,
        parameters: EchoParameters,
        samples: Vec<u64>,
        keep_raw_samples: bool,
    ) -> Self {
        let iterations = samples.len() as u64;
        Self {
            name: format!("{}/{}/{}/{}", host, format, payload, operation),
            method: operation.name().to_string(),
            host,
            format,
            payload,
            parameters,
            latency: LatencyMetrics::from_samples(samples, keep_raw_samples),
            allocations: None,
            iterations,
        }
    }

    pub fn with_allocations(mut self, allocations: Option<AllocationMetrics>) -> Self {
        self.allocations = allocations;
        self
    }

    /// `host/format/TypeName`, the suite this result belongs to.
    pub fn suite(&self) -> String {
        format!("{}/{}/{}", self.host, self.format, self.payload)
    }
}

/// Complete benchmark run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Unique id of this run
    pub run_id: Uuid,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Individual benchmark results
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    /// Create a new benchmark report.
    pub fn new() -> Self {
        Self {
            benchmark_suite: "echobench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    /// Add a result to the report.
    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
