// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! echobench Benchmarking Framework
//!
//! Measures round-trip latency and per-call allocations of the echo
//! operation for every host framework, wire format, payload type and client
//! variant in the configured matrix.
//!
//! # Measured Operations
//!
//! Each suite contributes six operations: `Pooled`, `PooledAsync`, `Raw` and
//! their precomputed counterparts, which serialize the request once and
//! skip response decoding.
//!
//! # Data Output
//!
//! Reports are written as timestamped JSON for later analysis and as a
//! Markdown table for reading.

pub mod alloc;
pub mod driver;
pub mod harness;
pub mod metrics;
pub mod reporter;

pub use alloc::{AllocationProbe, HeapProfiler};
pub use driver::EchoBenchmark;
pub use harness::BenchmarkHarness;
pub use metrics::{
    AllocationMetrics, BenchmarkReport, BenchmarkResult, EchoParameters, LatencyMetrics,
    SystemInfo,
};
pub use reporter::{JsonReporter, MarkdownReporter, ReporterError};
