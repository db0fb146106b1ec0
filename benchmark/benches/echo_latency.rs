// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Live echo round-trip benchmarks.
//!
//! Starts one suite per host framework on an ephemeral port and measures
//! every client operation against it at a few item counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use echobench_core::{
    AnySuite, ClientOperation, Format, HostKind, InvocationParams, ItemCache, PayloadKind,
    SuiteSpec,
};
use std::sync::Arc;
use std::time::Duration;

/// Item counts to test.
const ITEM_COUNTS: &[u32] = &[0, 10, 100];

/// Suites measured; one per host, spread over the formats.
const SUITES: &[(HostKind, Format)] = &[
    (HostKind::Rpc, Format::Bincode),
    (HostKind::Hyper, Format::MessagePack),
    (HostKind::Axum, Format::Json),
    (HostKind::Axum, Format::SimdJson),
];

fn bench_echo_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .expect("Failed to build runtime");
    let cache = Arc::new(ItemCache::generate(1000, 12345));

    for &(host, format) in SUITES {
        let spec = SuiteSpec::new(host, format);
        let mut group = c.benchmark_group(format!("echo_{}_{}", host, format));
        group.sample_size(50);
        group.measurement_time(Duration::from_secs(5));

        for &count in ITEM_COUNTS {
            let mut suite = AnySuite::new(
                spec,
                PayloadKind::Small,
                0,
                InvocationParams::new(count),
                cache.clone(),
                runtime.handle().clone(),
            );
            suite.start().expect("Failed to start suite");

            for operation in ClientOperation::ALL {
                group.bench_with_input(
                    BenchmarkId::new(operation.name(), count),
                    &operation,
                    |b, &operation| {
                        b.iter(|| suite.invoke(operation).expect("Echo call failed"));
                    },
                );
            }

            suite.stop().expect("Failed to stop suite");
        }

        group.finish();
    }
}

criterion_group!(benches, bench_echo_round_trip);
criterion_main!(benches);
