// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec throughput benchmarks.
//!
//! Serializes and deserializes arrays of cached items in every wire format,
//! without any transport in the way.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use echobench_core::{Codec, Format, ItemCache, ItemCount, LargeItem, Payload, SmallItem};
use std::time::Duration;

/// Array lengths to benchmark.
const ITEM_COUNTS: &[u32] = &[10, 100, 1000];

fn bench_payload<T: Payload>(c: &mut Criterion, cache: &ItemCache) {
    let mut group = c.benchmark_group(format!("codec_{}", T::TYPE_NAME));
    group.measurement_time(Duration::from_secs(5));

    for format in Format::ALL {
        let codec = format.codec::<T>();

        for &count in ITEM_COUNTS {
            let items = cache.take::<T>(ItemCount::new(count));
            let encoded = codec.serialize(items).expect("Failed to serialize");
            group.throughput(Throughput::Bytes(encoded.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("{}/serialize", format), count),
                &items,
                |b, items| b.iter(|| codec.serialize(black_box(items)).expect("serialize")),
            );

            group.bench_with_input(
                BenchmarkId::new(format!("{}/deserialize", format), count),
                &encoded,
                |b, encoded| b.iter(|| codec.deserialize(black_box(encoded)).expect("deserialize")),
            );
        }
    }

    group.finish();
}

fn bench_small_items(c: &mut Criterion) {
    let cache = ItemCache::generate(1000, 12345);
    bench_payload::<SmallItem>(c, &cache);
}

fn bench_large_items(c: &mut Criterion) {
    let cache = ItemCache::generate(1000, 12345);
    bench_payload::<LargeItem>(c, &cache);
}

criterion_group!(benches, bench_small_items, bench_large_items);
criterion_main!(benches);
