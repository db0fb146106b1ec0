// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end integration tests for echobench.
//!
//! Each test owns a multi-thread runtime for the hosts and drives the
//! blocking clients from the test thread.

use std::sync::Arc;

use echobench_core::{
    AnyClient, AnySuite, BenchError, ClientKind, ClientOperation, EchoClient, EchoSuite, Format,
    Host, HostKind, InvocationParams, ItemCache, LargeItem, PayloadKind, SmallItem, SuiteSpec,
    TransportError,
};
use tokio::runtime::Runtime;

const CACHE_SIZE: usize = 40;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn cache() -> Arc<ItemCache> {
    Arc::new(ItemCache::generate(CACHE_SIZE, 2024))
}

/// Every operation of a suite against the expected cache prefix.
fn assert_suite_round_trips(runtime: &Runtime, spec: SuiteSpec, item_count: u32) {
    let cache = cache();
    let expected = (item_count as usize).min(CACHE_SIZE);
    let mut suite: EchoSuite<SmallItem> = EchoSuite::new(
        spec,
        0,
        InvocationParams::new(item_count),
        cache.clone(),
        runtime.handle().clone(),
    );
    suite.start().expect("Failed to start suite");

    for operation in ClientOperation::ALL {
        let items = suite
            .invoke(operation)
            .unwrap_or_else(|e| panic!("{} {} failed: {}", spec, operation, e));
        if operation.is_precomputed() {
            assert!(items.is_empty(), "{} {}", spec, operation);
        } else {
            assert_eq!(items.len(), expected, "{} {}", spec, operation);
            assert_eq!(items.as_slice(), &cache.small_items()[..expected]);
        }
    }

    suite.stop().expect("Failed to stop suite");
}

#[test]
fn test_every_suite_echoes_small_items() {
    let runtime = runtime();
    for spec in SuiteSpec::all() {
        assert_suite_round_trips(&runtime, spec, 10);
    }
}

#[test]
fn test_zero_items() {
    let runtime = runtime();
    for host in HostKind::ALL {
        assert_suite_round_trips(&runtime, SuiteSpec::new(host, Format::Json), 0);
    }
}

#[test]
fn test_count_beyond_cache_is_clamped() {
    let runtime = runtime();
    for host in HostKind::ALL {
        assert_suite_round_trips(&runtime, SuiteSpec::new(host, Format::MessagePack), 5000);
    }
}

#[test]
fn test_large_items_every_format() {
    let runtime = runtime();
    let cache = cache();

    for format in Format::ALL {
        for host in [HostKind::Axum, HostKind::Rpc] {
            let mut suite: EchoSuite<LargeItem> = EchoSuite::new(
                SuiteSpec::new(host, format),
                0,
                InvocationParams::new(25),
                cache.clone(),
                runtime.handle().clone(),
            );
            suite.start().unwrap();

            let items = suite.invoke(ClientOperation::Pooled).unwrap();
            assert_eq!(items.as_slice(), &cache.large_items()[..25], "{} {}", host, format);
            let items = suite.invoke(ClientOperation::PooledAsync).unwrap();
            assert_eq!(items.len(), 25);

            suite.stop().unwrap();
        }
    }
}

#[test]
fn test_send_and_receive_flags() {
    let runtime = runtime();
    let params = InvocationParams::new(15).send_items(false).receive_items(false);

    for host in HostKind::ALL {
        let mut suite = AnySuite::new(
            SuiteSpec::new(host, Format::Bincode),
            PayloadKind::Large,
            0,
            params,
            cache(),
            runtime.handle().clone(),
        );
        suite.start().unwrap();
        assert_eq!(suite.invoke(ClientOperation::Raw).unwrap(), 0);
        assert_eq!(suite.invoke(ClientOperation::Pooled).unwrap(), 0);
        suite.stop().unwrap();
    }

    let params = InvocationParams::new(15).send_items(false);
    let mut suite = AnySuite::new(
        SuiteSpec::new(HostKind::Hyper, Format::Xml),
        PayloadKind::Small,
        0,
        params,
        cache(),
        runtime.handle().clone(),
    );
    suite.start().unwrap();
    assert_eq!(suite.invoke(ClientOperation::Raw).unwrap(), 15);
    suite.stop().unwrap();
}

#[test]
fn test_content_type_mismatch_is_415() {
    let runtime = runtime();
    let cache = cache();

    for host_kind in [HostKind::Hyper, HostKind::Axum] {
        let mut host = Host::new(host_kind, Format::Xml, cache.clone());
        let addr = runtime.block_on(host.start(0)).unwrap();

        for kind in [ClientKind::Pooled, ClientKind::Raw] {
            let mut client: AnyClient<SmallItem> = AnyClient::new(
                kind,
                host_kind,
                Format::Json,
                addr,
                InvocationParams::new(3),
                cache.clone(),
            )
            .unwrap();
            client.initialize().unwrap();

            let err = client.invoke().unwrap_err();
            assert!(
                matches!(
                    err,
                    BenchError::Transport(TransportError::Status { status: 415, .. })
                ),
                "{} {}: {}",
                host_kind,
                kind,
                err
            );
        }

        runtime.block_on(host.stop()).unwrap();
    }
}

#[test]
fn test_rpc_format_mismatch_is_a_fault() {
    let runtime = runtime();
    let cache = cache();

    let mut host = Host::new(HostKind::Rpc, Format::MessagePack, cache.clone());
    let addr = runtime.block_on(host.start(0)).unwrap();

    for kind in ClientKind::ALL {
        let mut client: AnyClient<LargeItem> = AnyClient::new(
            kind,
            HostKind::Rpc,
            Format::Bincode,
            addr,
            InvocationParams::new(1),
            cache.clone(),
        )
        .unwrap();
        client.initialize().unwrap();

        let err = client.invoke().unwrap_err();
        assert!(
            matches!(err, BenchError::Transport(TransportError::RpcFault { .. })),
            "{}: {}",
            kind,
            err
        );
    }

    // the persistent connection survives a fault
    let mut client: AnyClient<LargeItem> = AnyClient::new(
        ClientKind::Pooled,
        HostKind::Rpc,
        Format::MessagePack,
        addr,
        InvocationParams::new(2),
        cache.clone(),
    )
    .unwrap();
    client.initialize().unwrap();
    assert_eq!(client.invoke().unwrap().len(), 2);
    assert_eq!(client.invoke().unwrap().len(), 2);

    runtime.block_on(host.stop()).unwrap();
}

#[test]
fn test_precomputed_client_requires_initialize() {
    let runtime = runtime();
    let cache = cache();

    let mut host = Host::new(HostKind::Axum, Format::Json, cache.clone());
    let addr = runtime.block_on(host.start(0)).unwrap();

    let mut client: AnyClient<SmallItem> = AnyClient::new(
        ClientKind::PrecomputedRaw,
        HostKind::Axum,
        Format::Json,
        addr,
        InvocationParams::new(5),
        cache,
    )
    .unwrap();

    let err = client.invoke().unwrap_err();
    assert!(matches!(
        err,
        BenchError::Transport(TransportError::NotInitialized)
    ));

    client.initialize().unwrap();
    assert!(client.invoke().unwrap().is_empty());

    runtime.block_on(host.stop()).unwrap();
}

#[test]
fn test_restart_on_same_port() {
    let runtime = runtime();
    let mut suite = AnySuite::new(
        SuiteSpec::new(HostKind::Axum, Format::SimdJson),
        PayloadKind::Small,
        0,
        InvocationParams::new(4),
        cache(),
        runtime.handle().clone(),
    );

    let addr = suite.start().unwrap();
    assert_eq!(suite.local_addr(), Some(addr));
    assert_eq!(suite.invoke(ClientOperation::PooledAsync).unwrap(), 4);
    suite.stop().unwrap();
    assert_eq!(suite.local_addr(), None);

    let mut again = AnySuite::new(
        SuiteSpec::new(HostKind::Axum, Format::SimdJson),
        PayloadKind::Small,
        addr.port(),
        InvocationParams::new(4),
        cache(),
        runtime.handle().clone(),
    );
    assert_eq!(again.start().unwrap(), addr);
    assert_eq!(again.invoke(ClientOperation::Raw).unwrap(), 4);
    again.stop().unwrap();
}
