// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `echobench invoke` command - One echo call against a running host.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use tokio::runtime::Handle;

use echobench_core::{
    AnyClient, BenchConfig, BenchResult, ClientKind, ConfigLoader, EchoClient, Format,
    HardValidationError, HostKind, InvocationParams, ItemCache, LargeItem, Payload, PayloadKind,
    PooledClient, SmallItem,
};

#[derive(Args)]
pub struct InvokeArgs {
    /// Host framework (rpc, hyper, axum)
    #[arg(long)]
    pub host: HostKind,

    /// Wire format (json, simd-json, msgpack, bincode, xml)
    #[arg(long)]
    pub format: Format,

    /// Payload type (small, large)
    #[arg(long)]
    pub payload: PayloadKind,

    /// Number of items to send and request
    #[arg(long, default_value_t = 10)]
    pub item_count: u32,

    /// Host port (defaults to the port assigned in the configuration)
    #[arg(long)]
    pub port: Option<u16>,

    /// Client variant
    #[arg(long, default_value = "pooled")]
    pub client: ClientKind,

    /// Use the async transport (pooled clients only)
    #[arg(long = "async")]
    pub use_async: bool,

    /// Send an empty array instead of the first N items
    #[arg(long)]
    pub no_send: bool,

    /// Request zero items back
    #[arg(long)]
    pub no_receive: bool,
}

pub fn execute(
    config_path: &str,
    handle: &Handle,
    args: InvokeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(config_path)?;
    let port = match args.port {
        Some(port) => port,
        None => configured_port(&config, &args)?,
    };

    if args.use_async && !args.client.is_pooled() {
        return Err(format!("--async needs a pooled client, not {}", args.client).into());
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let params = InvocationParams::new(args.item_count)
        .send_items(!args.no_send)
        .receive_items(!args.no_receive);

    // same seed and size as the host so sent items match its cache
    let cache = Arc::new(ItemCache::generate(
        config.benchmark.cache_size,
        config.benchmark.seed,
    ));

    tracing::debug!(%addr, client = %args.client, ?params, "Invoking echo");

    let start = Instant::now();
    let received = match args.payload {
        PayloadKind::Small => call::<SmallItem>(handle, &args, addr, params, cache)?,
        PayloadKind::Large => call::<LargeItem>(handle, &args, addr, params, cache)?,
    };
    let elapsed = start.elapsed();

    println!("✓ {} {} {} via {}", args.host, args.format, args.payload, args.client);
    println!("  Items received: {}", received);
    println!("  Latency:        {:.3}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

fn configured_port(config: &BenchConfig, args: &InvokeArgs) -> Result<u16, HardValidationError> {
    config
        .suites()
        .into_iter()
        .find(|entry| {
            entry.spec.host == args.host
                && entry.spec.format == args.format
                && entry.payload == args.payload
        })
        .map(|entry| entry.port.value())
        .ok_or_else(|| HardValidationError::SchemaValidation {
            message: format!(
                "{}:{} {} is not configured, pass --port",
                args.host, args.format, args.payload
            ),
        })
}

/// Build, initialize and invoke one client; returns the decoded item count.
fn call<T: Payload>(
    handle: &Handle,
    args: &InvokeArgs,
    addr: SocketAddr,
    params: InvocationParams,
    cache: Arc<ItemCache>,
) -> BenchResult<usize> {
    if args.use_async {
        let mut client = PooledClient::<T>::new(
            args.host,
            args.format,
            addr,
            params,
            cache,
            args.client.is_precomputed(),
        )?;
        client.initialize()?;
        return Ok(handle.block_on(client.invoke_async())?.len());
    }

    let mut client: AnyClient<T> =
        AnyClient::new(args.client, args.host, args.format, addr, params, cache)?;
    client.initialize()?;
    Ok(client.invoke()?.len())
}
