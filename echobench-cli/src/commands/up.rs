// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `echobench up` command - Start every configured host.
//!
//! One host is bound per configured suite so each payload type has the port
//! `echobench list` reports for it.

use std::sync::Arc;

use echobench_core::{ConfigLoader, Host, ItemCache};

use crate::metrics;

pub async fn execute(
    config_path: &str,
    foreground: bool,
    metrics_port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(config = %config_path, foreground = %foreground, "Starting hosts");

    // Load and validate configuration - fail fast on invalid config
    let config = ConfigLoader::load_or_default(config_path)?;
    let suites = config.suites();

    tracing::info!(suites = suites.len(), "Configuration validated successfully");

    let cache = Arc::new(ItemCache::generate(
        config.benchmark.cache_size,
        config.benchmark.seed,
    ));

    if let Some(port) = metrics_port {
        metrics::start_metrics_server(port).await?;
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                      ECHOBENCH HOSTS                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut hosts = Vec::with_capacity(suites.len());
    for entry in &suites {
        let mut host = Host::new(entry.spec.host, entry.spec.format, cache.clone());
        match host.start(entry.port.value()).await {
            Ok(addr) => {
                let endpoint = if entry.spec.host.is_http() {
                    format!("http://{}/api/operation/{}", addr, entry.payload)
                } else {
                    format!("tcp://{}", addr)
                };
                println!(
                    "  ● {:<6} {:<9} {:<10} → {}",
                    entry.spec.host, entry.spec.format, entry.payload, endpoint
                );
                hosts.push(host);
            }
            Err(e) => {
                println!(
                    "  ✗ {:<6} {:<9} {:<10} failed: {}",
                    entry.spec.host, entry.spec.format, entry.payload, e
                );
                tracing::error!(suite = %entry.spec, port = %entry.port, error = %e, "Failed to start host");
            }
        }
    }

    println!();
    println!("Status: {} of {} hosts running", hosts.len(), suites.len());

    if foreground {
        println!();
        println!("Press Ctrl+C to stop...");
        println!();

        // Wait for shutdown signal
        tokio::signal::ctrl_c().await?;

        println!();
        println!("Shutting down...");
    } else {
        println!("Hosts bound successfully; run with --foreground to keep them serving.");
    }

    for host in &mut hosts {
        if let Err(e) = host.stop().await {
            tracing::warn!(host = %host.kind(), format = %host.format(), error = %e, "Host did not stop cleanly");
        }
    }

    tracing::info!("All hosts stopped");
    Ok(())
}
