// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to run the echo benchmarks and generate reports.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use echobench_benchmark::{
    AllocationMetrics, BenchmarkReport, EchoBenchmark, HeapProfiler, JsonReporter,
    LatencyMetrics, MarkdownReporter,
};
use echobench_core::{ConfigLoader, Format, HostKind, ItemCount};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser)]
#[command(name = "run_benchmarks")]
#[command(about = "Run echobench latency benchmarks and generate JSON and Markdown reports")]
struct Args {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "echobench.yaml")]
    config: PathBuf,

    /// Output directory for benchmark data
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Measured iterations per operation (overrides the configuration)
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Item count to measure; repeat for several (overrides the configuration)
    #[arg(long = "item-count")]
    item_counts: Vec<u32>,

    /// Only run suites of this host framework
    #[arg(long)]
    host: Option<HostKind>,

    /// Only run suites of this wire format
    #[arg(long)]
    format: Option<Format>,

    /// Run in quick mode (fewer iterations)
    #[arg(long)]
    quick: bool,

    /// Keep raw latency samples in the JSON report
    #[arg(long)]
    keep_samples: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut config = ConfigLoader::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if let Some(iterations) = args.iterations {
        config.benchmark.iterations = iterations;
    }
    if args.quick {
        config.benchmark.iterations = config.benchmark.iterations.min(10);
        config.benchmark.warmup_iterations = config.benchmark.warmup_iterations.min(2);
    }
    if !args.item_counts.is_empty() {
        config.benchmark.item_counts = args
            .item_counts
            .iter()
            .copied()
            .map(ItemCount::new)
            .collect();
    }
    if config.benchmark.iterations == 0 {
        bail!("--iterations must be at least 1");
    }

    config.filter_hosts(args.host, args.format);
    if config.hosts.is_empty() {
        bail!("No configured suites match the --host/--format filters");
    }

    let counts: Vec<String> = config
        .benchmark
        .item_counts
        .iter()
        .map(|count| count.to_string())
        .collect();

    println!("echobench Benchmark Suite");
    println!("=========================");
    println!("Output directory: {:?}", args.output);
    println!("Suites: {}", config.suite_count());
    println!("Item counts: {}", counts.join(", "));
    println!(
        "Iterations: {} (+{} warmup)",
        config.benchmark.iterations, config.benchmark.warmup_iterations
    );
    println!();

    let json = JsonReporter::new(&args.output)?;
    let markdown = MarkdownReporter::new(&args.output)?;
    let _profiler = HeapProfiler::start(args.output.join("dhat-heap.json"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let benchmark =
        EchoBenchmark::new(config, runtime.handle().clone()).keep_samples(args.keep_samples);
    let report = benchmark.run(|result| {
        println!(
            "  ✓ {} (k={}) mean={}",
            result.name,
            result.parameters.item_count,
            LatencyMetrics::format_latency(result.latency.mean_ns as u64)
        );
    })?;

    let json_path = json.save(&report)?;
    let markdown_path = markdown.save(&report)?;
    println!();
    println!("Benchmark report saved to: {:?}", json_path);
    println!("Summary table saved to:    {:?}", markdown_path);
    println!();

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &BenchmarkReport) {
    println!("Summary");
    println!("-------");
    println!();

    for result in &report.results {
        let allocated = result
            .allocations
            .as_ref()
            .map(|a| format!(", allocated={}", AllocationMetrics::format_bytes(a.bytes_per_op)))
            .unwrap_or_default();

        println!(
            "{} (k={}): median={}, p95={}{}",
            result.name,
            result.parameters.item_count,
            LatencyMetrics::format_latency(result.latency.median_ns),
            LatencyMetrics::format_latency(result.latency.p95_ns),
            allocated
        );
    }
}
