// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! echobench CLI
//!
//! Command-line interface for starting echo hosts and issuing single calls.

use clap::{Parser, Subcommand};

mod commands;
mod metrics;

/// echobench - Echo service benchmarks across host frameworks and wire formats
#[derive(Parser)]
#[command(name = "echobench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = "echobench.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start every configured host
    Up {
        /// Keep serving until Ctrl+C
        #[arg(short, long)]
        foreground: bool,

        /// Serve Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Issue one echo call against a running host
    Invoke(commands::invoke::InvokeArgs),

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },

    /// List the configured host x format x payload matrix
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Up {
            foreground,
            metrics_port,
        } => runtime.block_on(commands::up::execute(&cli.config, foreground, metrics_port)),
        Commands::Invoke(args) => commands::invoke::execute(&cli.config, runtime.handle(), args),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::List => commands::list::execute(&cli.config),
    }
}
