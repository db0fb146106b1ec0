// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `echobench validate` command - Validate configuration file.

use echobench_core::ConfigLoader;

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            let settings = &config.benchmark;
            let counts: Vec<String> = settings
                .item_counts
                .iter()
                .map(|count| count.to_string())
                .collect();

            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  Base Port:          {}", settings.base_port);
            println!("  Item Counts:        {}", counts.join(", "));
            println!("  Send Items:         {}", settings.send_items);
            println!("  Receive Items:      {}", settings.receive_items);
            println!(
                "  Iterations:         {} (+{} warmup)",
                settings.iterations, settings.warmup_iterations
            );
            println!(
                "  Cache:              {} items (seed {})",
                settings.cache_size, settings.seed
            );
            println!();
            println!("Hosts ({}):", config.hosts.len());
            for spec in &config.hosts {
                println!("  - {}", spec);
            }
            println!();
            println!("Payloads ({}):", config.payloads.len());
            for payload in &config.payloads {
                println!("  - {}", payload);
            }
            println!();
            println!("Total suites: {}", config.suite_count());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
