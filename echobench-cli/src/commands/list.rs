// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `echobench list` command - List configured suites and their ports.

use echobench_core::ConfigLoader;

pub fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(config_path)?;
    let suites = config.suites();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                     CONFIGURED SUITES                      ║");
    println!("╠════════════╦═════════════╦══════════════════╦══════════════╣");
    println!("║ Host       ║ Format      ║ Payload          ║ Port         ║");
    println!("╠════════════╬═════════════╬══════════════════╬══════════════╣");

    for entry in &suites {
        println!(
            "║ {:<10} ║ {:<11} ║ {:<16} ║ {:<12} ║",
            entry.spec.host,
            entry.spec.format,
            entry.payload,
            entry.port.value()
        );
    }

    println!("╚════════════╩═════════════╩══════════════════╩══════════════╝");
    println!();
    println!("Total: {} suite(s)", suites.len());

    Ok(())
}
