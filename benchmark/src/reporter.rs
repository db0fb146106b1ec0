// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report generation for benchmark results.
//!
//! JSON files keep every measurement for later analysis; the Markdown
//! rendering is a per-suite summary table.

use crate::metrics::{AllocationMetrics, BenchmarkReport, LatencyMetrics};
use chrono::Utc;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn report_stem() -> String {
    format!("echo_{}", Utc::now().format("%Y-%m-%dT%H-%M-%SZ"))
}

/// JSON reporter for benchmark results.
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a benchmark report to a timestamped JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let filepath = self.output_dir.join(format!("{}.json", report_stem()));

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// List all existing benchmark files in the output directory.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load an existing benchmark report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport, ReporterError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// Markdown summary tables, one per suite.
pub struct MarkdownReporter {
    output_dir: PathBuf,
}

impl MarkdownReporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Render the report. Suites appear in the order they were first measured.
    pub fn render(report: &BenchmarkReport) -> String {
        let mut out = String::new();
        let info = &report.system_info;

        // writing into a String cannot fail
        let _ = writeln!(out, "# echobench results");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Run `{}` at {} on {} ({} cores, {} {})",
            report.run_id,
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            info.cpu_model,
            info.cpu_cores,
            info.os,
            info.os_version
        );

        let mut suites: Vec<String> = Vec::new();
        for result in &report.results {
            let suite = result.suite();
            if !suites.contains(&suite) {
                suites.push(suite);
            }
        }

        for suite in &suites {
            let _ = writeln!(out);
            let _ = writeln!(out, "## {}", suite);
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "| Method | ItemCount | SendItems | ReceiveItems | Mean | P95 | Allocated |"
            );
            let _ = writeln!(out, "|---|---:|---|---|---:|---:|---:|");

            for result in report.results.iter().filter(|r| &r.suite() == suite) {
                let allocated = result
                    .allocations
                    .as_ref()
                    .map(|a| AllocationMetrics::format_bytes(a.bytes_per_op))
                    .unwrap_or_else(|| "-".to_string());

                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    result.method,
                    result.parameters.item_count,
                    result.parameters.send_items,
                    result.parameters.receive_items,
                    LatencyMetrics::format_latency(result.latency.mean_ns as u64),
                    LatencyMetrics::format_latency(result.latency.p95_ns),
                    allocated
                );
            }
        }

        out
    }

    /// Write the rendered report next to the JSON output.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let filepath = self.output_dir.join(format!("{}.md", report_stem()));
        fs::write(&filepath, Self::render(report))?;
        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{BenchmarkResult, EchoParameters};
    use echobench_core::{ClientOperation, Format, HostKind, PayloadKind};
    use tempfile::TempDir;

    fn sample_report() -> BenchmarkReport {
        let params = EchoParameters {
            item_count: 10,
            send_items: true,
            receive_items: false,
        };

        let mut report = BenchmarkReport::new();
        for operation in [ClientOperation::Pooled, ClientOperation::Raw] {
            report.add_result(BenchmarkResult::echo(
                HostKind::Rpc,
                Format::Bincode,
                PayloadKind::Large,
                operation,
                params,
                vec![1_000, 2_000, 3_000],
                false,
            ));
        }
        report.add_result(
            BenchmarkResult::echo(
                HostKind::Hyper,
                Format::Json,
                PayloadKind::Small,
                ClientOperation::PooledAsync,
                params,
                vec![500],
                false,
            )
            .with_allocations(Some(AllocationMetrics::from_totals(10, 4096, 2))),
        );
        report
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let report = sample_report();
        let path = reporter.save(&report).unwrap();
        assert!(path.exists());
        assert_eq!(reporter.list_reports().unwrap(), vec![path.clone()]);

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.results.len(), 3);
        assert_eq!(loaded.results[0].name, "rpc/bincode/LargeItem/Pooled");
    }

    #[test]
    fn test_markdown_tables() {
        let rendered = MarkdownReporter::render(&sample_report());

        assert!(rendered.contains("## rpc/bincode/LargeItem"));
        assert!(rendered.contains("## hyper/json/SmallItem"));
        assert!(rendered
            .contains("| Method | ItemCount | SendItems | ReceiveItems | Mean | P95 | Allocated |"));
        assert!(rendered.contains("| Pooled | 10 | true | false | 2.00μs | 3.00μs | - |"));
        assert!(rendered.contains("| PooledAsync | 10 | true | false | 500ns | 500ns | 2.00 KB |"));
        assert_eq!(rendered.matches("## ").count(), 2);
    }

    #[test]
    fn test_markdown_save() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = MarkdownReporter::new(temp_dir.path().join("md")).unwrap();
        let path = reporter.save(&sample_report()).unwrap();
        assert_eq!(path.extension().unwrap(), "md");
        assert!(fs::read_to_string(path).unwrap().starts_with("# echobench results"));
    }
}
