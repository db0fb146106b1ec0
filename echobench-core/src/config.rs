// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! The benchmark matrix is checked before any host is started.
//! Any invalid field results in a HardValidationError that prevents the run.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::cache::{DEFAULT_CACHE_SIZE, DEFAULT_SEED};
use crate::codec::Format;
use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::host::HostKind;
use crate::payload::PayloadKind;
use crate::suite::SuiteSpec;
use crate::types::{InvocationParams, ItemCount, Port};

const MAX_ITERATIONS: usize = 1_000_000;
const MAX_CACHE_SIZE: usize = 100_000;

/// Raw benchmark settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBenchmarkSettings {
    #[serde(default = "default_base_port")]
    base_port: u16,
    #[serde(default = "default_item_counts")]
    item_counts: Vec<u32>,
    #[serde(default = "default_true")]
    send_items: bool,
    #[serde(default = "default_true")]
    receive_items: bool,
    #[serde(default = "default_warmup_iterations")]
    warmup_iterations: usize,
    #[serde(default = "default_iterations")]
    iterations: usize,
    #[serde(default = "default_cache_size")]
    cache_size: usize,
    #[serde(default = "default_seed")]
    seed: u64,
}

fn default_base_port() -> u16 {
    Port::DEFAULT_BASE.value()
}

fn default_item_counts() -> Vec<u32> {
    vec![0, 10, 100, 1000]
}

fn default_true() -> bool {
    true
}

fn default_warmup_iterations() -> usize {
    10
}

fn default_iterations() -> usize {
    100
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for RawBenchmarkSettings {
    fn default() -> Self {
        Self {
            base_port: default_base_port(),
            item_counts: default_item_counts(),
            send_items: true,
            receive_items: true,
            warmup_iterations: default_warmup_iterations(),
            iterations: default_iterations(),
            cache_size: default_cache_size(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHostEntry {
    host: String,
    format: String,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    benchmark: RawBenchmarkSettings,
    hosts: Option<Vec<RawHostEntry>>,
    payloads: Option<Vec<String>>,
}

/// Validated run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSettings {
    pub base_port: Port,
    pub item_counts: Vec<ItemCount>,
    pub send_items: bool,
    pub receive_items: bool,
    pub warmup_iterations: usize,
    pub iterations: usize,
    pub cache_size: usize,
    pub seed: u64,
}

impl BenchmarkSettings {
    /// Invocation parameters for one item count.
    pub fn params(&self, item_count: ItemCount) -> InvocationParams {
        InvocationParams::new(item_count)
            .send_items(self.send_items)
            .receive_items(self.receive_items)
    }
}

/// One host/format/payload combination with its assigned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteEntry {
    pub spec: SuiteSpec,
    pub payload: PayloadKind,
    pub port: Port,
}

/// Complete validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub benchmark: BenchmarkSettings,
    pub hosts: Vec<SuiteSpec>,
    pub payloads: Vec<PayloadKind>,
}

impl BenchConfig {
    /// Every configured suite in port order: for each host entry, for each payload.
    pub fn suites(&self) -> Vec<SuiteEntry> {
        let mut entries = Vec::with_capacity(self.suite_count());
        let mut slot = 0;
        for spec in &self.hosts {
            for payload in &self.payloads {
                // range checked during validation
                if let Ok(port) = self.benchmark.base_port.offset(slot) {
                    entries.push(SuiteEntry {
                        spec: *spec,
                        payload: *payload,
                        port,
                    });
                }
                slot += 1;
            }
        }
        entries
    }

    pub fn suite_count(&self) -> usize {
        self.hosts.len() * self.payloads.len()
    }

    /// Keep only host entries matching the given filters.
    pub fn filter_hosts(&mut self, host: Option<HostKind>, format: Option<Format>) {
        self.hosts.retain(|spec| {
            host.map_or(true, |h| spec.host == h) && format.map_or(true, |f| spec.format == f)
        });
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        let raw = RawBenchmarkSettings::default();
        Self {
            benchmark: BenchmarkSettings {
                base_port: Port::DEFAULT_BASE,
                item_counts: raw.item_counts.into_iter().map(ItemCount::new).collect(),
                send_items: raw.send_items,
                receive_items: raw.receive_items,
                warmup_iterations: raw.warmup_iterations,
                iterations: raw.iterations,
                cache_size: raw.cache_size,
                seed: raw.seed,
            },
            hosts: SuiteSpec::all(),
            payloads: PayloadKind::ALL.to_vec(),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    /// Returns HardValidationError for any invalid fields.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<BenchConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load a file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> BenchResult<BenchConfig> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(BenchConfig::default())
        }
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<BenchConfig> {
        // serde_yaml reports an empty document as an error
        if content.trim().is_empty() {
            return Self::validate(RawConfig::default());
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> BenchResult<BenchConfig> {
        let benchmark = Self::validate_settings(raw.benchmark)?;

        let hosts = match raw.hosts {
            Some(entries) => Self::validate_hosts(entries)?,
            None => SuiteSpec::all(),
        };

        let payloads = match raw.payloads {
            Some(names) => Self::validate_payloads(names)?,
            None => PayloadKind::ALL.to_vec(),
        };

        let suites = hosts.len() * payloads.len();
        if suites > 0 {
            benchmark.base_port.offset(suites - 1)?;
        }

        Ok(BenchConfig {
            benchmark,
            hosts,
            payloads,
        })
    }

    fn validate_settings(raw: RawBenchmarkSettings) -> BenchResult<BenchmarkSettings> {
        let base_port = Port::new(raw.base_port)?;

        if raw.item_counts.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "item_counts",
                value: "[]".to_string(),
                reason: "At least one item count must be given".to_string(),
            }
            .into());
        }

        if raw.iterations == 0 || raw.iterations > MAX_ITERATIONS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "iterations",
                value: raw.iterations.to_string(),
                reason: format!("Must be between 1 and {}", MAX_ITERATIONS),
            }
            .into());
        }

        if raw.cache_size == 0 || raw.cache_size > MAX_CACHE_SIZE {
            return Err(HardValidationError::InvalidFieldValue {
                field: "cache_size",
                value: raw.cache_size.to_string(),
                reason: format!("Must be between 1 and {}", MAX_CACHE_SIZE),
            }
            .into());
        }

        Ok(BenchmarkSettings {
            base_port,
            item_counts: raw.item_counts.into_iter().map(ItemCount::new).collect(),
            send_items: raw.send_items,
            receive_items: raw.receive_items,
            warmup_iterations: raw.warmup_iterations,
            iterations: raw.iterations,
            cache_size: raw.cache_size,
            seed: raw.seed,
        })
    }

    fn validate_hosts(entries: Vec<RawHostEntry>) -> BenchResult<Vec<SuiteSpec>> {
        if entries.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one host entry must be defined".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(entries.len());

        for entry in entries {
            let spec = SuiteSpec::parse(&entry.host, &entry.format)?;
            if !seen.insert(spec) {
                return Err(HardValidationError::DuplicateEntry {
                    kind: "host entry",
                    value: spec.to_string(),
                }
                .into());
            }
            specs.push(spec);
        }

        Ok(specs)
    }

    fn validate_payloads(names: Vec<String>) -> BenchResult<Vec<PayloadKind>> {
        if names.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one payload must be selected".to_string(),
            }
            .into());
        }

        let mut payloads = Vec::with_capacity(names.len());
        for name in names {
            let kind: PayloadKind = name.parse()?;
            if payloads.contains(&kind) {
                return Err(HardValidationError::DuplicateEntry {
                    kind: "payload",
                    value: name,
                }
                .into());
            }
            payloads.push(kind);
        }

        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
benchmark:
  base_port: 9100
  item_counts: [0, 10]
  send_items: false
  iterations: 50
  cache_size: 200
  seed: 7

hosts:
  - host: axum
    format: json
  - host: rpc
    format: msgpack

payloads: [small, large]
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts[0].host, HostKind::Axum);
        assert_eq!(config.hosts[1].format, Format::MessagePack);
        assert_eq!(config.benchmark.base_port.value(), 9100);
        assert!(!config.benchmark.send_items);
        assert!(config.benchmark.receive_items);
        assert_eq!(config.benchmark.cache_size, 200);
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config.benchmark.base_port.value(), 9001);
        assert_eq!(
            config.benchmark.item_counts,
            vec![0, 10, 100, 1000].into_iter().map(ItemCount::new).collect::<Vec<_>>()
        );
        assert_eq!(config.benchmark.iterations, 100);
        assert_eq!(config.benchmark.warmup_iterations, 10);
        assert_eq!(config.benchmark.cache_size, 1000);
        assert_eq!(config.hosts.len(), HostKind::ALL.len() * Format::ALL.len());
        assert_eq!(config.payloads, PayloadKind::ALL.to_vec());
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_port_allocation_order() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        let suites = config.suites();
        let ports: Vec<u16> = suites.iter().map(|s| s.port.value()).collect();
        assert_eq!(ports, vec![9100, 9101, 9102, 9103]);
        assert_eq!(suites[0].payload, PayloadKind::Small);
        assert_eq!(suites[1].payload, PayloadKind::Large);
        assert_eq!(suites[2].spec.host, HostKind::Rpc);
    }

    #[test]
    fn test_unknown_format() {
        let yaml = r#"
hosts:
  - host: axum
    format: protobuf
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(
            err,
            BenchError::HardValidation(HardValidationError::UnknownVariant { kind: "format", .. })
        ));
    }

    #[test]
    fn test_unknown_host() {
        let yaml = r#"
hosts:
  - host: actix
    format: json
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_duplicate_host_entries() {
        let yaml = r#"
hosts:
  - host: hyper
    format: xml
  - host: hyper
    format: xml
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(
            err,
            BenchError::HardValidation(HardValidationError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_empty_item_counts() {
        let yaml = r#"
benchmark:
  item_counts: []
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_invalid_port_zero() {
        let yaml = r#"
benchmark:
  base_port: 0
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_port_range_overflow() {
        // 15 host entries x 2 payloads = 30 ports
        let yaml = r#"
benchmark:
  base_port: 65520
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(
            err,
            BenchError::HardValidation(HardValidationError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_iterations_bounds() {
        assert!(ConfigLoader::load_string("benchmark:\n  iterations: 0\n").is_err());
        assert!(ConfigLoader::load_string("benchmark:\n  iterations: 2000000\n").is_err());
        assert!(ConfigLoader::load_string("benchmark:\n  cache_size: 0\n").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
benchmark:
  iteration: 5
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }

    #[test]
    fn test_filter_hosts() {
        let mut config = BenchConfig::default();
        config.filter_hosts(Some(HostKind::Axum), None);
        assert_eq!(config.hosts.len(), Format::ALL.len());
        config.filter_hosts(None, Some(Format::Xml));
        assert_eq!(config.hosts, vec![SuiteSpec::new(HostKind::Axum, Format::Xml)]);
    }

    #[test]
    fn test_load_file_missing() {
        let err = ConfigLoader::load_file("/nonexistent/echobench.yaml").unwrap_err();
        assert!(matches!(err, BenchError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echobench.yaml");
        std::fs::write(&path, VALID_CONFIG).unwrap();
        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.suite_count(), 4);

        let fallback = ConfigLoader::load_or_default(dir.path().join("missing.yaml")).unwrap();
        assert_eq!(fallback, BenchConfig::default());
    }
}
