// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Suite dispatch.
//!
//! A suite is one host plus its four clients for one payload type. Suites are
//! picked by name (`axum:json`) and dispatched through exhaustive matches on
//! [`HostKind`], [`Format`] and [`PayloadKind`].
//!
//! Suites own no runtime. They block on a [`Handle`] for every host and async
//! client call, so they must be driven from a thread outside any async
//! context.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::cache::ItemCache;
use crate::client::{EchoClient, PooledClient, RawClient};
use crate::codec::Format;
use crate::error::{BenchResult, HardValidationError, TransportError};
use crate::host::{Host, HostKind};
use crate::payload::{LargeItem, Payload, PayloadKind, SmallItem};
use crate::types::InvocationParams;

/// Host framework and wire format of one suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SuiteSpec {
    pub host: HostKind,
    pub format: Format,
}

impl SuiteSpec {
    pub fn new(host: HostKind, format: Format) -> Self {
        Self { host, format }
    }

    /// Build from a host name and a format name.
    pub fn parse(host: &str, format: &str) -> Result<Self, HardValidationError> {
        Ok(Self {
            host: host.parse()?,
            format: format.parse()?,
        })
    }

    /// Every host crossed with every format.
    pub fn all() -> Vec<Self> {
        HostKind::ALL
            .into_iter()
            .flat_map(|host| Format::ALL.into_iter().map(move |format| Self::new(host, format)))
            .collect()
    }
}

impl fmt::Display for SuiteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.format)
    }
}

impl FromStr for SuiteSpec {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, format) =
            s.split_once(':')
                .ok_or_else(|| HardValidationError::InvalidFieldValue {
                    field: "suite",
                    value: s.to_string(),
                    reason: "Expected <host>:<format>".to_string(),
                })?;
        Self::parse(host, format)
    }
}

/// The six measured operations of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientOperation {
    Pooled,
    PooledAsync,
    Raw,
    PrecomputedPooled,
    PrecomputedPooledAsync,
    PrecomputedRaw,
}

impl ClientOperation {
    pub const ALL: [ClientOperation; 6] = [
        ClientOperation::Pooled,
        ClientOperation::PooledAsync,
        ClientOperation::Raw,
        ClientOperation::PrecomputedPooled,
        ClientOperation::PrecomputedPooledAsync,
        ClientOperation::PrecomputedRaw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClientOperation::Pooled => "Pooled",
            ClientOperation::PooledAsync => "PooledAsync",
            ClientOperation::Raw => "Raw",
            ClientOperation::PrecomputedPooled => "PrecomputedPooled",
            ClientOperation::PrecomputedPooledAsync => "PrecomputedPooledAsync",
            ClientOperation::PrecomputedRaw => "PrecomputedRaw",
        }
    }

    /// Whether the response is decoded or drained.
    pub fn is_precomputed(&self) -> bool {
        matches!(
            self,
            ClientOperation::PrecomputedPooled
                | ClientOperation::PrecomputedPooledAsync
                | ClientOperation::PrecomputedRaw
        )
    }
}

impl fmt::Display for ClientOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

struct SuiteClients<T: Payload> {
    pooled: PooledClient<T>,
    raw: RawClient<T>,
    precomputed_pooled: PooledClient<T>,
    precomputed_raw: RawClient<T>,
}

/// One host and its clients for payload type `T`.
pub struct EchoSuite<T: Payload> {
    spec: SuiteSpec,
    port: u16,
    params: InvocationParams,
    cache: Arc<ItemCache>,
    handle: Handle,
    host: Host,
    clients: Option<SuiteClients<T>>,
}

impl<T: Payload> EchoSuite<T> {
    pub fn new(
        spec: SuiteSpec,
        port: u16,
        params: InvocationParams,
        cache: Arc<ItemCache>,
        handle: Handle,
    ) -> Self {
        let host = Host::new(spec.host, spec.format, cache.clone());
        Self {
            spec,
            port,
            params,
            cache,
            handle,
            host,
            clients: None,
        }
    }

    pub fn spec(&self) -> SuiteSpec {
        self.spec
    }

    pub fn params(&self) -> InvocationParams {
        self.params
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.host.local_addr()
    }

    /// Start the host, then build and initialize the four clients.
    pub fn start(&mut self) -> BenchResult<SocketAddr> {
        let addr = self.handle.block_on(self.host.start(self.port))?;

        let SuiteSpec { host, format } = self.spec;
        let mut clients = SuiteClients {
            pooled: PooledClient::new(host, format, addr, self.params, self.cache.clone(), false)?,
            raw: RawClient::new(host, format, addr, self.params, self.cache.clone(), false),
            precomputed_pooled: PooledClient::new(
                host,
                format,
                addr,
                self.params,
                self.cache.clone(),
                true,
            )?,
            precomputed_raw: RawClient::new(host, format, addr, self.params, self.cache.clone(), true),
        };

        clients.pooled.initialize()?;
        clients.raw.initialize()?;
        clients.precomputed_pooled.initialize()?;
        clients.precomputed_raw.initialize()?;

        tracing::debug!(suite = %self.spec, payload = T::TYPE_NAME, %addr, "Suite started");
        self.clients = Some(clients);
        Ok(addr)
    }

    /// Drop the clients and stop the host.
    pub fn stop(&mut self) -> BenchResult<()> {
        self.clients = None;
        self.handle.block_on(self.host.stop())?;
        Ok(())
    }

    /// Issue one call through the given client operation.
    pub fn invoke(&mut self, operation: ClientOperation) -> BenchResult<Vec<T>> {
        let clients = self
            .clients
            .as_mut()
            .ok_or(TransportError::NotInitialized)?;

        match operation {
            ClientOperation::Pooled => clients.pooled.invoke(),
            ClientOperation::PooledAsync => self.handle.block_on(clients.pooled.invoke_async()),
            ClientOperation::Raw => clients.raw.invoke(),
            ClientOperation::PrecomputedPooled => clients.precomputed_pooled.invoke(),
            ClientOperation::PrecomputedPooledAsync => {
                self.handle.block_on(clients.precomputed_pooled.invoke_async())
            }
            ClientOperation::PrecomputedRaw => clients.precomputed_raw.invoke(),
        }
    }
}

/// A suite of either payload type.
pub enum AnySuite {
    Small(EchoSuite<SmallItem>),
    Large(EchoSuite<LargeItem>),
}

impl AnySuite {
    pub fn new(
        spec: SuiteSpec,
        payload: PayloadKind,
        port: u16,
        params: InvocationParams,
        cache: Arc<ItemCache>,
        handle: Handle,
    ) -> Self {
        match payload {
            PayloadKind::Small => {
                AnySuite::Small(EchoSuite::new(spec, port, params, cache, handle))
            }
            PayloadKind::Large => {
                AnySuite::Large(EchoSuite::new(spec, port, params, cache, handle))
            }
        }
    }

    pub fn spec(&self) -> SuiteSpec {
        match self {
            AnySuite::Small(suite) => suite.spec(),
            AnySuite::Large(suite) => suite.spec(),
        }
    }

    pub fn payload(&self) -> PayloadKind {
        match self {
            AnySuite::Small(_) => PayloadKind::Small,
            AnySuite::Large(_) => PayloadKind::Large,
        }
    }

    pub fn params(&self) -> InvocationParams {
        match self {
            AnySuite::Small(suite) => suite.params(),
            AnySuite::Large(suite) => suite.params(),
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            AnySuite::Small(suite) => suite.local_addr(),
            AnySuite::Large(suite) => suite.local_addr(),
        }
    }

    /// `host/format/TypeName`, used to label results.
    pub fn name(&self) -> String {
        let spec = self.spec();
        format!("{}/{}/{}", spec.host, spec.format, self.payload())
    }

    pub fn start(&mut self) -> BenchResult<SocketAddr> {
        match self {
            AnySuite::Small(suite) => suite.start(),
            AnySuite::Large(suite) => suite.start(),
        }
    }

    pub fn stop(&mut self) -> BenchResult<()> {
        match self {
            AnySuite::Small(suite) => suite.stop(),
            AnySuite::Large(suite) => suite.stop(),
        }
    }

    /// Issue one call and return how many items were decoded.
    pub fn invoke(&mut self, operation: ClientOperation) -> BenchResult<usize> {
        match self {
            AnySuite::Small(suite) => suite.invoke(operation).map(|items| items.len()),
            AnySuite::Large(suite) => suite.invoke(operation).map(|items| items.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_spec_parse() {
        let spec: SuiteSpec = "axum:simd-json".parse().unwrap();
        assert_eq!(spec, SuiteSpec::new(HostKind::Axum, Format::SimdJson));
        assert_eq!(spec.to_string(), "axum:simd-json");

        assert!("axum".parse::<SuiteSpec>().is_err());
        assert!("wcf:json".parse::<SuiteSpec>().is_err());
        assert!(SuiteSpec::parse("rpc", "yaml").is_err());
    }

    #[test]
    fn test_all_specs() {
        let all = SuiteSpec::all();
        assert_eq!(all.len(), 15);
        assert_eq!(all[0], SuiteSpec::new(HostKind::Rpc, Format::Json));
        assert_eq!(all[14], SuiteSpec::new(HostKind::Axum, Format::Xml));
    }

    #[test]
    fn test_operation_names() {
        let names: Vec<_> = ClientOperation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(
            names,
            vec![
                "Pooled",
                "PooledAsync",
                "Raw",
                "PrecomputedPooled",
                "PrecomputedPooledAsync",
                "PrecomputedRaw"
            ]
        );
        assert_eq!(
            ClientOperation::ALL
                .iter()
                .filter(|op| op.is_precomputed())
                .count(),
            3
        );
    }

    #[test]
    fn test_invoke_before_start() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let cache = Arc::new(ItemCache::generate(2, 1));
        let mut suite = AnySuite::new(
            SuiteSpec::new(HostKind::Rpc, Format::Json),
            PayloadKind::Small,
            0,
            InvocationParams::new(1),
            cache,
            runtime.handle().clone(),
        );
        assert!(suite.invoke(ClientOperation::Pooled).is_err());
        assert_eq!(suite.name(), "rpc/json/SmallItem");
    }
}
