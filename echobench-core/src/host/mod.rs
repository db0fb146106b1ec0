// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Service hosts.
//!
//! A host binds one TCP port and serves the echo operation for every payload
//! type in a single wire format. Three host frameworks are wrapped:
//!
//! - `rpc`: length-delimited frames over TCP ([`crate::frame`])
//! - `hyper`: hyper 1.x connections driven by a hand-routed `service_fn`
//! - `axum`: an axum router with a format-checking body extractor

mod operation;
mod router;
mod rpc;
mod service;

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::cache::ItemCache;
use crate::codec::Format;
use crate::error::{HardValidationError, HostError};

pub use operation::{item_count_from_query, route_payload, EchoState, OperationError};
pub use router::router;

/// Largest HTTP request body the hosts accept.
pub const MAX_REQUEST_BODY_BYTES: usize = 180_000_000;

/// Host frameworks under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// Legacy RPC binding over framed TCP
    Rpc,
    /// First-generation REST framework
    Hyper,
    /// Modern REST framework
    Axum,
}

impl HostKind {
    pub const ALL: [HostKind; 3] = [HostKind::Rpc, HostKind::Hyper, HostKind::Axum];

    pub fn tag(&self) -> &'static str {
        match self {
            HostKind::Rpc => "rpc",
            HostKind::Hyper => "hyper",
            HostKind::Axum => "axum",
        }
    }

    /// Whether this host speaks HTTP.
    pub fn is_http(&self) -> bool {
        !matches!(self, HostKind::Rpc)
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for HostKind {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == lowered)
            .ok_or_else(|| HardValidationError::UnknownVariant {
                kind: "host",
                value: s.to_string(),
                expected: Self::ALL.map(|k| k.tag()).join(", "),
            })
    }
}

struct RunningHost {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// One echo service bound to one port.
pub struct Host {
    kind: HostKind,
    format: Format,
    cache: Arc<ItemCache>,
    running: Option<RunningHost>,
}

impl Host {
    pub fn new(kind: HostKind, format: Format, cache: Arc<ItemCache>) -> Self {
        Self {
            kind,
            format,
            cache,
            running: None,
        }
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Bind `127.0.0.1:port` and start serving. Port 0 picks an ephemeral port.
    pub async fn start(&mut self, port: u16) -> Result<SocketAddr, HostError> {
        self.start_on(SocketAddr::from((Ipv4Addr::LOCALHOST, port)))
            .await
    }

    /// Bind `addr` and start serving in a background task.
    pub async fn start_on(&mut self, addr: SocketAddr) -> Result<SocketAddr, HostError> {
        if let Some(running) = &self.running {
            return Err(HostError::AlreadyRunning { addr: running.addr });
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HostError::Bind { addr, source })?;
        let bound = listener
            .local_addr()
            .map_err(|source| HostError::Bind { addr, source })?;

        let state = Arc::new(EchoState::new(self.kind, self.format, self.cache.clone()));
        let (shutdown, signal) = oneshot::channel();

        let task = match self.kind {
            HostKind::Rpc => tokio::spawn(rpc::serve(listener, state, signal)),
            HostKind::Hyper => tokio::spawn(service::serve(listener, state, signal)),
            HostKind::Axum => tokio::spawn(router::serve(listener, state, signal)),
        };

        tracing::info!(host = %self.kind, format = %self.format, addr = %bound, "Host started");

        self.running = Some(RunningHost {
            addr: bound,
            shutdown,
            task,
        });
        Ok(bound)
    }

    /// Signal shutdown and wait for the serve task. No-op when stopped.
    pub async fn stop(&mut self) -> Result<(), HostError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        // the serve task may already be gone, in which case the join reports why
        let _ = running.shutdown.send(());

        match running.task.await {
            Ok(Ok(())) => {
                tracing::info!(host = %self.kind, format = %self.format, addr = %running.addr, "Host stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(HostError::Join {
                reason: e.to_string(),
            }),
            Err(e) => Err(HostError::Join {
                reason: e.to_string(),
            }),
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_kind_parse() {
        assert_eq!("axum".parse::<HostKind>().unwrap(), HostKind::Axum);
        assert_eq!("RPC".parse::<HostKind>().unwrap(), HostKind::Rpc);
        let err = "actix".parse::<HostKind>().unwrap_err();
        assert!(err.to_string().contains("rpc, hyper, axum"));
    }

    #[test]
    fn test_http_hosts() {
        assert!(HostKind::Axum.is_http());
        assert!(HostKind::Hyper.is_http());
        assert!(!HostKind::Rpc.is_http());
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let cache = Arc::new(ItemCache::generate(5, 1));
        for kind in HostKind::ALL {
            let mut host = Host::new(kind, Format::Json, cache.clone());
            assert!(host.local_addr().is_none());

            let addr = host.start(0).await.unwrap();
            assert_ne!(addr.port(), 0);
            assert_eq!(host.local_addr(), Some(addr));

            let err = host.start(0).await.unwrap_err();
            assert!(matches!(err, HostError::AlreadyRunning { .. }));

            host.stop().await.unwrap();
            assert!(!host.is_running());
            // stopping twice is fine
            host.stop().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let cache = Arc::new(ItemCache::generate(1, 1));
        let mut first = Host::new(HostKind::Rpc, Format::Json, cache.clone());
        let addr = first.start(0).await.unwrap();

        let mut second = Host::new(HostKind::Axum, Format::Json, cache);
        let err = second.start(addr.port()).await.unwrap_err();
        assert!(matches!(err, HostError::Bind { .. }));

        first.stop().await.unwrap();
    }
}
