// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Echo clients.
//!
//! Four client variants exist per host, built from the same inputs (format,
//! bound address, [`InvocationParams`], cache):
//!
//! | Kind                 | HTTP hosts                     | RPC host                      |
//! |----------------------|--------------------------------|-------------------------------|
//! | `pooled`             | reqwest connection pool        | one persistent connection     |
//! | `raw`                | HTTP/1.1 over a fresh socket   | fresh connection per call     |
//! | `precomputed-pooled` | pooled, body encoded once      | pooled, frame encoded once    |
//! | `precomputed-raw`    | raw, body encoded once         | raw, frame encoded once       |
//!
//! Precomputed variants drain the response and return an empty list.

mod pooled;
mod raw;
mod rpc;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cache::ItemCache;
use crate::codec::{Codec, Format};
use crate::error::{BenchResult, CodecError, HardValidationError, TransportError};
use crate::frame::RequestHeader;
use crate::host::HostKind;
use crate::payload::Payload;
use crate::types::InvocationParams;

pub use pooled::PooledHttpClient;
pub use raw::RawHttpClient;
pub use rpc::{PooledRpcClient, RawRpcClient};

/// Client variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientKind {
    Pooled,
    Raw,
    PrecomputedPooled,
    PrecomputedRaw,
}

impl ClientKind {
    pub const ALL: [ClientKind; 4] = [
        ClientKind::Pooled,
        ClientKind::Raw,
        ClientKind::PrecomputedPooled,
        ClientKind::PrecomputedRaw,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ClientKind::Pooled => "pooled",
            ClientKind::Raw => "raw",
            ClientKind::PrecomputedPooled => "precomputed-pooled",
            ClientKind::PrecomputedRaw => "precomputed-raw",
        }
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, ClientKind::PrecomputedPooled | ClientKind::PrecomputedRaw)
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self, ClientKind::Pooled | ClientKind::PrecomputedPooled)
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for ClientKind {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == lowered)
            .ok_or_else(|| HardValidationError::UnknownVariant {
                kind: "client",
                value: s.to_string(),
                expected: Self::ALL.map(|k| k.tag()).join(", "),
            })
    }
}

/// A blocking echo client.
pub trait EchoClient<T: Payload> {
    /// One-time setup. Must run before the first [`invoke`](Self::invoke).
    fn initialize(&mut self) -> BenchResult<()>;

    /// One round trip. Precomputed clients return an empty list.
    fn invoke(&mut self) -> BenchResult<Vec<T>>;
}

/// Request body production shared by every client.
struct RequestPlan<T: Payload> {
    codec: Arc<dyn Codec<T>>,
    cache: Arc<ItemCache>,
    params: InvocationParams,
    rpc_header: Option<RequestHeader>,
    precompute: bool,
    precomputed: Option<Bytes>,
}

impl<T: Payload> RequestPlan<T> {
    fn new(format: Format, params: InvocationParams, cache: Arc<ItemCache>, precompute: bool) -> Self {
        Self {
            codec: format.codec(),
            cache,
            params,
            rpc_header: None,
            precompute,
            precomputed: None,
        }
    }

    /// Prefix every request with an RPC header.
    fn framed(mut self) -> Self {
        self.rpc_header = Some(RequestHeader {
            format: self.codec.format(),
            payload: T::KIND,
            item_count: self.params.items_to_request(),
        });
        self
    }

    fn format(&self) -> Format {
        self.codec.format()
    }

    fn params(&self) -> InvocationParams {
        self.params
    }

    fn initialize(&mut self) -> Result<(), CodecError> {
        if self.precompute {
            self.precomputed = Some(self.encode()?);
        }
        Ok(())
    }

    fn encode(&self) -> Result<Bytes, CodecError> {
        let items = self.cache.take::<T>(self.params.items_to_send());
        let body = self.codec.serialize(items)?;
        Ok(match &self.rpc_header {
            Some(header) => header.encode(&body),
            None => Bytes::from(body),
        })
    }

    /// Bytes to put on the wire for the next call.
    fn body(&self) -> BenchResult<Bytes> {
        if self.precompute {
            return self
                .precomputed
                .clone()
                .ok_or_else(|| TransportError::NotInitialized.into());
        }
        Ok(self.encode()?)
    }

    fn decode(&self, bytes: &[u8]) -> BenchResult<Vec<T>> {
        if self.precompute {
            return Ok(Vec::new());
        }
        Ok(self.codec.deserialize(bytes)?)
    }
}

/// Client reusing its connection between calls.
pub enum PooledClient<T: Payload> {
    Http(PooledHttpClient<T>),
    Rpc(PooledRpcClient<T>),
}

impl<T: Payload> PooledClient<T> {
    pub fn new(
        host: HostKind,
        format: Format,
        addr: SocketAddr,
        params: InvocationParams,
        cache: Arc<ItemCache>,
        precomputed: bool,
    ) -> BenchResult<Self> {
        let plan = RequestPlan::new(format, params, cache, precomputed);
        Ok(if host.is_http() {
            PooledClient::Http(PooledHttpClient::new(addr, plan)?)
        } else {
            PooledClient::Rpc(PooledRpcClient::new(addr, plan.framed()))
        })
    }

    /// One round trip on the async transport.
    pub async fn invoke_async(&mut self) -> BenchResult<Vec<T>> {
        match self {
            PooledClient::Http(client) => client.invoke_async().await,
            PooledClient::Rpc(client) => client.invoke_async().await,
        }
    }
}

impl<T: Payload> EchoClient<T> for PooledClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        match self {
            PooledClient::Http(client) => client.initialize(),
            PooledClient::Rpc(client) => client.initialize(),
        }
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        match self {
            PooledClient::Http(client) => client.invoke(),
            PooledClient::Rpc(client) => client.invoke(),
        }
    }
}

/// Client opening a fresh connection for every call.
pub enum RawClient<T: Payload> {
    Http(RawHttpClient<T>),
    Rpc(RawRpcClient<T>),
}

impl<T: Payload> RawClient<T> {
    pub fn new(
        host: HostKind,
        format: Format,
        addr: SocketAddr,
        params: InvocationParams,
        cache: Arc<ItemCache>,
        precomputed: bool,
    ) -> Self {
        let plan = RequestPlan::new(format, params, cache, precomputed);
        if host.is_http() {
            RawClient::Http(RawHttpClient::new(addr, plan))
        } else {
            RawClient::Rpc(RawRpcClient::new(addr, plan.framed()))
        }
    }
}

impl<T: Payload> EchoClient<T> for RawClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        match self {
            RawClient::Http(client) => client.initialize(),
            RawClient::Rpc(client) => client.initialize(),
        }
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        match self {
            RawClient::Http(client) => client.invoke(),
            RawClient::Rpc(client) => client.invoke(),
        }
    }
}

/// Any client variant, picked at runtime.
pub enum AnyClient<T: Payload> {
    Pooled(PooledClient<T>),
    Raw(RawClient<T>),
}

impl<T: Payload> AnyClient<T> {
    pub fn new(
        kind: ClientKind,
        host: HostKind,
        format: Format,
        addr: SocketAddr,
        params: InvocationParams,
        cache: Arc<ItemCache>,
    ) -> BenchResult<Self> {
        let precomputed = kind.is_precomputed();
        Ok(if kind.is_pooled() {
            AnyClient::Pooled(PooledClient::new(host, format, addr, params, cache, precomputed)?)
        } else {
            AnyClient::Raw(RawClient::new(host, format, addr, params, cache, precomputed))
        })
    }
}

impl<T: Payload> EchoClient<T> for AnyClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        match self {
            AnyClient::Pooled(client) => client.initialize(),
            AnyClient::Raw(client) => client.initialize(),
        }
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        match self {
            AnyClient::Pooled(client) => client.invoke(),
            AnyClient::Raw(client) => client.invoke(),
        }
    }
}
