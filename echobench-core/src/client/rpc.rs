// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! RPC clients speaking the framed protocol of [`crate::frame`].

use std::net::{SocketAddr, TcpStream as StdTcpStream};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::error::{BenchResult, TransportError};
use crate::frame;
use crate::payload::Payload;

use super::{EchoClient, RequestPlan};

fn connect_blocking(addr: SocketAddr) -> Result<StdTcpStream, TransportError> {
    let stream =
        StdTcpStream::connect(addr).map_err(|e| TransportError::io("connecting to host", e))?;
    stream
        .set_nodelay(true)
        .map_err(|e| TransportError::io("configuring socket", e))?;
    Ok(stream)
}

async fn connect_async(
    addr: SocketAddr,
) -> Result<Framed<TcpStream, LengthDelimitedCodec>, TransportError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| TransportError::io("connecting to host", e))?;
    stream
        .set_nodelay(true)
        .map_err(|e| TransportError::io("configuring socket", e))?;
    Ok(Framed::new(stream, frame::length_codec()))
}

fn round_trip(stream: &mut StdTcpStream, request: &[u8]) -> Result<Vec<u8>, TransportError> {
    frame::write_frame(stream, request).map_err(|e| TransportError::io("writing request", e))?;
    frame::read_frame(stream).map_err(|e| TransportError::io("reading response", e))
}

/// One persistent connection per transport. The blocking socket is opened in
/// `initialize`, the async one on the first async call.
pub struct PooledRpcClient<T: Payload> {
    addr: SocketAddr,
    plan: RequestPlan<T>,
    blocking: Option<StdTcpStream>,
    framed: Option<Framed<TcpStream, LengthDelimitedCodec>>,
}

impl<T: Payload> PooledRpcClient<T> {
    pub(super) fn new(addr: SocketAddr, plan: RequestPlan<T>) -> Self {
        Self {
            addr,
            plan,
            blocking: None,
            framed: None,
        }
    }

    pub async fn invoke_async(&mut self) -> BenchResult<Vec<T>> {
        let request = self.plan.body()?;

        let framed = match self.framed.take() {
            Some(framed) => framed,
            None => connect_async(self.addr).await?,
        };
        let framed = self.framed.insert(framed);

        framed
            .send(request)
            .await
            .map_err(|e| TransportError::io("writing request", e))?;
        let response = framed
            .next()
            .await
            .ok_or_else(|| TransportError::malformed("connection closed before response"))?
            .map_err(|e| TransportError::io("reading response", e))?;

        let body = frame::decode_response(&response)?;
        self.plan.decode(body)
    }
}

impl<T: Payload> EchoClient<T> for PooledRpcClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        self.plan.initialize()?;
        if self.blocking.is_none() {
            self.blocking = Some(connect_blocking(self.addr)?);
        }
        Ok(())
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        let request = self.plan.body()?;

        let stream = match self.blocking.take() {
            Some(stream) => stream,
            None => connect_blocking(self.addr)?,
        };
        let stream = self.blocking.insert(stream);

        let response = round_trip(stream, &request)?;
        let body = frame::decode_response(&response)?;
        self.plan.decode(body)
    }
}

/// Opens, uses and closes one connection per call.
pub struct RawRpcClient<T: Payload> {
    addr: SocketAddr,
    plan: RequestPlan<T>,
}

impl<T: Payload> RawRpcClient<T> {
    pub(super) fn new(addr: SocketAddr, plan: RequestPlan<T>) -> Self {
        Self { addr, plan }
    }
}

impl<T: Payload> EchoClient<T> for RawRpcClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        Ok(self.plan.initialize()?)
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        let request = self.plan.body()?;
        let mut stream = connect_blocking(self.addr)?;

        let response = round_trip(&mut stream, &request)?;
        let body = frame::decode_response(&response)?;
        self.plan.decode(body)
    }
}
