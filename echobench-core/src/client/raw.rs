// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hand-written HTTP/1.1 over a fresh socket per call.
//!
//! No pooling and no client library in the path: the request head is
//! formatted directly, `Connection: close` ends the exchange and the whole
//! response is read until EOF.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};

use crate::error::{BenchResult, TransportError};
use crate::payload::Payload;

use super::pooled::operation_path;
use super::{EchoClient, RequestPlan};

pub struct RawHttpClient<T: Payload> {
    addr: SocketAddr,
    head_prefix: String,
    plan: RequestPlan<T>,
}

impl<T: Payload> RawHttpClient<T> {
    pub(super) fn new(addr: SocketAddr, plan: RequestPlan<T>) -> Self {
        let path = operation_path::<T>(plan.params().items_to_request().value());
        let head_prefix = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: {}\r\nConnection: close\r\n",
            path,
            addr,
            plan.format().content_type()
        );

        Self {
            addr,
            head_prefix,
            plan,
        }
    }
}

impl<T: Payload> EchoClient<T> for RawHttpClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        Ok(self.plan.initialize()?)
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        let body = self.plan.body()?;

        let mut stream = TcpStream::connect(self.addr)
            .map_err(|e| TransportError::io("connecting to host", e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::io("configuring socket", e))?;

        // one write, so a host refusing the request early has already read the body
        let head = format!("{}Content-Length: {}\r\n\r\n", self.head_prefix, body.len());
        let mut request = Vec::with_capacity(head.len() + body.len());
        request.extend_from_slice(head.as_bytes());
        request.extend_from_slice(&body);
        stream
            .write_all(&request)
            .map_err(|e| TransportError::io("writing request", e))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| TransportError::io("reading response", e))?;

        let (status, body) = split_response(&response)?;
        if status != 200 {
            return Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            }
            .into());
        }

        self.plan.decode(body)
    }
}

/// Status code and body of a complete HTTP/1.1 response.
pub(super) fn split_response(raw: &[u8]) -> Result<(u16, &[u8]), TransportError> {
    let head_end = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or_else(|| TransportError::malformed("response head is not terminated"))?;

    let head = std::str::from_utf8(&raw[..head_end])
        .map_err(|_| TransportError::malformed("response head is not UTF-8"))?;
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split(' ')
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            TransportError::malformed(format!("bad status line '{}'", status_line))
        })?;

    let mut content_length = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.parse::<usize>().map_err(|_| {
                TransportError::malformed(format!("bad content-length '{}'", value))
            })?);
        } else if name.eq_ignore_ascii_case("transfer-encoding")
            && value.eq_ignore_ascii_case("chunked")
        {
            return Err(TransportError::malformed("chunked responses are not supported"));
        }
    }

    let body = &raw[head_end + 4..];
    match content_length {
        Some(len) if body.len() < len => Err(TransportError::malformed(format!(
            "body truncated: {} of {} bytes",
            body.len(),
            len
        ))),
        Some(len) => Ok((status, &body[..len])),
        None => Ok((status, body)),
    }
}
