// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pooled HTTP client built on reqwest.

use std::net::SocketAddr;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::error::{BenchResult, TransportError};
use crate::payload::Payload;

use super::{EchoClient, RequestPlan};

/// Echo URL for payload `T` on `addr`.
pub(super) fn operation_url<T: Payload>(addr: SocketAddr, item_count: u32) -> String {
    format!(
        "http://{}{}",
        addr,
        operation_path::<T>(item_count)
    )
}

pub(super) fn operation_path<T: Payload>(item_count: u32) -> String {
    format!("/api/operation/{}?itemCount={}", T::TYPE_NAME, item_count)
}

/// Keep-alive client: `reqwest::blocking` for sync calls, `reqwest::Client`
/// for async calls. Each keeps its own pool.
pub struct PooledHttpClient<T: Payload> {
    url: String,
    content_type: &'static str,
    plan: RequestPlan<T>,
    blocking: reqwest::blocking::Client,
    client: reqwest::Client,
}

impl<T: Payload> PooledHttpClient<T> {
    pub(super) fn new(addr: SocketAddr, plan: RequestPlan<T>) -> BenchResult<Self> {
        let url = operation_url::<T>(addr, plan.params().items_to_request().value());
        let blocking = reqwest::blocking::Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(TransportError::from)?;
        let client = reqwest::Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            url,
            content_type: plan.format().content_type(),
            plan,
            blocking,
            client,
        })
    }

    pub async fn invoke_async(&mut self) -> BenchResult<Vec<T>> {
        let body = self.plan.body()?;
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, self.content_type)
            .body(body)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::from)?;
        check_status(status, &bytes)?;

        self.plan.decode(&bytes)
    }
}

impl<T: Payload> EchoClient<T> for PooledHttpClient<T> {
    fn initialize(&mut self) -> BenchResult<()> {
        Ok(self.plan.initialize()?)
    }

    fn invoke(&mut self) -> BenchResult<Vec<T>> {
        let body = self.plan.body()?;
        let response = self
            .blocking
            .post(&self.url)
            .header(CONTENT_TYPE, self.content_type)
            .body(body)
            .send()
            .map_err(TransportError::from)?;

        let status = response.status();
        let bytes: Bytes = response.bytes().map_err(TransportError::from)?;
        check_status(status, &bytes)?;

        self.plan.decode(&bytes)
    }
}

fn check_status(status: StatusCode, body: &[u8]) -> Result<(), TransportError> {
    if status == StatusCode::OK {
        return Ok(());
    }
    Err(TransportError::Status {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{LargeItem, SmallItem};

    #[test]
    fn test_operation_url() {
        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        assert_eq!(
            operation_url::<SmallItem>(addr, 10),
            "http://127.0.0.1:9001/api/operation/SmallItem?itemCount=10"
        );
        assert_eq!(
            operation_path::<LargeItem>(0),
            "/api/operation/LargeItem?itemCount=0"
        );
    }

    #[test]
    fn test_non_ok_status() {
        assert!(check_status(StatusCode::OK, b"").is_ok());
        let err = check_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, b"expected application/xml")
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 415, .. }));
    }
}
