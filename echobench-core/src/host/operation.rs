// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The echo operation every host exposes.
//!
//! Decode the request array (and drop it), then encode the first
//! `min(K, cache size)` cache entries of the requested type.

use std::sync::Arc;

use thiserror::Error;

use crate::cache::ItemCache;
use crate::codec::{Codec, Format};
use crate::error::CodecError;
use crate::frame::FrameError;
use crate::metrics;
use crate::payload::{LargeItem, Payload, PayloadKind, SmallItem};
use crate::types::ItemCount;

use super::HostKind;

/// Why a request was refused.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Unknown payload type '{0}'")]
    UnknownType(String),

    #[error("Method {0} not allowed, use POST")]
    MethodNotAllowed(String),

    #[error("Unsupported content type '{actual}', expected {expected}")]
    UnsupportedMediaType {
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid itemCount '{0}'")]
    InvalidItemCount(String),

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Format mismatch: host serves {expected}, request used {actual}")]
    FormatMismatch { expected: Format, actual: Format },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Invalid request body: {0}")]
    Decode(#[source] CodecError),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] CodecError),
}

impl OperationError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OperationError::UnknownType(_) => 404,
            OperationError::MethodNotAllowed(_) => 405,
            OperationError::BodyTooLarge { .. } => 413,
            OperationError::UnsupportedMediaType { .. } => 415,
            OperationError::Encode(_) => 500,
            OperationError::InvalidItemCount(_)
            | OperationError::BodyRead(_)
            | OperationError::FormatMismatch { .. }
            | OperationError::Frame(_)
            | OperationError::Decode(_) => 400,
        }
    }
}

/// State shared by every connection of one host.
pub struct EchoState {
    host: HostKind,
    format: Format,
    cache: Arc<ItemCache>,
    small: Arc<dyn Codec<SmallItem>>,
    large: Arc<dyn Codec<LargeItem>>,
}

impl EchoState {
    pub fn new(host: HostKind, format: Format, cache: Arc<ItemCache>) -> Self {
        Self {
            host,
            format,
            cache,
            small: format.codec(),
            large: format.codec(),
        }
    }

    pub fn host(&self) -> HostKind {
        self.host
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Reject request bodies not encoded in this host's format.
    pub fn check_content_type(&self, header: Option<&str>) -> Result<(), OperationError> {
        let header = header.unwrap_or_default();
        if self.format.matches_content_type(header) {
            Ok(())
        } else {
            Err(OperationError::UnsupportedMediaType {
                expected: self.format.content_type(),
                actual: header.to_string(),
            })
        }
    }

    /// Run the operation and return the encoded response body.
    pub fn echo(
        &self,
        payload: PayloadKind,
        body: &[u8],
        count: ItemCount,
    ) -> Result<Vec<u8>, OperationError> {
        match payload {
            PayloadKind::Small => self.echo_with(self.small.as_ref(), body, count),
            PayloadKind::Large => self.echo_with(self.large.as_ref(), body, count),
        }
    }

    fn echo_with<T: Payload>(
        &self,
        codec: &dyn Codec<T>,
        body: &[u8],
        count: ItemCount,
    ) -> Result<Vec<u8>, OperationError> {
        let request = codec.deserialize(body).map_err(OperationError::Decode)?;
        drop(request);

        let items = self.cache.take::<T>(count);
        let response = codec.serialize(items).map_err(OperationError::Encode)?;

        metrics::record_success(self.host, self.format, T::KIND, items.len());
        Ok(response)
    }

    /// Count a refused request.
    pub fn record_fault(&self, payload: Option<PayloadKind>, err: &OperationError) {
        tracing::debug!(
            host = %self.host,
            format = %self.format,
            error = %err,
            "Echo request refused"
        );
        metrics::record_fault(self.host, self.format, payload);
    }
}

/// Payload type named by an HTTP path of the form `/api/operation/{TypeName}`.
pub fn route_payload(path: &str) -> Result<PayloadKind, OperationError> {
    let type_name = path
        .strip_prefix("/api/operation/")
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| OperationError::UnknownType(path.to_string()))?;

    PayloadKind::from_type_name(type_name)
        .ok_or_else(|| OperationError::UnknownType(type_name.to_string()))
}

/// `itemCount` from a raw query string. Absent means zero.
pub fn item_count_from_query(query: Option<&str>) -> Result<ItemCount, OperationError> {
    let value = query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "itemCount")
        .map(|(_, value)| value);

    match value {
        None => Ok(ItemCount::ZERO),
        Some(raw) => raw
            .parse::<u32>()
            .map(ItemCount::new)
            .map_err(|_| OperationError::InvalidItemCount(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(format: Format) -> EchoState {
        EchoState::new(HostKind::Hyper, format, Arc::new(ItemCache::generate(20, 5)))
    }

    #[test]
    fn test_echo_returns_cache_prefix() {
        let state = state(Format::Json);
        let codec = Format::Json.codec::<SmallItem>();
        let body = codec.serialize(&[]).unwrap();

        let response = state
            .echo(PayloadKind::Small, &body, ItemCount::new(3))
            .unwrap();
        let items = codec.deserialize(&response).unwrap();
        assert_eq!(items.as_slice(), &state.cache.small_items()[..3]);
    }

    #[test]
    fn test_echo_clamps_to_cache() {
        let state = state(Format::MessagePack);
        let codec = Format::MessagePack.codec::<LargeItem>();
        let body = codec.serialize(&state.cache.large_items()[..2]).unwrap();

        let response = state
            .echo(PayloadKind::Large, &body, ItemCount::new(5000))
            .unwrap();
        assert_eq!(codec.deserialize(&response).unwrap().len(), 20);
    }

    #[test]
    fn test_echo_rejects_bad_body() {
        let state = state(Format::Bincode);
        let err = state
            .echo(PayloadKind::Large, b"\x05", ItemCount::new(1))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_content_type_check() {
        let state = state(Format::Xml);
        assert!(state.check_content_type(Some("application/xml")).is_ok());
        let err = state.check_content_type(Some("application/json")).unwrap_err();
        assert_eq!(err.status_code(), 415);
        assert!(state.check_content_type(None).is_err());
    }

    #[test]
    fn test_route_payload() {
        assert_eq!(
            route_payload("/api/operation/SmallItem").unwrap(),
            PayloadKind::Small
        );
        assert_eq!(
            route_payload("/api/operation/LargeItem").unwrap(),
            PayloadKind::Large
        );
        assert_eq!(
            route_payload("/api/operation/MediumItem")
                .unwrap_err()
                .status_code(),
            404
        );
        assert!(route_payload("/api/other/SmallItem").is_err());
        assert!(route_payload("/api/operation/SmallItem/extra").is_err());
    }

    #[test]
    fn test_item_count_from_query() {
        assert_eq!(item_count_from_query(None).unwrap(), ItemCount::ZERO);
        assert_eq!(
            item_count_from_query(Some("itemCount=42")).unwrap(),
            ItemCount::new(42)
        );
        assert_eq!(
            item_count_from_query(Some("trace=1&itemCount=7")).unwrap(),
            ItemCount::new(7)
        );
        assert_eq!(
            item_count_from_query(Some("other=3")).unwrap(),
            ItemCount::ZERO
        );
        let err = item_count_from_query(Some("itemCount=ten")).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
