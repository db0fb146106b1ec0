// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON through serde_json.

use super::{deserialize_error, serialize_error, Codec, Format};
use crate::error::CodecError;
use crate::payload::Payload;

/// serde_json codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Payload> Codec<T> for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(items).map_err(|e| serialize_error(Format::Json, e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| deserialize_error(Format::Json, e))
    }
}
