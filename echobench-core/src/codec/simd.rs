// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON through simd-json.

use super::{deserialize_error, serialize_error, Codec, Format};
use crate::error::CodecError;
use crate::payload::Payload;

/// simd-json codec.
///
/// The parser works in place, so every call copies the input into a scratch
/// buffer first. That copy is part of what this format costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdJsonCodec;

impl<T: Payload> Codec<T> for SimdJsonCodec {
    fn format(&self) -> Format {
        Format::SimdJson
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        simd_json::to_vec(&items).map_err(|e| serialize_error(Format::SimdJson, e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        let mut scratch = bytes.to_vec();
        simd_json::from_slice(&mut scratch).map_err(|e| deserialize_error(Format::SimdJson, e))
    }
}
