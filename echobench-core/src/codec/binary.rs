// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixed-layout binary encoding through bincode.

use super::{deserialize_error, serialize_error, Codec, Format};
use crate::error::CodecError;
use crate::payload::Payload;

/// bincode codec (little-endian, fixed-width integers, u64 length prefixes).
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<T: Payload> Codec<T> for BincodeCodec {
    fn format(&self) -> Format {
        Format::Bincode
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(items).map_err(|e| serialize_error(Format::Bincode, e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        bincode::deserialize(bytes).map_err(|e| deserialize_error(Format::Bincode, e))
    }
}
