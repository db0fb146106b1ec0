// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! MessagePack through rmp-serde.

use super::{deserialize_error, serialize_error, Codec, Format};
use crate::error::CodecError;
use crate::payload::Payload;

/// rmp-serde codec. Structs are written as positional arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl<T: Payload> Codec<T> for MessagePackCodec {
    fn format(&self) -> Format {
        Format::MessagePack
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec(items).map_err(|e| serialize_error(Format::MessagePack, e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        rmp_serde::from_slice(bytes).map_err(|e| deserialize_error(Format::MessagePack, e))
    }
}
