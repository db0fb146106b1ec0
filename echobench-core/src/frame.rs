// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! RPC frame layout shared by the RPC host and its clients.
//!
//! Every message travels as one length-delimited frame (4-byte big-endian
//! length prefix). A request frame carries a fixed header followed by the
//! codec-encoded item array:
//!
//! ```text
//! +---------+--------+---------+----------------+-----------------+
//! | version | format | payload | item count u32 | encoded items.. |
//! +---------+--------+---------+----------------+-----------------+
//! ```
//!
//! A response frame is a status byte followed by either the encoded items
//! (status 0) or a UTF-8 fault message (status 1).

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::LengthDelimitedCodec;

use crate::codec::Format;
use crate::error::TransportError;
use crate::payload::PayloadKind;
use crate::types::ItemCount;

pub const PROTOCOL_VERSION: u8 = 1;

/// Request header size in bytes.
pub const HEADER_LEN: usize = 7;

/// Largest frame either side accepts.
pub const MAX_FRAME_BYTES: usize = 1 << 30;

const LENGTH_PREFIX_LEN: usize = 4;

const STATUS_OK: u8 = 0;
const STATUS_FAULT: u8 = 1;

/// Malformed request frames. Each one becomes a fault response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Truncated request header: {len} of {HEADER_LEN} bytes")]
    TruncatedHeader { len: usize },

    #[error("Unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown format tag {0}")]
    UnknownFormat(u8),

    #[error("Unknown payload tag {0}")]
    UnknownPayload(u8),
}

/// Codec used on both ends of the async transport.
pub fn length_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(LENGTH_PREFIX_LEN)
        .big_endian()
        .max_frame_length(MAX_FRAME_BYTES)
        .new_codec()
}

/// Fixed request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub format: Format,
    pub payload: PayloadKind,
    pub item_count: ItemCount,
}

impl RequestHeader {
    /// Header followed by `body`, ready to be written as one frame.
    pub fn encode(&self, body: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
        buf.put_u8(PROTOCOL_VERSION);
        buf.put_u8(self.format.wire_tag());
        buf.put_u8(self.payload.wire_tag());
        buf.put_u32(self.item_count.value());
        buf.put_slice(body);
        buf.freeze()
    }

    /// Split a request frame into its header and body.
    pub fn decode(frame: &[u8]) -> Result<(Self, &[u8]), FrameError> {
        if frame.len() < HEADER_LEN {
            return Err(FrameError::TruncatedHeader { len: frame.len() });
        }

        if frame[0] != PROTOCOL_VERSION {
            return Err(FrameError::UnsupportedVersion(frame[0]));
        }

        let format = Format::from_wire_tag(frame[1]).ok_or(FrameError::UnknownFormat(frame[1]))?;
        let payload =
            PayloadKind::from_wire_tag(frame[2]).ok_or(FrameError::UnknownPayload(frame[2]))?;
        let count = u32::from_be_bytes([frame[3], frame[4], frame[5], frame[6]]);

        let header = Self {
            format,
            payload,
            item_count: ItemCount::new(count),
        };
        Ok((header, &frame[HEADER_LEN..]))
    }
}

/// Successful response frame.
pub fn encode_ok(body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + body.len());
    buf.put_u8(STATUS_OK);
    buf.put_slice(body);
    buf.freeze()
}

/// Fault response frame.
pub fn encode_fault(message: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + message.len());
    buf.put_u8(STATUS_FAULT);
    buf.put_slice(message.as_bytes());
    buf.freeze()
}

/// Body of a successful response, or the fault it carries.
pub fn decode_response(frame: &[u8]) -> Result<&[u8], TransportError> {
    match frame.split_first() {
        Some((&STATUS_OK, body)) => Ok(body),
        Some((&STATUS_FAULT, message)) => Err(TransportError::RpcFault {
            message: String::from_utf8_lossy(message).into_owned(),
        }),
        Some((status, _)) => Err(TransportError::malformed(format!(
            "unknown RPC status byte {}",
            status
        ))),
        None => Err(TransportError::malformed("empty RPC response frame")),
    }
}

/// Write one length-prefixed frame to a blocking stream.
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> std::io::Result<()> {
    let len = u32::try_from(frame.len())
        .ok()
        .filter(|len| *len as usize <= MAX_FRAME_BYTES)
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "frame exceeds size limit")
        })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(frame)?;
    writer.flush()
}

/// Read one length-prefixed frame from a blocking stream.
pub fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds size limit", len),
        ));
    }

    let mut frame = vec![0u8; len];
    reader.read_exact(&mut frame)?;
    Ok(frame)
}
