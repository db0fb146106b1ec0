// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wire format adapters.
//!
//! Every format is wrapped behind the same pair of operations,
//! `serialize(items) -> bytes` and `deserialize(bytes) -> items`. Hosts and
//! clients are parameterized by a [`Codec`] picked from a [`Format`] tag at
//! construction time and never hardcode a serializer.
//!
//! | Format      | Crate        | Content type            |
//! |-------------|--------------|-------------------------|
//! | `json`      | serde_json   | `application/json`      |
//! | `simd-json` | simd-json    | `application/json`      |
//! | `msgpack`   | rmp-serde    | `application/x-msgpack` |
//! | `bincode`   | bincode      | `application/x-bincode` |
//! | `xml`       | quick-xml    | `application/xml`       |

mod binary;
mod json;
mod msgpack;
mod simd;
mod xml;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, HardValidationError};
use crate::payload::Payload;

pub use binary::BincodeCodec;
pub use json::JsonCodec;
pub use msgpack::MessagePackCodec;
pub use simd::SimdJsonCodec;
pub use xml::XmlCodec;

/// Serializer capability for arrays of one payload type.
pub trait Codec<T: Payload>: Send + Sync {
    /// Format implemented by this codec.
    fn format(&self) -> Format;

    /// Media type sent and expected on the wire.
    fn content_type(&self) -> &'static str {
        self.format().content_type()
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError>;
}

/// Wire formats under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// JSON through serde_json
    Json,
    /// JSON through simd-json
    SimdJson,
    /// MessagePack through rmp-serde
    #[serde(rename = "msgpack")]
    MessagePack,
    /// bincode's fixed binary layout
    Bincode,
    /// XML through quick-xml
    Xml,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::SimdJson,
        Format::MessagePack,
        Format::Bincode,
        Format::Xml,
    ];

    /// Configuration and display tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::SimdJson => "simd-json",
            Format::MessagePack => "msgpack",
            Format::Bincode => "bincode",
            Format::Xml => "xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json | Format::SimdJson => "application/json",
            Format::MessagePack => "application/x-msgpack",
            Format::Bincode => "application/x-bincode",
            Format::Xml => "application/xml",
        }
    }

    /// Whether a `Content-Type` header value selects this format.
    /// Parameters such as `charset` are ignored.
    pub fn matches_content_type(&self, header: &str) -> bool {
        let media_type = header.split(';').next().unwrap_or_default().trim();
        media_type.eq_ignore_ascii_case(self.content_type())
    }

    /// Single-byte tag used in RPC request headers.
    pub fn wire_tag(&self) -> u8 {
        match self {
            Format::Json => 1,
            Format::SimdJson => 2,
            Format::MessagePack => 3,
            Format::Bincode => 4,
            Format::Xml => 5,
        }
    }

    pub fn from_wire_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.wire_tag() == tag)
    }

    /// Construct the codec for payload type `T`.
    pub fn codec<T: Payload>(&self) -> Arc<dyn Codec<T>> {
        match self {
            Format::Json => Arc::new(JsonCodec),
            Format::SimdJson => Arc::new(SimdJsonCodec),
            Format::MessagePack => Arc::new(MessagePackCodec),
            Format::Bincode => Arc::new(BincodeCodec),
            Format::Xml => Arc::new(XmlCodec),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for Format {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        match lowered.as_str() {
            "messagepack" => return Ok(Format::MessagePack),
            "simdjson" => return Ok(Format::SimdJson),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|format| format.tag() == lowered)
            .ok_or_else(|| HardValidationError::UnknownVariant {
                kind: "format",
                value: s.to_string(),
                expected: Self::ALL.map(|f| f.tag()).join(", "),
            })
    }
}

fn serialize_error(format: Format, err: impl fmt::Display) -> CodecError {
    CodecError::Serialize {
        format,
        message: err.to_string(),
    }
}

fn deserialize_error(format: Format, err: impl fmt::Display) -> CodecError {
    CodecError::Deserialize {
        format,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ItemCache;
    use crate::payload::{LargeItem, SmallItem};
    use crate::types::ItemCount;

    fn assert_round_trip<T: Payload>(cache: &ItemCache, count: u32) {
        let items = cache.take::<T>(ItemCount::new(count));
        for format in Format::ALL {
            let codec = format.codec::<T>();
            let bytes = codec
                .serialize(items)
                .unwrap_or_else(|e| panic!("{} serialize: {}", format, e));
            let decoded = codec
                .deserialize(&bytes)
                .unwrap_or_else(|e| panic!("{} deserialize: {}", format, e));
            assert_eq!(decoded.as_slice(), items, "{} round trip", format);
        }
    }

    #[test]
    fn test_round_trip_every_format() {
        let cache = ItemCache::generate(20, 99);
        assert_round_trip::<SmallItem>(&cache, 20);
        assert_round_trip::<LargeItem>(&cache, 20);
    }

    #[test]
    fn test_empty_arrays() {
        let cache = ItemCache::generate(1, 1);
        assert_round_trip::<SmallItem>(&cache, 0);
        assert_round_trip::<LargeItem>(&cache, 0);
    }

    #[test]
    fn test_format_parse_and_display() {
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
        assert_eq!("MessagePack".parse::<Format>().unwrap(), Format::MessagePack);
        assert_eq!("SimdJson".parse::<Format>().unwrap(), Format::SimdJson);
        let err = "protobuf".parse::<Format>().unwrap_err();
        assert!(err.to_string().contains("msgpack"));
    }

    #[test]
    fn test_content_type_matching() {
        assert!(Format::Json.matches_content_type("application/json"));
        assert!(Format::Json.matches_content_type("application/json; charset=utf-8"));
        assert!(Format::SimdJson.matches_content_type("Application/JSON"));
        assert!(!Format::Xml.matches_content_type("application/json"));
        assert!(!Format::MessagePack.matches_content_type(""));
    }

    #[test]
    fn test_wire_tags_unique() {
        for format in Format::ALL {
            assert_eq!(Format::from_wire_tag(format.wire_tag()), Some(format));
        }
        assert_eq!(Format::from_wire_tag(0), None);
    }

    #[test]
    fn test_garbage_is_a_deserialize_error() {
        for format in Format::ALL {
            let codec = format.codec::<LargeItem>();
            let err = codec.deserialize(b"\xff\xfe\x00").unwrap_err();
            assert!(matches!(err, CodecError::Deserialize { format: f, .. } if f == format));
        }
    }
}
