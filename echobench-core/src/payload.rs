// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark payload shapes.
//!
//! Two record shapes exist purely to give the serializers something to
//! encode: a flat identifier record and a nested order record. They carry no
//! business invariants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::ItemCache;
use crate::error::HardValidationError;

/// Flat record: one opaque 128-bit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallItem {
    pub id: Uuid,
}

/// Nested record: an order with two addresses and its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeItem {
    pub order_id: Uuid,
    pub order_number: u64,
    pub email_address: String,
    pub shipping_address: Address,
    pub invoice_address: Address,
    pub requested_delivery_date: DateTime<Utc>,
    pub shipping_costs: Decimal,
    pub last_modified: DateTime<Utc>,
    pub create_nonce: Uuid,
    // XML omits the element entirely for an empty list
    #[serde(default)]
    pub order_lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub sku: String,
    pub quantity: i32,
    pub product: String,
    pub price: Decimal,
}

/// The two payload shapes, used wherever the type has to be picked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Small,
    Large,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 2] = [PayloadKind::Small, PayloadKind::Large];

    /// Type name used in routes and XML element names.
    pub fn type_name(&self) -> &'static str {
        match self {
            PayloadKind::Small => SmallItem::TYPE_NAME,
            PayloadKind::Large => LargeItem::TYPE_NAME,
        }
    }

    /// Single-byte tag used in RPC request headers.
    pub fn wire_tag(&self) -> u8 {
        match self {
            PayloadKind::Small => 0,
            PayloadKind::Large => 1,
        }
    }

    pub fn from_wire_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(PayloadKind::Small),
            1 => Some(PayloadKind::Large),
            _ => None,
        }
    }

    /// Resolve a route segment such as `SmallItem`.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.type_name())
    }
}

impl FromStr for PayloadKind {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "smallitem" => Ok(PayloadKind::Small),
            "large" | "largeitem" => Ok(PayloadKind::Large),
            _ => Err(HardValidationError::UnknownVariant {
                kind: "payload",
                value: s.to_string(),
                expected: "small, large".to_string(),
            }),
        }
    }
}

/// A benchmark payload type.
///
/// Codecs, hosts and clients are generic over this trait; nothing else about
/// the shape is known to them.
pub trait Payload:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;
    const KIND: PayloadKind;

    /// The pre-generated entries of this type.
    fn from_cache(cache: &ItemCache) -> &[Self];
}

impl Payload for SmallItem {
    const TYPE_NAME: &'static str = "SmallItem";
    const KIND: PayloadKind = PayloadKind::Small;

    fn from_cache(cache: &ItemCache) -> &[Self] {
        cache.small_items()
    }
}

impl Payload for LargeItem {
    const TYPE_NAME: &'static str = "LargeItem";
    const KIND: PayloadKind = PayloadKind::Large;

    fn from_cache(cache: &ItemCache) -> &[Self] {
        cache.large_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind_parse() {
        assert_eq!("small".parse::<PayloadKind>().unwrap(), PayloadKind::Small);
        assert_eq!("LargeItem".parse::<PayloadKind>().unwrap(), PayloadKind::Large);
        assert_eq!("LARGE".parse::<PayloadKind>().unwrap(), PayloadKind::Large);
        assert!("medium".parse::<PayloadKind>().is_err());
    }

    #[test]
    fn test_type_name_lookup() {
        assert_eq!(PayloadKind::from_type_name("SmallItem"), Some(PayloadKind::Small));
        assert_eq!(PayloadKind::from_type_name("LargeItem"), Some(PayloadKind::Large));
        // route segments are case-sensitive
        assert_eq!(PayloadKind::from_type_name("smallitem"), None);
    }

    #[test]
    fn test_wire_tags() {
        for kind in PayloadKind::ALL {
            assert_eq!(PayloadKind::from_wire_tag(kind.wire_tag()), Some(kind));
        }
        assert_eq!(PayloadKind::from_wire_tag(7), None);
    }

    #[test]
    fn test_camel_case_field_names() {
        let item = SmallItem { id: Uuid::nil() };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":"00000000-0000-0000-0000-000000000000"}"#);

        let line = OrderLine {
            sku: "SKU-1".to_string(),
            quantity: 2,
            product: "widget".to_string(),
            price: Decimal::new(1999, 2),
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains(r#""sku":"SKU-1""#));
        assert!(json.contains(r#""price":"19.99""#));
    }
}
