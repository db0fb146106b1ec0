// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Validated network port.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// First port handed out to benchmark suites.
    pub const DEFAULT_BASE: Port = Port(9001);

    /// Create a new Port with validation.
    pub fn new(port: u16) -> Result<Self, HardValidationError> {
        if port == 0 {
            return Err(HardValidationError::InvalidPort {
                port: 0,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Port `offset` slots after this one.
    pub fn offset(&self, offset: usize) -> Result<Self, HardValidationError> {
        let port = self.0 as u32 + offset as u32;
        if port > u16::MAX as u32 {
            return Err(HardValidationError::InvalidPort {
                port,
                reason: format!("{} + {} exceeds 65535", self.0, offset),
            });
        }
        Ok(Self(port as u16))
    }

    /// Get the inner port value.
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = HardValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Number of items requested from (or sent to) an echo endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCount(u32);

impl ItemCount {
    pub const ZERO: ItemCount = ItemCount(0);

    pub fn new(count: u32) -> Self {
        Self(count)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Number of items actually served from a list of `available` entries.
    /// Requests beyond the list are clamped rather than rejected.
    pub fn clamp_to(&self, available: usize) -> usize {
        (self.0 as usize).min(available)
    }
}

impl fmt::Display for ItemCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemCount {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

/// Per-call parameters shared by every client variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationParams {
    /// K: size of the request body and of the requested response
    pub item_count: ItemCount,
    /// Send the first K cache items in the request body (otherwise an empty array)
    pub send_items: bool,
    /// Ask the host for K items back (otherwise 0)
    pub receive_items: bool,
}

impl InvocationParams {
    pub fn new(item_count: impl Into<ItemCount>) -> Self {
        Self {
            item_count: item_count.into(),
            send_items: true,
            receive_items: true,
        }
    }

    pub fn send_items(mut self, send: bool) -> Self {
        self.send_items = send;
        self
    }

    pub fn receive_items(mut self, receive: bool) -> Self {
        self.receive_items = receive;
        self
    }

    /// Number of cache items placed in the request body.
    pub fn items_to_send(&self) -> ItemCount {
        if self.send_items {
            self.item_count
        } else {
            ItemCount::ZERO
        }
    }

    /// Count sent as `itemCount` to the host.
    pub fn items_to_request(&self) -> ItemCount {
        if self.receive_items {
            self.item_count
        } else {
            ItemCount::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_err());
        assert!(Port::new(1).is_ok());
        assert!(Port::new(65535).is_ok());
    }

    #[test]
    fn test_port_offset_overflow() {
        let port = Port::new(65530).unwrap();
        assert_eq!(port.offset(5).unwrap().value(), 65535);
        assert!(port.offset(6).is_err());
    }

    #[test]
    fn test_item_count_clamp() {
        assert_eq!(ItemCount::new(0).clamp_to(1000), 0);
        assert_eq!(ItemCount::new(10).clamp_to(1000), 10);
        assert_eq!(ItemCount::new(5000).clamp_to(1000), 1000);
    }

    #[test]
    fn test_invocation_flags() {
        let params = InvocationParams::new(100);
        assert_eq!(params.items_to_send().value(), 100);
        assert_eq!(params.items_to_request().value(), 100);

        let params = params.send_items(false);
        assert_eq!(params.items_to_send(), ItemCount::ZERO);
        assert_eq!(params.items_to_request().value(), 100);

        let params = InvocationParams::new(100).receive_items(false);
        assert_eq!(params.items_to_send().value(), 100);
        assert_eq!(params.items_to_request(), ItemCount::ZERO);
    }
}
