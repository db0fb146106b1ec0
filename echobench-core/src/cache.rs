// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pre-generated item cache.
//!
//! Both payload lists are generated once at startup from a seeded RNG and are
//! never written again, so hosts and clients share them through an `Arc`
//! without locking.

use chrono::{DateTime, Utc};
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::payload::{Address, LargeItem, OrderLine, Payload, SmallItem};
use crate::types::ItemCount;

/// Entries generated per payload type unless configured otherwise.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Seed used unless configured otherwise.
pub const DEFAULT_SEED: u64 = 12345;

/// 2024-01-01T00:00:00Z
const TIMESTAMP_BASE: i64 = 1_704_067_200;
const TIMESTAMP_SPREAD: i64 = 365 * 24 * 3600;

/// Read-only lists of generated payloads.
#[derive(Debug, Clone)]
pub struct ItemCache {
    small: Vec<SmallItem>,
    large: Vec<LargeItem>,
}

impl ItemCache {
    /// Generate `size` entries of each payload type.
    pub fn generate(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let small = (0..size)
            .map(|_| SmallItem {
                id: random_uuid(&mut rng),
            })
            .collect();

        let large = (0..size).map(|_| generate_order(&mut rng)).collect();

        tracing::debug!(size, seed, "Generated item cache");

        Self { small, large }
    }

    /// Number of entries per payload type.
    pub fn len(&self) -> usize {
        self.small.len()
    }

    pub fn is_empty(&self) -> bool {
        self.small.is_empty()
    }

    pub fn small_items(&self) -> &[SmallItem] {
        &self.small
    }

    pub fn large_items(&self) -> &[LargeItem] {
        &self.large
    }

    /// The first `min(count, len)` entries of `T`.
    pub fn take<T: Payload>(&self, count: ItemCount) -> &[T] {
        let items = T::from_cache(self);
        &items[..count.clamp_to(items.len())]
    }
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::generate(DEFAULT_CACHE_SIZE, DEFAULT_SEED)
    }
}

fn random_uuid(rng: &mut StdRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn random_timestamp(rng: &mut StdRng) -> DateTime<Utc> {
    let secs = TIMESTAMP_BASE + rng.gen_range(0..TIMESTAMP_SPREAD);
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn random_money(rng: &mut StdRng, max_cents: i64) -> Decimal {
    Decimal::new(rng.gen_range(0..max_cents), 2)
}

fn generate_address(rng: &mut StdRng) -> Address {
    Address {
        name: Name().fake_with_rng(rng),
        street: StreetName().fake_with_rng(rng),
        house_number: BuildingNumber().fake_with_rng(rng),
        postal_code: ZipCode().fake_with_rng(rng),
        city: CityName().fake_with_rng(rng),
        country: CountryName().fake_with_rng(rng),
    }
}

fn generate_line(rng: &mut StdRng) -> OrderLine {
    let first: String = Word().fake_with_rng(rng);
    let second: String = Word().fake_with_rng(rng);

    OrderLine {
        sku: format!("SKU-{:06}", rng.gen_range(0..1_000_000)),
        quantity: rng.gen_range(1..20),
        product: format!("{} {}", first, second),
        price: random_money(rng, 100_000),
    }
}

fn generate_order(rng: &mut StdRng) -> LargeItem {
    let line_count = rng.gen_range(1..=5);

    LargeItem {
        order_id: random_uuid(rng),
        order_number: rng.gen(),
        email_address: SafeEmail().fake_with_rng(rng),
        shipping_address: generate_address(rng),
        invoice_address: generate_address(rng),
        requested_delivery_date: random_timestamp(rng),
        shipping_costs: random_money(rng, 5_000),
        last_modified: random_timestamp(rng),
        create_nonce: random_uuid(rng),
        order_lines: (0..line_count).map(|_| generate_line(rng)).collect(),
    }
}
