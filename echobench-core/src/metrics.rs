// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Process-wide Prometheus counters for the echo hosts.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::codec::Format;
use crate::host::HostKind;
use crate::payload::PayloadKind;

lazy_static! {
    pub static ref ECHO_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "echo_requests_total",
        "Echo operations served",
        &["host", "format", "payload"]
    )
    .unwrap();
    pub static ref ECHO_FAULTS: IntCounterVec = register_int_counter_vec!(
        "echo_faults_total",
        "Echo requests rejected with an error status or RPC fault",
        &["host", "format", "payload"]
    )
    .unwrap();
    pub static ref ECHO_ITEMS_RETURNED: IntCounterVec = register_int_counter_vec!(
        "echo_items_returned_total",
        "Cache items serialized into echo responses",
        &["host", "format", "payload"]
    )
    .unwrap();
}

/// Force registration so an idle process still exposes every family.
pub fn register() {
    lazy_static::initialize(&ECHO_REQUESTS);
    lazy_static::initialize(&ECHO_FAULTS);
    lazy_static::initialize(&ECHO_ITEMS_RETURNED);
}

pub(crate) fn record_success(host: HostKind, format: Format, payload: PayloadKind, items: usize) {
    let labels = [host.tag(), format.tag(), payload.type_name()];
    ECHO_REQUESTS.with_label_values(&labels).inc();
    ECHO_ITEMS_RETURNED
        .with_label_values(&labels)
        .inc_by(items as u64);
}

/// Faults raised before the payload type is known are labelled `unknown`.
pub(crate) fn record_fault(host: HostKind, format: Format, payload: Option<PayloadKind>) {
    let payload = payload.map_or("unknown", |p| p.type_name());
    ECHO_FAULTS
        .with_label_values(&[host.tag(), format.tag(), payload])
        .inc();
}

/// Render every registered family in the text exposition format.
pub fn encode_text() -> String {
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
