// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers.
//!
//! Written against the `metrics` facade; installing a recorder is up to the
//! embedding program. Without one these calls are no-ops.

use metrics::{describe_counter, describe_gauge};

use crate::error::BridgeError;

/// Register all bridge metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "wabridge_outbound_total",
        "Consumer messages forwarded to the agent platform, by result"
    );
    describe_counter!(
        "wabridge_inbound_total",
        "Agent envelopes delivered to consumers, by result"
    );
    describe_counter!(
        "wabridge_media_relay_total",
        "Media relay attempts, by result"
    );
    describe_gauge!("wabridge_active_sessions", "Currently live agent sessions");
}

/// `"ok"` or the error category.
pub fn result_label<T>(result: &Result<T, BridgeError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.category(),
    }
}

pub fn record_outbound(result: &'static str) {
    metrics::counter!("wabridge_outbound_total", "result" => result).increment(1);
}

pub fn record_inbound(result: &'static str) {
    metrics::counter!("wabridge_inbound_total", "result" => result).increment(1);
}

pub fn record_media_relay(result: &'static str) {
    metrics::counter!("wabridge_media_relay_total", "result" => result).increment(1);
}

pub fn set_active_sessions(count: usize) {
    metrics::gauge!("wabridge_active_sessions").set(count as f64);
}
