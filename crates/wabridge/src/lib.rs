// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp to BLIP message bridge.
//!
//! [`Bridge`] ties the pieces together:
//! - outbound: consumer message -> session -> agent envelope -> send
//! - inbound: agent envelope -> routing lookup -> consumer message -> delivery
//!
//! Inbound envelopes arrive on the channel returned by [`Bridge::new`] and are
//! drained by [`run_inbound`].

pub mod bridge;
pub mod dispatcher;

pub use bridge::{Bridge, OutboundRequest};
pub use dispatcher::run_inbound;
