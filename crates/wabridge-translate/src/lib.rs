// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation between consumer-platform messages and agent-platform envelopes.
//!
//! - [`outbound`]: consumer message -> agent content (may relay media)
//! - [`inbound`]: agent envelope -> consumer message (pure)
//!
//! Both directions are exhaustive matches over the message kinds; anything
//! without a mapping fails with `UnsupportedMessageType`.

pub mod inbound;
pub mod outbound;

pub use inbound::InboundTranslator;
pub use outbound::{MediaContext, translate_outbound};
