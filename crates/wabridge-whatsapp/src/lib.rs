// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API delivery client.
//!
//! Sends translated messages with `POST {api_base_url}/{phone_number_id}/messages`
//! using the routing entry's bearer token.

pub mod client;
pub mod types;

pub use client::WhatsAppClient;
