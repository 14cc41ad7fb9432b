// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the bridge.
//!
//! Routes:
//! - `GET /health` (public)
//! - `POST /api/blip/messages` (bearer auth): forward one consumer message
//! - `GET /api/blip/status` (bearer auth): live session count
//!
//! [`serve`] wires a [`Bridge`](wabridge::Bridge) from configuration and runs
//! until its cancellation token fires.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, init_tracing, router, serve};
