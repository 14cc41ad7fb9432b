// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the bridge's external collaborators.
//!
//! - [`MockConnector`] / [`MockConnection`] - in-memory agent platform with
//!   an account registry, guest registration, and inbound injection
//! - [`MockDelivery`] - captures consumer deliveries
//! - [`MockRelay`] - deterministic media relay

pub mod mock_connector;
pub mod mock_delivery;
pub mod mock_relay;

pub use mock_connector::{MockConnection, MockConnector};
pub use mock_delivery::MockDelivery;
pub use mock_relay::MockRelay;
