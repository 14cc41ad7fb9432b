// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the bridge depends on.
//!
//! All traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for mocks in tests.

pub mod connection;
pub mod delivery;
pub mod media;

pub use connection::{Connection, Connector};
pub use delivery::DeliveryClient;
pub use media::MediaRelay;
