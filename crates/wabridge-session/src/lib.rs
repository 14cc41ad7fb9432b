// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session management for the bridge.
//!
//! - [`SessionManager`]: one agent-platform connection per consumer identity,
//!   established at most once even under concurrent first sends, with a
//!   guest-registration fallback when the account does not exist yet
//! - [`SessionStore`]: identity-keyed session table behind a trait
//! - [`BotRoutingTable`]: delivery credentials per agent bot, bounded by
//!   size and age

pub mod manager;
pub mod routing;
pub mod store;

pub use manager::{SessionManager, SessionRequest, SessionSettings};
pub use routing::BotRoutingTable;
pub use store::{InMemorySessionStore, Session, SessionStore};
