// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer-platform delivery.

use async_trait::async_trait;

use crate::consumer::OutgoingMessage;
use crate::error::BridgeError;
use crate::types::{BotRoutingEntry, DeliveryId};

/// Sends a translated message to a consumer using a bot's routing entry.
#[async_trait]
pub trait DeliveryClient: Send + Sync + 'static {
    async fn deliver(
        &self,
        route: &BotRoutingEntry,
        message: &OutgoingMessage,
    ) -> Result<DeliveryId, BridgeError>;
}
