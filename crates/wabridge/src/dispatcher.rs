// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound dispatch loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wabridge_core::{BridgeError, InboundDelivery};

use crate::bridge::Bridge;

/// Delivers inbound envelopes one at a time until `cancel` fires or every
/// sender is gone.
///
/// Envelopes are handled in arrival order. Failures are logged and the
/// envelope is dropped; nothing is retried.
pub async fn run_inbound(
    bridge: Arc<Bridge>,
    mut inbound: mpsc::Receiver<InboundDelivery>,
    cancel: CancellationToken,
) {
    info!("inbound dispatcher running");

    loop {
        tokio::select! {
            delivery = inbound.recv() => {
                let Some(delivery) = delivery else {
                    debug!("inbound channel closed");
                    break;
                };
                match bridge.deliver_inbound(&delivery).await {
                    Ok(_) => {}
                    Err(BridgeError::RoutingUnavailable { bot_id }) => {
                        warn!(
                            %bot_id,
                            identity = %delivery.identity,
                            "no routing entry for bot, dropping envelope"
                        );
                    }
                    Err(e) => {
                        warn!(
                            identity = %delivery.identity,
                            category = e.category(),
                            error = %e,
                            "inbound delivery failed, dropping envelope"
                        );
                    }
                }
            }
            _ = cancel.cancelled() => {
                info!("shutdown signal received, stopping inbound dispatcher");
                break;
            }
        }
    }

    info!("inbound dispatcher stopped");
}
