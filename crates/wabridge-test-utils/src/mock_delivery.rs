// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock consumer delivery client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use wabridge_core::{BotRoutingEntry, BridgeError, DeliveryClient, DeliveryId, OutgoingMessage};

/// A captured delivery: the target endpoint and the message body.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub delivery_target_id: String,
    pub message: OutgoingMessage,
}

/// Records every delivery; can be switched to fail.
pub struct MockDelivery {
    delivered: Arc<Mutex<Vec<Delivered>>>,
    notify: Arc<Notify>,
    failing: AtomicBool,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Reject every subsequent delivery.
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivered_count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    /// Wait until at least `count` deliveries were captured or `timeout` elapses.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Delivered> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if self.delivered_count().await >= count {
                    return;
                }
                notified.await;
            }
        };
        let _ = tokio::time::timeout(timeout, wait).await;
        self.delivered().await
    }
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryClient for MockDelivery {
    async fn deliver(
        &self,
        route: &BotRoutingEntry,
        message: &OutgoingMessage,
    ) -> Result<DeliveryId, BridgeError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BridgeError::Delivery {
                message: "consumer platform returned 400".into(),
                source: None,
            });
        }
        self.delivered.lock().await.push(Delivered {
            delivery_target_id: route.delivery_target_id.clone(),
            message: message.clone(),
        });
        self.notify.notify_waiters();
        Ok(DeliveryId(format!("wamid.mock-{}", uuid::Uuid::new_v4())))
    }
}
