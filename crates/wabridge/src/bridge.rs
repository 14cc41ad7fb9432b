// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge façade.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use wabridge_config::WabridgeConfig;
use wabridge_core::recording::{record_inbound, record_outbound, result_label};
use wabridge_core::{
    AgentMessage, BotRoutingEntry, BridgeError, ConsumerMessage, Connector, DeliveryClient,
    DeliveryId, InboundDelivery, MediaRelay, Node, RelayedMedia,
};
use wabridge_media::HttpMediaRelay;
use wabridge_session::{
    BotRoutingTable, InMemorySessionStore, SessionManager, SessionRequest, SessionSettings,
    SessionStore,
};
use wabridge_translate::{InboundTranslator, MediaContext, translate_outbound};
use wabridge_whatsapp::WhatsAppClient;

/// One consumer message to forward, with everything needed to answer it.
#[derive(Debug)]
pub struct OutboundRequest {
    /// Consumer identity; also the session key.
    pub identity: String,
    pub credential: SecretString,
    pub agent_bot_id: String,
    /// Where replies for this conversation are delivered.
    pub consumer_address: String,
    pub delivery_token: SecretString,
    pub delivery_target_id: String,
    /// Consumer-platform message object, as received.
    pub message: Value,
}

pub struct Bridge {
    sessions: SessionManager,
    routing: BotRoutingTable,
    relay: Arc<dyn MediaRelay>,
    delivery: Arc<dyn DeliveryClient>,
    translator: InboundTranslator,
    bot_domain: String,
}

impl Bridge {
    /// Assembles a bridge from its collaborators.
    ///
    /// Without a relay, media messages fail with `MediaUpload`. The returned
    /// receiver yields inbound envelopes from every session; hand it to
    /// [`run_inbound`](crate::run_inbound).
    pub fn new(
        config: &WabridgeConfig,
        connector: Arc<dyn Connector>,
        store: Arc<dyn SessionStore>,
        relay: Option<Arc<dyn MediaRelay>>,
        delivery: Arc<dyn DeliveryClient>,
    ) -> (Self, mpsc::Receiver<InboundDelivery>) {
        let (tx, rx) = mpsc::channel(config.agent.inbound_buffer.max(1));
        let bridge = Self {
            sessions: SessionManager::new(
                connector,
                store,
                SessionSettings::from(&config.agent),
                tx,
            ),
            routing: BotRoutingTable::from_config(&config.routing),
            relay: relay.unwrap_or_else(|| Arc::new(DisabledRelay)),
            delivery,
            translator: InboundTranslator::new(config.labels.clone()),
            bot_domain: config.agent.bot_domain.clone(),
        };
        (bridge, rx)
    }

    /// Builds the HTTP relay and delivery client from `config` and an
    /// in-memory session store.
    pub fn from_config(
        config: &WabridgeConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<(Self, mpsc::Receiver<InboundDelivery>), BridgeError> {
        let relay: Option<Arc<dyn MediaRelay>> = match config.media.store_url {
            Some(_) => Some(Arc::new(HttpMediaRelay::new(&config.media, &config.whatsapp)?)),
            None => {
                info!("media.store_url not set, media messages will be rejected");
                None
            }
        };
        let delivery = Arc::new(WhatsAppClient::new(&config.whatsapp)?);
        Ok(Self::new(
            config,
            connector,
            Arc::new(InMemorySessionStore::new()),
            relay,
            delivery,
        ))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn routing(&self) -> &BotRoutingTable {
        &self.routing
    }

    /// Forwards one consumer message to its agent bot. Returns the id of the
    /// envelope sent.
    ///
    /// Nothing is retried; a failure leaves no partial session behind.
    pub async fn send_outbound(&self, request: OutboundRequest) -> Result<String, BridgeError> {
        let result = self.forward(request).await;
        record_outbound(result_label(&result));
        result
    }

    async fn forward(&self, request: OutboundRequest) -> Result<String, BridgeError> {
        let message = ConsumerMessage::from_value(request.message)?;

        self.routing.upsert(
            &request.agent_bot_id,
            BotRoutingEntry {
                delivery_token: request.delivery_token.clone(),
                delivery_target_id: request.delivery_target_id,
            },
        );

        let session = self
            .sessions
            .acquire(SessionRequest {
                identity: &request.identity,
                credential: &request.credential,
                agent_bot_id: &request.agent_bot_id,
                consumer_address: &request.consumer_address,
            })
            .await?;

        let media = MediaContext {
            relay: self.relay.as_ref(),
            source_token: &request.delivery_token,
            namespace: &session.agent_bot_id,
        };
        let content = translate_outbound(&message, &media).await?;

        let id = Uuid::new_v4().to_string();
        let to = Node::new(session.agent_bot_id.as_str(), self.bot_domain.as_str());
        let envelope = AgentMessage::new(id.clone(), to, content);
        self.sessions.send(&session, envelope).await?;

        info!(
            identity = %session.identity,
            agent_bot_id = %session.agent_bot_id,
            kind = message.kind_name(),
            id = %id,
            "forwarded consumer message"
        );
        Ok(id)
    }

    /// Delivers one agent envelope to the consumer it belongs to.
    ///
    /// The sending bot must have a live routing entry; otherwise nothing is
    /// delivered and `RoutingUnavailable` is returned.
    pub async fn deliver_inbound(&self, delivery: &InboundDelivery) -> Result<DeliveryId, BridgeError> {
        let result = self.route_inbound(delivery).await;
        record_inbound(result_label(&result));
        result
    }

    async fn route_inbound(&self, delivery: &InboundDelivery) -> Result<DeliveryId, BridgeError> {
        let bot_id = delivery
            .message
            .sender_name()
            .ok_or_else(|| BridgeError::malformed("envelope", "missing sender"))?;
        let route = self
            .routing
            .get(bot_id)
            .ok_or_else(|| BridgeError::RoutingUnavailable {
                bot_id: bot_id.to_string(),
            })?;

        let outgoing = self
            .translator
            .translate(&delivery.message, &delivery.consumer_address)?;
        let id = self.delivery.deliver(&route, &outgoing).await?;
        debug!(
            bot_id,
            identity = %delivery.identity,
            kind = outgoing.body.kind_name(),
            delivery_id = %id.0,
            "delivered agent message"
        );
        Ok(id)
    }

    /// Closes every session.
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
    }
}

/// Stand-in relay used when no object store is configured.
struct DisabledRelay;

#[async_trait]
impl MediaRelay for DisabledRelay {
    async fn relay(
        &self,
        _media_id: &str,
        _source_token: &SecretString,
        _namespace: &str,
    ) -> Result<RelayedMedia, BridgeError> {
        Err(BridgeError::MediaUpload {
            message: "media relay is not configured".into(),
            source: None,
        })
    }
}
