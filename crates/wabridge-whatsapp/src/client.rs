// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`DeliveryClient`] over the WhatsApp Cloud API.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use wabridge_config::model::WhatsAppConfig;
use wabridge_core::{
    BotRoutingEntry, BridgeError, DeliveryClient, DeliveryId, OutgoingMessage, with_timeout,
};

use crate::types::{ApiErrorResponse, SendResponse};

#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    fn messages_url(&self, delivery_target_id: &str) -> String {
        format!("{}/{}/messages", self.base_url, delivery_target_id)
    }
}

#[async_trait]
impl DeliveryClient for WhatsAppClient {
    async fn deliver(
        &self,
        route: &BotRoutingEntry,
        message: &OutgoingMessage,
    ) -> Result<DeliveryId, BridgeError> {
        let url = self.messages_url(&route.delivery_target_id);
        with_timeout("delivery", self.timeout, async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(route.delivery_token.expose_secret())
                .json(message)
                .send()
                .await
                .map_err(|e| BridgeError::Delivery {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map(|e| {
                        format!(
                            "{} (code {}, {})",
                            e.error.message,
                            e.error.code.unwrap_or_default(),
                            e.error.error_type.unwrap_or_default()
                        )
                    })
                    .unwrap_or(body);
                warn!(
                    status = %status,
                    delivery_target = %route.delivery_target_id,
                    kind = message.body.kind_name(),
                    "consumer platform rejected message"
                );
                return Err(BridgeError::Delivery {
                    message: format!("consumer platform returned {status}: {detail}"),
                    source: None,
                });
            }

            let sent: SendResponse =
                serde_json::from_str(&body).map_err(|e| BridgeError::Delivery {
                    message: format!("invalid send response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            let id = sent
                .messages
                .into_iter()
                .next()
                .map(|m| m.id)
                .ok_or_else(|| BridgeError::Delivery {
                    message: "send response carries no message id".into(),
                    source: None,
                })?;
            debug!(%id, delivery_target = %route.delivery_target_id, "message delivered");
            Ok(DeliveryId(id))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use wabridge_core::OutgoingBody;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_secs: u64) -> WhatsAppClient {
        WhatsAppClient::new(&WhatsAppConfig {
            api_base_url: format!("{}/v20.0/", server.uri()),
            request_timeout_secs: timeout_secs,
        })
        .unwrap()
    }

    fn route() -> BotRoutingEntry {
        BotRoutingEntry {
            delivery_token: SecretString::from("EAAG-token"),
            delivery_target_id: "106540352242922".into(),
        }
    }

    #[tokio::test]
    async fn posts_message_with_bearer_token() {
        let server = MockServer::start().await;
        let message = OutgoingMessage::new("5531999999999", OutgoingBody::text("Hi"));
        Mock::given(method("POST"))
            .and(path("/v20.0/106540352242922/messages"))
            .and(header("authorization", "Bearer EAAG-token"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "to": "5531999999999",
                "type": "text",
                "text": {"body": "Hi"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messaging_product": "whatsapp",
                "contacts": [{"input": "5531999999999", "wa_id": "5531999999999"}],
                "messages": [{"id": "wamid.HBgM"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server, 5).deliver(&route(), &message).await.unwrap();
        assert_eq!(id, DeliveryId("wamid.HBgM".into()));
    }

    #[tokio::test]
    async fn api_error_becomes_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Invalid parameter", "type": "OAuthException", "code": 100}
            })))
            .mount(&server)
            .await;

        let message = OutgoingMessage::new("5531", OutgoingBody::text("Hi"));
        let err = client_for(&server, 5)
            .deliver(&route(), &message)
            .await
            .unwrap_err();
        let BridgeError::Delivery { message, .. } = err else {
            panic!("expected delivery error");
        };
        assert!(message.contains("Invalid parameter"));
        assert!(!message.contains("EAAG-token"));
    }

    #[tokio::test]
    async fn missing_message_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
            .mount(&server)
            .await;

        let message = OutgoingMessage::new("5531", OutgoingBody::text("Hi"));
        assert!(client_for(&server, 5).deliver(&route(), &message).await.is_err());
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(json!({"messages": [{"id": "late"}]})),
            )
            .mount(&server)
            .await;

        let message = OutgoingMessage::new("5531", OutgoingBody::text("Hi"));
        let err = client_for(&server, 1)
            .deliver(&route(), &message)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { stage: "delivery", .. }));
    }
}
