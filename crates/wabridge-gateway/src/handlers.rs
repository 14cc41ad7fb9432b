// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wabridge::OutboundRequest;
use wabridge_core::BridgeError;
use wabridge_core::recording::record_outbound;

use crate::server::GatewayState;

/// Body of `POST /api/blip/messages`.
///
/// Field aliases accept the names used by existing integrations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(alias = "userId")]
    pub identity: String,
    #[serde(alias = "userPassword")]
    pub credential: SecretString,
    #[serde(alias = "blipBotId")]
    pub agent_bot_id: String,
    #[serde(alias = "userPhoneNumber")]
    pub consumer_address: String,
    #[serde(alias = "metaAuthToken")]
    pub delivery_token: SecretString,
    #[serde(alias = "metaPhoneNumberId")]
    pub delivery_target_id: String,
    pub message: Value,
}

impl From<MessageRequest> for OutboundRequest {
    fn from(body: MessageRequest) -> Self {
        OutboundRequest {
            identity: body.identity,
            credential: body.credential,
            agent_bot_id: body.agent_bot_id,
            consumer_address: body.consumer_address,
            delivery_token: body.delivery_token,
            delivery_target_id: body.delivery_target_id,
            message: body.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Error category; never the full error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub sessions: usize,
    /// RFC 3339.
    pub timestamp: String,
}

/// POST /api/blip/messages
///
/// Runs the outbound path to completion and reports the result. A body that
/// does not decode is answered like any other malformed message.
pub async fn post_message(
    State(state): State<GatewayState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let e = BridgeError::malformed("request", rejection.body_text());
            record_outbound(e.category());
            tracing::warn!(category = e.category(), error = %e, "rejected message request");
            return (
                status_for(&e),
                Json(MessageResponse {
                    success: false,
                    id: None,
                    error: Some(e.category()),
                }),
            )
                .into_response();
        }
    };

    match state.bridge.send_outbound(body.into()).await {
        Ok(id) => (
            StatusCode::OK,
            Json(MessageResponse {
                success: true,
                id: Some(id),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => {
            let status = status_for(&e);
            tracing::warn!(category = e.category(), error = %e, %status, "outbound message failed");
            (
                status,
                Json(MessageResponse {
                    success: false,
                    id: None,
                    error: Some(e.category()),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/blip/status
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "connected".to_string(),
        sessions: state.bridge.sessions().active_sessions(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// HTTP status for a failed outbound call.
pub fn status_for(error: &BridgeError) -> StatusCode {
    match error {
        BridgeError::UnsupportedMessageType { .. } | BridgeError::MalformedMessage { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BridgeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::SessionEstablishment { .. }
        | BridgeError::MediaResolution { .. }
        | BridgeError::MediaUpload { .. }
        | BridgeError::Delivery { .. } => StatusCode::BAD_GATEWAY,
        BridgeError::Config(_)
        | BridgeError::RoutingUnavailable { .. }
        | BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    #[test]
    fn message_request_accepts_both_field_spellings() {
        let legacy = r#"{
            "userId": "5531999999999",
            "userPassword": "pw",
            "blipBotId": "mybot",
            "userPhoneNumber": "5531999999999",
            "metaAuthToken": "EAAG",
            "metaPhoneNumberId": "1234",
            "message": {"type": "text", "text": {"body": "Hi"}}
        }"#;
        let req: MessageRequest = serde_json::from_str(legacy).unwrap();
        assert_eq!(req.identity, "5531999999999");
        assert_eq!(req.credential.expose_secret(), "pw");
        assert_eq!(req.agent_bot_id, "mybot");
        assert_eq!(req.delivery_target_id, "1234");

        let current = r#"{
            "identity": "5531",
            "credential": "pw",
            "agentBotId": "mybot",
            "consumerAddress": "5531",
            "deliveryToken": "EAAG",
            "deliveryTargetId": "1234",
            "message": {}
        }"#;
        let req: MessageRequest = serde_json::from_str(current).unwrap();
        assert_eq!(req.consumer_address, "5531");
        assert_eq!(req.delivery_token.expose_secret(), "EAAG");
    }

    #[test]
    fn message_request_debug_hides_secrets() {
        let req: MessageRequest = serde_json::from_str(
            r#"{"userId":"1","userPassword":"hunter2","blipBotId":"b","userPhoneNumber":"1",
                "metaAuthToken":"EAAG-secret","metaPhoneNumberId":"2","message":{}}"#,
        )
        .unwrap();
        let debug = format!("{req:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("EAAG-secret"));
    }

    #[test]
    fn failure_response_omits_id() {
        let resp = MessageResponse {
            success: false,
            id: None,
            error: Some("unsupported_type"),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"unsupported_type"}"#);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            status_for(&BridgeError::unsupported("frobnicate")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&BridgeError::Timeout {
                stage: "agent_send",
                duration: Duration::from_secs(10),
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&BridgeError::MediaUpload {
                message: "x".into(),
                source: None,
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&BridgeError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
