// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use wabridge::{Bridge, run_inbound};
use wabridge_config::WabridgeConfig;
use wabridge_core::recording::register_metrics;
use wabridge_core::{BridgeError, Connector};

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub bridge: Arc<Bridge>,
    /// Process start, for uptime.
    pub start_time: Instant,
}

/// Builds the router. `/health` is public; everything under `/api` needs
/// the bearer token.
pub fn router(state: GatewayState, auth: AuthConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/blip/messages", post(handlers::post_message))
        .route("/api/blip/status", get(handlers::get_status))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Runs the bridge behind its HTTP surface until `shutdown` fires.
///
/// On shutdown the server stops accepting requests, the inbound dispatcher
/// stops, and every agent session is closed.
pub async fn serve(
    config: &WabridgeConfig,
    connector: Arc<dyn Connector>,
    shutdown: CancellationToken,
) -> Result<(), BridgeError> {
    register_metrics();

    let (bridge, inbound) = Bridge::from_config(config, connector)?;
    let bridge = Arc::new(bridge);

    let dispatcher_cancel = shutdown.child_token();
    let dispatcher = tokio::spawn(run_inbound(bridge.clone(), inbound, dispatcher_cancel.clone()));

    if config.server.bearer_token.is_none() {
        tracing::warn!("server.bearer_token not set, /api routes will reject every request");
    }
    let app = router(
        GatewayState {
            bridge: bridge.clone(),
            start_time: Instant::now(),
        },
        AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| BridgeError::Internal(format!("gateway server error: {e}")));

    dispatcher_cancel.cancel();
    if let Err(e) = dispatcher.await {
        tracing::warn!(error = %e, "inbound dispatcher task failed");
    }
    bridge.shutdown().await;
    tracing::info!("gateway stopped");

    served
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wabridge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wabridge_core::MediaRelay;
    use wabridge_session::InMemorySessionStore;
    use wabridge_test_utils::{MockConnector, MockDelivery, MockRelay};

    const TOKEN: &str = "gateway-token";

    fn app_with(connector: MockConnector, bearer_token: Option<&str>) -> (Router, Arc<MockConnector>) {
        let connector = Arc::new(connector);
        let relay: Arc<dyn MediaRelay> = Arc::new(MockRelay::new());
        let (bridge, _inbound) = Bridge::new(
            &WabridgeConfig::default(),
            connector.clone(),
            Arc::new(InMemorySessionStore::new()),
            Some(relay),
            Arc::new(MockDelivery::new()),
        );
        let app = router(
            GatewayState {
                bridge: Arc::new(bridge),
                start_time: Instant::now(),
            },
            AuthConfig {
                bearer_token: bearer_token.map(str::to_string),
            },
        );
        (app, connector)
    }

    fn app() -> (Router, Arc<MockConnector>) {
        app_with(MockConnector::new().with_account("5531999999999", "pw"), Some(TOKEN))
    }

    fn message_body(message: Value) -> Body {
        Body::from(
            json!({
                "userId": "5531999999999",
                "userPassword": "pw",
                "blipBotId": "mybot",
                "userPhoneNumber": "5531999999999",
                "metaAuthToken": "EAAG",
                "metaPhoneNumberId": "1234",
                "message": message,
            })
            .to_string(),
        )
    }

    fn post_message(message: Value) -> Request<Body> {
        Request::post("/api/blip/messages")
            .header("authorization", format!("Bearer {TOKEN}"))
            .header("content-type", "application/json")
            .body(message_body(message))
            .unwrap()
    }

    async fn request_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app();
        let (status, json) =
            request_json(app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn api_requires_bearer_token() {
        let (app, _) = app();
        let request = Request::get("/api/blip/status")
            .header("authorization", "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = request_json(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_is_closed_without_configured_token() {
        let (app, _) = app_with(MockConnector::new(), None);
        let request = Request::get("/api/blip/status")
            .header("authorization", format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = request_json(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn text_message_is_forwarded() {
        let (app, connector) = app();
        let (status, json) =
            request_json(app, post_message(json!({"type": "text", "text": {"body": "Hi"}}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert!(json["id"].is_string());
        let sent = connector
            .connection_for("5531999999999")
            .await
            .unwrap()
            .sent_messages()
            .await;
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn unsupported_message_is_422_with_category_only() {
        let (app, connector) = app();
        let (status, json) =
            request_json(app, post_message(json!({"type": "unknown-frobnicate"}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json, json!({"success": false, "error": "unsupported_type"}));
        assert_eq!(connector.connect_calls(), 0);
    }

    #[tokio::test]
    async fn undecodable_request_is_422_malformed() {
        let (app, connector) = app();
        let missing_field = Request::post("/api/blip/messages")
            .header("authorization", format!("Bearer {TOKEN}"))
            .header("content-type", "application/json")
            .body(Body::from(json!({"userId": "5531999999999"}).to_string()))
            .unwrap();
        let (status, json) = request_json(app.clone(), missing_field).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json, json!({"success": false, "error": "malformed_message"}));

        let not_json = Request::post("/api/blip/messages")
            .header("authorization", format!("Bearer {TOKEN}"))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = request_json(app, not_json).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "malformed_message");
        assert_eq!(connector.connect_calls(), 0);
    }

    #[tokio::test]
    async fn session_failure_is_502() {
        let (app, _) = app_with(MockConnector::new().failing_transport(), Some(TOKEN));
        let (status, json) =
            request_json(app, post_message(json!({"type": "text", "text": {"body": "Hi"}}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "session");
    }

    #[tokio::test]
    async fn status_reports_session_count() {
        let (app, _) = app();
        request_json(
            app.clone(),
            post_message(json!({"type": "text", "text": {"body": "Hi"}})),
        )
        .await;

        let request = Request::get("/api/blip/status")
            .header("authorization", format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, json) = request_json(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "connected");
        assert_eq!(json["sessions"], 1);
        assert!(json["timestamp"].is_string());
    }
}
