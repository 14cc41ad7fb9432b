// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the WhatsApp to BLIP bridge.
//!
//! This crate provides the message models of both platforms, the error
//! taxonomy, and the capability traits (agent-platform transport, media
//! relay, consumer delivery) the rest of the workspace is written against.

pub mod consumer;
pub mod envelope;
pub mod error;
pub mod recording;
pub mod traits;
pub mod types;

pub use consumer::{ConsumerMessage, OutgoingBody, OutgoingMessage};
pub use envelope::{AgentContent, AgentMessage, Command, CommandResponse, MessageKind};
pub use error::{BridgeError, ConnectError, with_timeout};
pub use types::{
    BotRoutingEntry, DeliveryId, InboundDelivery, Node, RelayedMedia, SessionPhase, SessionState,
};

pub use traits::{Connection, Connector, DeliveryClient, MediaRelay};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn every_error_has_a_category() {
        let errors = [
            BridgeError::Config("x".into()),
            BridgeError::SessionEstablishment {
                identity: "5531".into(),
                message: "x".into(),
                source: None,
            },
            BridgeError::unsupported("frobnicate"),
            BridgeError::malformed("image", "missing id"),
            BridgeError::MediaResolution {
                media_id: "m1".into(),
                message: "x".into(),
                source: None,
            },
            BridgeError::MediaUpload {
                message: "x".into(),
                source: None,
            },
            BridgeError::RoutingUnavailable {
                bot_id: "mybot".into(),
            },
            BridgeError::Delivery {
                message: "x".into(),
                source: None,
            },
            BridgeError::Timeout {
                stage: "connect",
                duration: Duration::from_secs(1),
            },
            BridgeError::Internal("x".into()),
        ];
        let categories: Vec<_> = errors.iter().map(BridgeError::category).collect();
        assert_eq!(
            categories,
            vec![
                "config",
                "session",
                "unsupported_type",
                "malformed_message",
                "media_resolution",
                "media_upload",
                "routing_unavailable",
                "delivery",
                "timeout",
                "internal",
            ]
        );
    }

    #[test]
    fn error_display_includes_context() {
        let err = BridgeError::unsupported("interactive.nfm_reply");
        assert_eq!(err.to_string(), "unsupported message type: interactive.nfm_reply");
        let err = BridgeError::RoutingUnavailable {
            bot_id: "mybot".into(),
        };
        assert!(err.to_string().contains("mybot"));
    }

    #[tokio::test(start_paused = true)]
    async fn with_timeout_maps_expiry() {
        let result: Result<(), BridgeError> = with_timeout("send", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(
            result,
            Err(BridgeError::Timeout { stage: "send", .. })
        ));
    }

    #[tokio::test]
    async fn with_timeout_passes_through_result() {
        let value = with_timeout("send", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn metric_result_labels() {
        assert_eq!(recording::result_label(&Ok::<(), BridgeError>(())), "ok");
        assert_eq!(
            recording::result_label::<()>(&Err(BridgeError::unsupported("x"))),
            "unsupported_type"
        );
    }

    #[test]
    fn message_kind_parses_from_name() {
        use std::str::FromStr;
        assert_eq!(MessageKind::from_str("ButtonSelect").unwrap(), MessageKind::ButtonSelect);
        assert!(MessageKind::from_str("Payment").is_err());
    }
}
