// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the bridge.

use std::time::Duration;

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across the bridge crates.
///
/// Every outbound or inbound operation resolves to one of these variants.
/// None of them is retried by the bridge itself; retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (missing keys, invalid URLs, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Authenticated connect failed and the guest registration fallback failed too.
    #[error("could not establish session for {identity}: {message}")]
    SessionEstablishment {
        identity: String,
        message: String,
        source: Option<BoxedSource>,
    },

    /// A message type or subtype with no mapping in the requested direction.
    #[error("unsupported message type: {kind}")]
    UnsupportedMessageType { kind: String },

    /// A declared message kind whose payload does not match it.
    #[error("malformed {kind} message: {message}")]
    MalformedMessage { kind: String, message: String },

    /// Media metadata lookup on the source platform failed.
    #[error("media resolution failed for {media_id}: {message}")]
    MediaResolution {
        media_id: String,
        message: String,
        source: Option<BoxedSource>,
    },

    /// Download or re-upload of a media payload failed.
    #[error("media upload failed: {message}")]
    MediaUpload {
        message: String,
        source: Option<BoxedSource>,
    },

    /// An inbound envelope arrived for a bot with no routing entry.
    #[error("no routing entry for agent bot {bot_id}")]
    RoutingUnavailable { bot_id: String },

    /// A downstream platform rejected a send.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<BoxedSource>,
    },

    /// A network stage exceeded its deadline.
    #[error("{stage} timed out after {duration:?}")]
    Timeout {
        stage: &'static str,
        duration: Duration,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Short, stable label for the error class.
    ///
    /// Safe to hand to external callers: it carries no identifiers, tokens, or
    /// upstream response bodies.
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::Config(_) => "config",
            BridgeError::SessionEstablishment { .. } => "session",
            BridgeError::UnsupportedMessageType { .. } => "unsupported_type",
            BridgeError::MalformedMessage { .. } => "malformed_message",
            BridgeError::MediaResolution { .. } => "media_resolution",
            BridgeError::MediaUpload { .. } => "media_upload",
            BridgeError::RoutingUnavailable { .. } => "routing_unavailable",
            BridgeError::Delivery { .. } => "delivery",
            BridgeError::Timeout { .. } => "timeout",
            BridgeError::Internal(_) => "internal",
        }
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        BridgeError::UnsupportedMessageType { kind: kind.into() }
    }

    pub fn malformed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::MalformedMessage {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a [`Connector`](crate::traits::Connector).
///
/// Kept apart from [`BridgeError`] so the session manager can tell an
/// authentication rejection (eligible for guest registration) from a
/// transport failure (not eligible).
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Credentials were rejected or the account does not exist.
    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    /// The transport failed before authentication completed.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Wraps any future in a deadline, mapping expiry to [`BridgeError::Timeout`].
pub async fn with_timeout<F, T>(
    stage: &'static str,
    duration: Duration,
    fut: F,
) -> Result<T, BridgeError>
where
    F: std::future::Future<Output = Result<T, BridgeError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Timeout { stage, duration }),
    }
}
