// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media re-hosting.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::BridgeError;
use crate::types::RelayedMedia;

/// Turns a consumer-platform media reference into a durable public URI.
#[async_trait]
pub trait MediaRelay: Send + Sync + 'static {
    /// Resolves `media_id` with `source_token`, downloads the payload, and
    /// re-uploads it under `namespace`.
    ///
    /// Fails with [`BridgeError::MediaResolution`] when the reference cannot
    /// be resolved and [`BridgeError::MediaUpload`] when the transfer fails.
    async fn relay(
        &self,
        media_id: &str,
        source_token: &SecretString,
        namespace: &str,
    ) -> Result<RelayedMedia, BridgeError>;
}
