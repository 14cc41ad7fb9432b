// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic media relay.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;

use wabridge_core::{BridgeError, MediaRelay, RelayedMedia};

/// Relays every media id to `https://store.test/<namespace>/<media_id>`.
///
/// The reported MIME type comes from [`MockRelay::with_mime`], falling back
/// to `application/octet-stream`.
pub struct MockRelay {
    mime_types: HashMap<String, String>,
    unresolvable: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self {
            mime_types: HashMap::new(),
            unresolvable: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mime(mut self, media_id: &str, mime_type: &str) -> Self {
        self.mime_types
            .insert(media_id.to_string(), mime_type.to_string());
        self
    }

    /// Make resolution of `media_id` fail.
    pub fn with_unresolvable(mut self, media_id: &str) -> Self {
        self.unresolvable.insert(media_id.to_string());
        self
    }

    /// `(media_id, namespace)` pairs relayed so far.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaRelay for MockRelay {
    async fn relay(
        &self,
        media_id: &str,
        _source_token: &SecretString,
        namespace: &str,
    ) -> Result<RelayedMedia, BridgeError> {
        self.calls
            .lock()
            .await
            .push((media_id.to_string(), namespace.to_string()));
        if self.unresolvable.contains(media_id) {
            return Err(BridgeError::MediaResolution {
                media_id: media_id.to_string(),
                message: "media-info endpoint returned 404".into(),
                source: None,
            });
        }
        Ok(RelayedMedia {
            uri: format!("https://store.test/{namespace}/{media_id}"),
            mime_type: self
                .mime_types
                .get(media_id)
                .cloned()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
    }
}
