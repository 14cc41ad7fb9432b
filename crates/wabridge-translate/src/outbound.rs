// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer message to agent envelope content.

use secrecy::SecretString;
use tracing::debug;

use wabridge_core::consumer::{ConsumerMessage, IncomingLocation, IncomingMedia};
use wabridge_core::envelope::{AgentContent, Location, MediaLink};
use wabridge_core::{BridgeError, MediaRelay};

/// What the outbound translator needs to re-host attachments.
pub struct MediaContext<'a> {
    pub relay: &'a dyn MediaRelay,
    /// Consumer-platform token the media id is resolvable with.
    pub source_token: &'a SecretString,
    /// Storage namespace for the re-hosted file.
    pub namespace: &'a str,
}

/// Translates a consumer message into agent-platform content.
///
/// Media messages are relayed first, so a relay failure fails the whole
/// translation and nothing half-translated is produced.
pub async fn translate_outbound(
    message: &ConsumerMessage,
    media: &MediaContext<'_>,
) -> Result<AgentContent, BridgeError> {
    let content = match message {
        ConsumerMessage::Text { text } => AgentContent::Text(text.body.clone()),
        ConsumerMessage::Interactive { interactive } => {
            AgentContent::Text(interactive.selection().title.clone())
        }
        ConsumerMessage::Image { image: item }
        | ConsumerMessage::Video { video: item }
        | ConsumerMessage::Audio { audio: item }
        | ConsumerMessage::Sticker { sticker: item }
        | ConsumerMessage::Document { document: item } => {
            AgentContent::MediaLink(relay_media(item, media).await?)
        }
        ConsumerMessage::Location { location } => AgentContent::Location(to_location(location)),
    };
    debug!(kind = message.kind_name(), mime = content.mime_type(), "translated outbound message");
    Ok(content)
}

async fn relay_media(item: &IncomingMedia, media: &MediaContext<'_>) -> Result<MediaLink, BridgeError> {
    let relayed = media
        .relay
        .relay(&item.id, media.source_token, media.namespace)
        .await?;
    let mime_type = item
        .mime_type
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or(relayed.mime_type);
    Ok(MediaLink {
        mime_type,
        uri: relayed.uri,
        title: item.caption.clone().or_else(|| item.filename.clone()),
        text: None,
        size: None,
    })
}

/// `name` wins over `address`; with neither, the label is omitted.
fn to_location(location: &IncomingLocation) -> Location {
    let label = [&location.name, &location.address]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .cloned();
    Location {
        latitude: location.latitude,
        longitude: location.longitude,
        altitude: 0.0,
        text: label,
    }
}
