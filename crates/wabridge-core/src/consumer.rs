// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer-platform (WhatsApp Cloud API) message model.
//!
//! [`ConsumerMessage`] is what the consumer platform hands us in a webhook;
//! [`OutgoingMessage`] is the request body for the `/messages` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// An incoming consumer message, keyed by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsumerMessage {
    Text { text: TextBody },
    Interactive { interactive: InteractiveReply },
    Image { image: IncomingMedia },
    Video { video: IncomingMedia },
    Audio { audio: IncomingMedia },
    Sticker { sticker: IncomingMedia },
    Document { document: IncomingMedia },
    Location { location: IncomingLocation },
}

const CONSUMER_TYPES: &[&str] = &[
    "text",
    "interactive",
    "image",
    "video",
    "audio",
    "sticker",
    "document",
    "location",
];

const INTERACTIVE_TYPES: &[&str] = &["button_reply", "list_reply"];

impl ConsumerMessage {
    /// Decodes a raw consumer message.
    ///
    /// Types and interactive subtypes the bridge does not map fail with
    /// [`BridgeError::UnsupportedMessageType`]; a known type with a broken
    /// payload fails with [`BridgeError::MalformedMessage`].
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::malformed("consumer", "missing `type` field"))?
            .to_string();

        if !CONSUMER_TYPES.contains(&kind.as_str()) {
            return Err(BridgeError::unsupported(kind));
        }
        if kind == "interactive" {
            let subtype = value
                .pointer("/interactive/type")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| BridgeError::malformed(&kind, "missing `interactive.type` field"))?;
            if !INTERACTIVE_TYPES.contains(&subtype) {
                return Err(BridgeError::unsupported(format!("interactive.{subtype}")));
            }
        }

        serde_json::from_value(value).map_err(|e| BridgeError::malformed(kind, e.to_string()))
    }

    /// Type label used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConsumerMessage::Text { .. } => "text",
            ConsumerMessage::Interactive {
                interactive: InteractiveReply::ButtonReply { .. },
            } => "interactive.button_reply",
            ConsumerMessage::Interactive {
                interactive: InteractiveReply::ListReply { .. },
            } => "interactive.list_reply",
            ConsumerMessage::Image { .. } => "image",
            ConsumerMessage::Video { .. } => "video",
            ConsumerMessage::Audio { .. } => "audio",
            ConsumerMessage::Sticker { .. } => "sticker",
            ConsumerMessage::Document { .. } => "document",
            ConsumerMessage::Location { .. } => "location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// The consumer's answer to a button or list prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractiveReply {
    ButtonReply { button_reply: ReplySelection },
    ListReply { list_reply: ReplySelection },
}

impl InteractiveReply {
    pub fn selection(&self) -> &ReplySelection {
        match self {
            InteractiveReply::ButtonReply { button_reply } => button_reply,
            InteractiveReply::ListReply { list_reply } => list_reply,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplySelection {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Attachment reference. `id` is only resolvable with the consumer access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMedia {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Request body for the consumer-platform send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub messaging_product: String,
    pub to: String,
    #[serde(flatten)]
    pub body: OutgoingBody,
}

impl OutgoingMessage {
    pub fn new(to: impl Into<String>, body: OutgoingBody) -> Self {
        Self {
            messaging_product: "whatsapp".to_string(),
            to: to.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingBody {
    Text { text: OutgoingText },
    Interactive { interactive: Interactive },
    Image { image: MediaRef },
    Video { video: MediaRef },
    Audio { audio: MediaRef },
    Sticker { sticker: MediaRef },
    Document { document: MediaRef },
    Location { location: OutgoingLocation },
}

impl OutgoingBody {
    pub fn text(body: impl Into<String>) -> Self {
        OutgoingBody::Text {
            text: OutgoingText {
                body: body.into(),
                preview_url: None,
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            OutgoingBody::Text { .. } => "text",
            OutgoingBody::Interactive {
                interactive: Interactive::Button { .. },
            } => "interactive.button",
            OutgoingBody::Interactive {
                interactive: Interactive::List { .. },
            } => "interactive.list",
            OutgoingBody::Interactive {
                interactive: Interactive::CtaUrl { .. },
            } => "interactive.cta_url",
            OutgoingBody::Image { .. } => "image",
            OutgoingBody::Video { .. } => "video",
            OutgoingBody::Audio { .. } => "audio",
            OutgoingBody::Sticker { .. } => "sticker",
            OutgoingBody::Document { .. } => "document",
            OutgoingBody::Location { .. } => "location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingText {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

/// Media sent by public link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interactive {
    Button {
        body: InteractiveText,
        action: ButtonAction,
    },
    List {
        body: InteractiveText,
        action: ListAction,
    },
    CtaUrl {
        body: InteractiveText,
        action: CtaAction,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveText {
    pub text: String,
}

impl InteractiveText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: ButtonReply,
}

impl ReplyButton {
    pub fn reply(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: "reply".to_string(),
            reply: ButtonReply {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAction {
    pub button: String,
    pub sections: Vec<ListSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaAction {
    pub name: String,
    pub parameters: CtaParameters,
}

impl CtaAction {
    pub fn url(display_text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: "cta_url".to_string(),
            parameters: CtaParameters {
                display_text: display_text.into(),
                url: url.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaParameters {
    pub display_text: String,
    pub url: String,
}
