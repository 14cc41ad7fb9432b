// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent-platform envelope model (LIME JSON vocabulary).
//!
//! A message envelope is `{id, from, to, metadata, type, content}` where
//! `type` is a MIME type naming the shape of `content`. Decoding goes through
//! [`RawContent`] so an unknown `type` surfaces as [`AgentContent::Other`]
//! instead of failing the whole envelope, while a known `type` whose payload
//! does not match is rejected outright.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::BridgeError;
use crate::types::Node;

/// MIME types used on the agent platform.
pub mod mime {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const SELECT: &str = "application/vnd.lime.select+json";
    pub const MEDIA_LINK: &str = "application/vnd.lime.media-link+json";
    pub const LOCATION: &str = "application/vnd.lime.location+json";
    pub const COLLECTION: &str = "application/vnd.lime.collection+json";
    pub const WEB_LINK: &str = "application/vnd.lime.web-link+json";
    pub const CHAT_STATE: &str = "application/vnd.lime.chatstate+json";
    pub const DOCUMENT_SELECT: &str = "application/vnd.lime.document-select+json";
    pub const ACCOUNT: &str = "application/vnd.lime.account+json";
}

/// Canonical message kinds exchanged with the agent platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MessageKind {
    Text,
    ButtonSelect,
    ListSelect,
    MediaLink,
    Location,
    Collection,
    WebLink,
}

/// A message envelope as sent to or received from the agent platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub content: AgentContent,
}

impl AgentMessage {
    pub fn new(id: impl Into<String>, to: Node, content: AgentContent) -> Self {
        Self {
            id: Some(id.into()),
            from: None,
            to: Some(to),
            metadata: None,
            content,
        }
    }

    /// Name part of the sender address, which is the agent bot identifier
    /// for envelopes a bot sends.
    pub fn sender_name(&self) -> Option<&str> {
        self.from.as_ref().map(|node| node.name.as_str())
    }
}

/// Typed envelope content, one variant per supported MIME type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawContent")]
pub enum AgentContent {
    Text(String),
    Select(Select),
    MediaLink(MediaLink),
    Location(Location),
    Collection(Collection),
    WebLink(WebLink),
    /// Presence / typing indicator. Never forwarded to the consumer.
    ChatState(ChatState),
    /// A MIME type this bridge has no model for.
    Other { mime_type: String, content: Value },
}

impl AgentContent {
    pub fn text(body: impl Into<String>) -> Self {
        AgentContent::Text(body.into())
    }

    pub fn mime_type(&self) -> &str {
        match self {
            AgentContent::Text(_) => mime::TEXT_PLAIN,
            AgentContent::Select(_) => mime::SELECT,
            AgentContent::MediaLink(_) => mime::MEDIA_LINK,
            AgentContent::Location(_) => mime::LOCATION,
            AgentContent::Collection(_) => mime::COLLECTION,
            AgentContent::WebLink(_) => mime::WEB_LINK,
            AgentContent::ChatState(_) => mime::CHAT_STATE,
            AgentContent::Other { mime_type, .. } => mime_type,
        }
    }

    /// Canonical kind, or `None` for presence and unmodelled content.
    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            AgentContent::Text(_) => Some(MessageKind::Text),
            AgentContent::Select(select) if select.scope == Some(SelectScope::Immediate) => {
                Some(MessageKind::ButtonSelect)
            }
            AgentContent::Select(_) => Some(MessageKind::ListSelect),
            AgentContent::MediaLink(_) => Some(MessageKind::MediaLink),
            AgentContent::Location(_) => Some(MessageKind::Location),
            AgentContent::Collection(_) => Some(MessageKind::Collection),
            AgentContent::WebLink(_) => Some(MessageKind::WebLink),
            AgentContent::ChatState(_) | AgentContent::Other { .. } => None,
        }
    }

    pub fn is_presence(&self) -> bool {
        matches!(self, AgentContent::ChatState(_))
    }
}

impl Serialize for AgentContent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.mime_type())?;
        match self {
            AgentContent::Text(body) => map.serialize_entry("content", body)?,
            AgentContent::Select(select) => map.serialize_entry("content", select)?,
            AgentContent::MediaLink(media) => map.serialize_entry("content", media)?,
            AgentContent::Location(location) => map.serialize_entry("content", location)?,
            AgentContent::Collection(collection) => map.serialize_entry("content", collection)?,
            AgentContent::WebLink(link) => map.serialize_entry("content", link)?,
            AgentContent::ChatState(state) => map.serialize_entry("content", state)?,
            AgentContent::Other { content, .. } => map.serialize_entry("content", content)?,
        }
        map.end()
    }
}

/// Undecoded `{type, content}` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContent {
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default)]
    pub content: Value,
}

impl TryFrom<RawContent> for AgentContent {
    type Error = BridgeError;

    fn try_from(raw: RawContent) -> Result<Self, Self::Error> {
        fn decode<T: serde::de::DeserializeOwned>(
            mime_type: &str,
            content: Value,
        ) -> Result<T, BridgeError> {
            serde_json::from_value(content)
                .map_err(|e| BridgeError::malformed(mime_type, e.to_string()))
        }

        let RawContent { mime_type, content } = raw;
        let decoded = match mime_type.as_str() {
            mime::TEXT_PLAIN => match content {
                Value::String(body) => AgentContent::Text(body),
                other => {
                    return Err(BridgeError::malformed(
                        mime::TEXT_PLAIN,
                        format!("expected a string, found {other}"),
                    ));
                }
            },
            mime::SELECT => AgentContent::Select(decode(&mime_type, content)?),
            mime::MEDIA_LINK => AgentContent::MediaLink(decode(&mime_type, content)?),
            mime::LOCATION => AgentContent::Location(decode(&mime_type, content)?),
            mime::COLLECTION => AgentContent::Collection(decode(&mime_type, content)?),
            mime::WEB_LINK => AgentContent::WebLink(decode(&mime_type, content)?),
            mime::CHAT_STATE => AgentContent::ChatState(decode(&mime_type, content)?),
            _ => AgentContent::Other { mime_type, content },
        };
        Ok(decoded)
    }
}

/// How long a select menu stays available on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectScope {
    Transient,
    Persistent,
    /// Quick replies: buttons shown once, right under the message.
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<SelectScope>,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl SelectOption {
    /// Stable identifier for the option: its order when present, its text otherwise.
    pub fn key(&self) -> String {
        self.order
            .map(|order| order.to_string())
            .unwrap_or_else(|| self.text.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLink {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default = "document_select_type")]
    pub item_type: String,
    #[serde(default)]
    pub items: Vec<DocumentSelect>,
}

fn document_select_type() -> String {
    mime::DOCUMENT_SELECT.to_string()
}

/// A titled group of options inside a [`Collection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSelect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<DocumentContainer>,
    #[serde(default)]
    pub options: Vec<DocumentSelectOption>,
}

impl DocumentSelect {
    pub fn title(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|header| header.value.get("title"))
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSelectOption {
    pub label: DocumentContainer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DocumentContainer>,
}

impl DocumentSelectOption {
    /// Display text of the option label.
    ///
    /// Plain-text labels carry a string value; rich labels carry an object
    /// with `text` or `title`.
    pub fn label_text(&self) -> Option<&str> {
        match &self.label.value {
            Value::String(text) => Some(text.as_str()),
            Value::Object(fields) => fields
                .get("text")
                .or_else(|| fields.get("title"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContainer {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebLink {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub state: String,
}

/// Command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMethod {
    Get,
    Set,
    Delete,
    Merge,
}

/// A request/response command envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pp: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Node>,
    pub method: CommandMethod,
    pub uri: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl Command {
    /// Account creation issued from a guest connection on behalf of `identity`.
    pub fn create_account(id: impl Into<String>, identity: &Node, guest: &Node, password: &str) -> Self {
        Self {
            id: id.into(),
            from: Some(identity.clone()),
            pp: Some(guest.clone()),
            to: None,
            method: CommandMethod::Set,
            uri: "/account".to_string(),
            resource_type: Some(mime::ACCOUNT.to_string()),
            resource: Some(serde_json::json!({ "password": password })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandReason {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<CommandReason>,
}

impl CommandResponse {
    pub fn success() -> Self {
        Self {
            status: CommandStatus::Success,
            reason: None,
        }
    }

    pub fn failure(code: i32, description: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure,
            reason: Some(CommandReason {
                code,
                description: Some(description.into()),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}
