// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the session, translation, and delivery layers.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::envelope::AgentMessage;
use crate::error::BridgeError;

/// An agent-platform address of the form `name@domain/instance`.
///
/// Domain and instance are optional on the wire; `name` never is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub name: String,
    pub domain: Option<String>,
    pub instance: Option<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Some(domain.into()),
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(domain) = &self.domain {
            write!(f, "@{domain}")?;
        }
        if let Some(instance) = &self.instance {
            write!(f, "/{instance}")?;
        }
        Ok(())
    }
}

impl FromStr for Node {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, instance) = match s.split_once('/') {
            Some((rest, instance)) => (rest, Some(instance.to_string())),
            None => (s, None),
        };
        let (name, domain) = match rest.split_once('@') {
            Some((name, domain)) => (name, Some(domain.to_string())),
            None => (rest, None),
        };
        if name.is_empty() {
            return Err(BridgeError::malformed("node", format!("`{s}` has no name")));
        }
        Ok(Self {
            name: name.to_string(),
            domain: domain.filter(|d| !d.is_empty()),
            instance: instance.filter(|i| !i.is_empty()),
        })
    }
}

impl Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Connection state of an established session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    AuthenticatedConnected,
    GuestConnected,
    Failed,
}

/// Per-identity lifecycle as seen by the bridge façade.
///
/// `Failed` only describes the last attempt; the next outbound call for the
/// same identity starts a fresh `Establishing` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoSession,
    Establishing,
    Ready,
    Failed,
}

/// Credentials needed to answer a consumer conversation on behalf of a bot.
#[derive(Clone)]
pub struct BotRoutingEntry {
    /// Bearer token for the consumer delivery API.
    pub delivery_token: SecretString,
    /// Consumer-platform endpoint (phone-number resource) used for replies.
    pub delivery_target_id: String,
}

impl fmt::Debug for BotRoutingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotRoutingEntry")
            .field("delivery_token", &"[redacted]")
            .field("delivery_target_id", &self.delivery_target_id)
            .finish()
    }
}

/// An agent-platform envelope received on a session's connection, tagged
/// with the conversation it belongs to.
#[derive(Debug, Clone)]
pub struct InboundDelivery {
    /// Consumer identity that owns the session the envelope arrived on.
    pub identity: String,
    /// Consumer-platform address (phone number) the reply goes to.
    pub consumer_address: String,
    pub message: AgentMessage,
}

/// Identifier assigned by the consumer delivery API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

/// Durable location of a re-hosted attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedMedia {
    pub uri: String,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_parses_full_address() {
        let node: Node = "mybot@msging.net/default".parse().unwrap();
        assert_eq!(node.name, "mybot");
        assert_eq!(node.domain.as_deref(), Some("msging.net"));
        assert_eq!(node.instance.as_deref(), Some("default"));
        assert_eq!(node.to_string(), "mybot@msging.net/default");
    }

    #[test]
    fn node_parses_bare_name() {
        let node: Node = "mybot".parse().unwrap();
        assert_eq!(node.name, "mybot");
        assert!(node.domain.is_none());
        assert!(node.instance.is_none());
    }

    #[test]
    fn node_rejects_empty_name() {
        assert!("@msging.net".parse::<Node>().is_err());
    }

    #[test]
    fn node_serializes_as_string() {
        let node = Node::new("5531999999999", "0mn.io").with_instance("default");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"5531999999999@0mn.io/default\"");
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn session_state_display() {
        assert_eq!(
            SessionState::AuthenticatedConnected.to_string(),
            "authenticated_connected"
        );
        assert_eq!(SessionPhase::NoSession.to_string(), "no_session");
    }

    #[test]
    fn routing_entry_debug_redacts_token() {
        let entry = BotRoutingEntry {
            delivery_token: SecretString::from("EAAG-secret"),
            delivery_target_id: "1234".into(),
        };
        let debug = format!("{entry:?}");
        assert!(!debug.contains("EAAG-secret"));
        assert!(debug.contains("1234"));
    }
}
