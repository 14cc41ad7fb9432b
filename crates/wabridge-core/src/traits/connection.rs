// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent-platform transport.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::mpsc;

use crate::envelope::{AgentMessage, Command, CommandResponse};
use crate::error::{BridgeError, ConnectError};
use crate::types::Node;

/// Opens connections to the agent platform.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a connection authenticated as `identity`.
    ///
    /// Every envelope received on the connection is pushed to `inbound` in
    /// arrival order until the connection closes.
    async fn connect(
        &self,
        identity: &Node,
        credential: &SecretString,
        inbound: mpsc::Sender<AgentMessage>,
    ) -> Result<Arc<dyn Connection>, ConnectError>;

    /// Opens an unauthenticated connection used only to issue the account
    /// creation command.
    async fn connect_guest(&self, guest: &Node) -> Result<Arc<dyn Connection>, ConnectError>;
}

/// A live connection to the agent platform.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Sends a message envelope.
    async fn send_message(&self, message: AgentMessage) -> Result<(), BridgeError>;

    /// Issues a command and waits for its response.
    async fn process_command(&self, command: Command) -> Result<CommandResponse, BridgeError>;

    /// Closes the connection. Closing twice is not an error.
    async fn close(&self) -> Result<(), BridgeError>;
}
