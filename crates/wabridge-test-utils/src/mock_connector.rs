// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory agent platform.
//!
//! `MockConnector` keeps an account registry (identity name -> password).
//! Authenticated connects succeed only for registered accounts; the guest
//! flow registers accounts through the `/account` command, so the full
//! fallback path can be exercised without a network.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, mpsc};

use wabridge_core::envelope::{AgentMessage, Command, CommandMethod, CommandResponse};
use wabridge_core::{BridgeError, ConnectError, Connection, Connector, Node};

type Accounts = Arc<Mutex<HashMap<String, String>>>;

/// Mock agent-platform connector.
pub struct MockConnector {
    accounts: Accounts,
    connect_delay: Duration,
    fail_transport: bool,
    fail_guest: bool,
    reject_account_creation: bool,
    connect_calls: AtomicUsize,
    guest_calls: AtomicUsize,
    connections: Mutex<Vec<Arc<MockConnection>>>,
    sinks: Mutex<HashMap<String, mpsc::Sender<AgentMessage>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            connect_delay: Duration::ZERO,
            fail_transport: false,
            fail_guest: false,
            reject_account_creation: false,
            connect_calls: AtomicUsize::new(0),
            guest_calls: AtomicUsize::new(0),
            connections: Mutex::new(Vec::new()),
            sinks: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-register an account.
    pub fn with_account(self, identity: &str, password: &str) -> Self {
        if let Ok(mut accounts) = self.accounts.try_lock() {
            accounts.insert(identity.to_string(), password.to_string());
        }
        self
    }

    /// Delay every authenticated connect, to widen race windows.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Fail every authenticated connect at the transport level.
    pub fn failing_transport(mut self) -> Self {
        self.fail_transport = true;
        self
    }

    /// Fail every guest connect.
    pub fn failing_guest(mut self) -> Self {
        self.fail_guest = true;
        self
    }

    /// Answer account creation commands with a failure status.
    pub fn rejecting_account_creation(mut self) -> Self {
        self.reject_account_creation = true;
        self
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn guest_calls(&self) -> usize {
        self.guest_calls.load(Ordering::SeqCst)
    }

    pub async fn has_account(&self, identity: &str) -> bool {
        self.accounts.lock().await.contains_key(identity)
    }

    /// Every connection opened so far, guest connections included.
    pub async fn connections(&self) -> Vec<Arc<MockConnection>> {
        self.connections.lock().await.clone()
    }

    /// Latest authenticated connection for `identity`.
    pub async fn connection_for(&self, identity: &str) -> Option<Arc<MockConnection>> {
        self.connections
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| !c.is_guest() && c.node().name == identity)
            .cloned()
    }

    /// Push an envelope onto the inbound channel of `identity`'s connection.
    ///
    /// Returns `false` when no live connection exists for the identity.
    pub async fn inject(&self, identity: &str, message: AgentMessage) -> bool {
        let sink = self.sinks.lock().await.get(identity).cloned();
        match sink {
            Some(sink) => sink.send(message).await.is_ok(),
            None => false,
        }
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        identity: &Node,
        credential: &SecretString,
        inbound: mpsc::Sender<AgentMessage>,
    ) -> Result<Arc<dyn Connection>, ConnectError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        if self.fail_transport {
            return Err(ConnectError::Transport("connection refused".into()));
        }

        let known = self.accounts.lock().await.get(&identity.name).cloned();
        match known {
            Some(password) if password == credential.expose_secret() => {}
            Some(_) => return Err(ConnectError::Unauthorized("invalid password".into())),
            None => return Err(ConnectError::Unauthorized("account not found".into())),
        }

        let connection = Arc::new(MockConnection::new(identity.clone(), None, false));
        self.connections.lock().await.push(connection.clone());
        self.sinks
            .lock()
            .await
            .insert(identity.name.clone(), inbound);
        Ok(connection)
    }

    async fn connect_guest(&self, guest: &Node) -> Result<Arc<dyn Connection>, ConnectError> {
        self.guest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_guest {
            return Err(ConnectError::Transport("guest session rejected".into()));
        }
        let connection = Arc::new(MockConnection::new(
            guest.clone(),
            Some(self.accounts.clone()),
            self.reject_account_creation,
        ));
        self.connections.lock().await.push(connection.clone());
        Ok(connection)
    }
}

/// Mock connection capturing sent envelopes and commands.
pub struct MockConnection {
    node: Node,
    registry: Option<Accounts>,
    reject_account_creation: bool,
    fail_sends: AtomicBool,
    closed: AtomicBool,
    sent: Mutex<Vec<AgentMessage>>,
    commands: Mutex<Vec<Command>>,
}

impl MockConnection {
    fn new(node: Node, registry: Option<Accounts>, reject_account_creation: bool) -> Self {
        Self {
            node,
            registry,
            reject_account_creation,
            fail_sends: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn is_guest(&self) -> bool {
        self.registry.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make subsequent sends fail with a delivery error.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<AgentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn commands(&self) -> Vec<Command> {
        self.commands.lock().await.clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn send_message(&self, message: AgentMessage) -> Result<(), BridgeError> {
        if self.is_closed() || self.fail_sends.load(Ordering::SeqCst) {
            return Err(BridgeError::Delivery {
                message: "agent platform rejected the envelope".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(message);
        Ok(())
    }

    async fn process_command(&self, command: Command) -> Result<CommandResponse, BridgeError> {
        self.commands.lock().await.push(command.clone());

        let Some(registry) = &self.registry else {
            return Ok(CommandResponse::failure(67, "unsupported command"));
        };
        if command.uri != "/account" || command.method != CommandMethod::Set {
            return Ok(CommandResponse::failure(67, "unsupported command"));
        }
        if self.reject_account_creation {
            return Ok(CommandResponse::failure(14, "account creation denied"));
        }

        let identity = command.from.as_ref().map(|node| node.name.clone());
        let password = command
            .resource
            .as_ref()
            .and_then(|r| r.get("password"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        match (identity, password) {
            (Some(identity), Some(password)) => {
                registry.lock().await.insert(identity, password);
                Ok(CommandResponse::success())
            }
            _ => Ok(CommandResponse::failure(11, "missing identity or password")),
        }
    }

    async fn close(&self) -> Result<(), BridgeError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
