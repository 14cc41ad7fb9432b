// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session manager: per-identity connection lifecycle.
//!
//! [`SessionManager::acquire`] returns the live session for an identity or
//! establishes one. Establishment tries an authenticated connect first; on an
//! authentication rejection it registers the account once through a guest
//! connection and reconnects. Acquisition is single-flight per identity, so
//! concurrent first sends never open two connections or create two accounts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use wabridge_config::model::AgentConfig;
use wabridge_core::recording::set_active_sessions;
use wabridge_core::{
    AgentMessage, BridgeError, Command, ConnectError, Connection, Connector, InboundDelivery,
    Node, SessionPhase, SessionState, with_timeout,
};

use crate::store::{Session, SessionStore};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failed phases remembered before the oldest are forgotten.
const MAX_TRACKED_FAILURES: usize = 1024;

/// Agent-side settings the manager needs.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub domain: String,
    pub guest_instance: String,
    pub connect_timeout: Duration,
    pub send_timeout: Duration,
    pub inbound_buffer: usize,
}

impl From<&AgentConfig> for SessionSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            domain: config.domain.clone(),
            guest_instance: config.guest_instance.clone(),
            connect_timeout: config.connect_timeout(),
            send_timeout: config.send_timeout(),
            inbound_buffer: config.inbound_buffer,
        }
    }
}

/// Parameters of one acquisition.
#[derive(Debug, Clone, Copy)]
pub struct SessionRequest<'a> {
    pub identity: &'a str,
    pub credential: &'a SecretString,
    pub agent_bot_id: &'a str,
    pub consumer_address: &'a str,
}

pub struct SessionManager {
    connector: Arc<dyn Connector>,
    store: Arc<dyn SessionStore>,
    settings: SessionSettings,
    inbound: mpsc::Sender<InboundDelivery>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// Establishing and Failed phases only; Ready is read from the store.
    phases: DashMap<String, TrackedPhase>,
    phase_seq: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
struct TrackedPhase {
    phase: SessionPhase,
    seq: u64,
}

/// Releases the per-identity lock entry once no acquirer holds it, and
/// forgets an establishment that was cancelled midway.
struct Flight<'a> {
    manager: &'a SessionManager,
    identity: &'a str,
    establishing: Option<u64>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.manager
            .locks
            .remove_if(self.identity, |_, lock| Arc::strong_count(lock) == 1);
        if let Some(seq) = self.establishing {
            self.manager.phases.remove_if(self.identity, |_, t| t.seq == seq);
        }
    }
}

impl SessionManager {
    /// Creates a manager. Inbound envelopes from every session are forwarded
    /// to `inbound`.
    pub fn new(
        connector: Arc<dyn Connector>,
        store: Arc<dyn SessionStore>,
        settings: SessionSettings,
        inbound: mpsc::Sender<InboundDelivery>,
    ) -> Self {
        Self {
            connector,
            store,
            settings,
            inbound,
            locks: DashMap::new(),
            phases: DashMap::new(),
            phase_seq: AtomicU64::new(0),
        }
    }

    /// Returns the live session for `request.identity`, establishing it if
    /// none exists.
    ///
    /// A failed establishment stores nothing; the next call starts over.
    pub async fn acquire(&self, request: SessionRequest<'_>) -> Result<Arc<Session>, BridgeError> {
        if let Some(session) = self.store.get(request.identity) {
            return Ok(session);
        }

        // Drop order matters: guard, then lock, then flight.
        let mut flight = Flight {
            manager: self,
            identity: request.identity,
            establishing: None,
        };
        let lock = self
            .locks
            .entry(request.identity.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have finished while we waited.
        if let Some(session) = self.store.get(request.identity) {
            return Ok(session);
        }

        flight.establishing = Some(self.track(request.identity, SessionPhase::Establishing));

        match self.establish(request).await {
            Ok(session) => {
                let session = Arc::new(session);
                if let Some(previous) = self.store.upsert(session.clone()) {
                    previous.close().await;
                }
                self.phases.remove(request.identity);
                set_active_sessions(self.store.len());
                info!(
                    identity = request.identity,
                    agent_bot_id = request.agent_bot_id,
                    state = %session.state,
                    "agent session established"
                );
                Ok(session)
            }
            Err(e) => {
                self.track(request.identity, SessionPhase::Failed);
                warn!(identity = request.identity, error = %e, "agent session establishment failed");
                Err(e)
            }
        }
    }

    /// Sends `message` on `session`'s connection under the send timeout.
    pub async fn send(&self, session: &Session, message: AgentMessage) -> Result<(), BridgeError> {
        with_timeout(
            "agent_send",
            self.settings.send_timeout,
            session.connection().send_message(message),
        )
        .await
    }

    /// Lifecycle phase of `identity`.
    pub fn phase(&self, identity: &str) -> SessionPhase {
        if let Some(tracked) = self.phases.get(identity) {
            return tracked.phase;
        }
        if self.store.get(identity).is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::NoSession
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.store.len()
    }

    /// Closes and forgets the session for `identity`. Returns whether one existed.
    pub async fn evict(&self, identity: &str) -> bool {
        let Some(session) = self.store.evict(identity) else {
            return false;
        };
        session.close().await;
        self.phases.remove(identity);
        self.locks.remove_if(identity, |_, lock| Arc::strong_count(lock) == 1);
        set_active_sessions(self.store.len());
        info!(identity, "agent session evicted");
        true
    }

    /// Closes every session.
    pub async fn shutdown(&self) {
        let sessions = self.store.drain();
        let count = sessions.len();
        for session in sessions {
            session.close().await;
        }
        self.phases.clear();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        set_active_sessions(0);
        info!(count, "agent sessions closed");
    }

    fn track(&self, identity: &str, phase: SessionPhase) -> u64 {
        let seq = self.phase_seq.fetch_add(1, Ordering::Relaxed);
        self.phases.insert(identity.to_string(), TrackedPhase { phase, seq });
        if phase == SessionPhase::Failed {
            self.forget_oldest_failures();
        }
        seq
    }

    fn forget_oldest_failures(&self) {
        loop {
            let mut failed = 0;
            let mut oldest: Option<(String, u64)> = None;
            for entry in self.phases.iter() {
                if entry.phase != SessionPhase::Failed {
                    continue;
                }
                failed += 1;
                if oldest.as_ref().is_none_or(|(_, seq)| entry.seq < *seq) {
                    oldest = Some((entry.key().clone(), entry.seq));
                }
            }
            match oldest {
                Some((identity, seq)) if failed > MAX_TRACKED_FAILURES => {
                    self.phases.remove_if(&identity, |_, t| t.seq == seq);
                }
                _ => break,
            }
        }
    }

    async fn establish(&self, request: SessionRequest<'_>) -> Result<Session, BridgeError> {
        let node = Node::new(request.identity, &self.settings.domain);
        let (tx, rx) = mpsc::channel(self.settings.inbound_buffer.max(1));

        let connection = match self.connect(&node, request.credential, tx.clone()).await? {
            Ok(connection) => connection,
            Err(ConnectError::Unauthorized(reason)) => {
                info!(identity = request.identity, %reason, "authentication rejected, registering account");
                self.register_account(&node, request.credential).await?;
                match self.connect(&node, request.credential, tx).await? {
                    Ok(connection) => connection,
                    Err(e) => {
                        return Err(establishment(
                            request.identity,
                            "connect after account registration failed",
                            Some(Box::new(e)),
                        ));
                    }
                }
            }
            Err(e @ ConnectError::Transport(_)) => {
                return Err(establishment(request.identity, "connect failed", Some(Box::new(e))));
            }
        };

        let forwarder = self.spawn_forwarder(request.identity, request.consumer_address, rx);
        Ok(Session::new(
            request.identity.to_string(),
            self.settings.domain.clone(),
            request.agent_bot_id.to_string(),
            request.consumer_address.to_string(),
            SessionState::AuthenticatedConnected,
            connection,
            forwarder,
        ))
    }

    async fn connect(
        &self,
        node: &Node,
        credential: &SecretString,
        inbound: mpsc::Sender<AgentMessage>,
    ) -> Result<Result<Arc<dyn Connection>, ConnectError>, BridgeError> {
        let duration = self.settings.connect_timeout;
        tokio::time::timeout(duration, self.connector.connect(node, credential, inbound))
            .await
            .map_err(|_| BridgeError::Timeout {
                stage: "connect",
                duration,
            })
    }

    /// Creates the account for `node` with `credential` as its password,
    /// through a throwaway guest connection.
    async fn register_account(&self, node: &Node, credential: &SecretString) -> Result<(), BridgeError> {
        let identity = node.name.as_str();
        let guest = Node::new(Uuid::new_v4().to_string(), &self.settings.domain)
            .with_instance(&self.settings.guest_instance);

        let duration = self.settings.connect_timeout;
        let guest_connection = tokio::time::timeout(duration, self.connector.connect_guest(&guest))
            .await
            .map_err(|_| BridgeError::Timeout {
                stage: "guest_connect",
                duration,
            })?
            .map_err(|e| establishment(identity, "guest connect failed", Some(Box::new(e))))?;

        let command = Command::create_account(
            Uuid::new_v4().to_string(),
            node,
            &guest,
            credential.expose_secret(),
        );
        let response = with_timeout(
            "account_command",
            self.settings.send_timeout,
            guest_connection.process_command(command),
        )
        .await;

        if let Err(e) = guest_connection.close().await {
            debug!(identity, error = %e, "failed to close guest connection");
        }

        let response = match response {
            Ok(response) => response,
            Err(e @ BridgeError::Timeout { .. }) => return Err(e),
            Err(e) => {
                return Err(establishment(identity, "account command failed", Some(Box::new(e))));
            }
        };
        if !response.is_success() {
            let reason = response
                .reason
                .as_ref()
                .map(|r| format!("{} ({})", r.description.as_deref().unwrap_or("no description"), r.code))
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(establishment(
                identity,
                format!("account creation rejected: {reason}"),
                None,
            ));
        }

        info!(identity, guest = %guest, "account registered through guest connection");
        Ok(())
    }

    fn spawn_forwarder(
        &self,
        identity: &str,
        consumer_address: &str,
        mut rx: mpsc::Receiver<AgentMessage>,
    ) -> JoinHandle<()> {
        let identity = identity.to_string();
        let consumer_address = consumer_address.to_string();
        let out = self.inbound.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if message.content.is_presence() {
                    debug!(%identity, from = ?message.from, "dropping presence envelope");
                    continue;
                }
                let delivery = InboundDelivery {
                    identity: identity.clone(),
                    consumer_address: consumer_address.clone(),
                    message,
                };
                if out.send(delivery).await.is_err() {
                    debug!(%identity, "inbound dispatcher gone, stopping forwarder");
                    break;
                }
            }
        })
    }
}

fn establishment(
    identity: &str,
    message: impl Into<String>,
    source: Option<BoxedSource>,
) -> BridgeError {
    BridgeError::SessionEstablishment {
        identity: identity.to_string(),
        message: message.into(),
        source,
    }
}
