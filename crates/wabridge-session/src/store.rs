// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session table.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::warn;

use wabridge_core::{Connection, SessionState};

/// A live agent-platform session for one consumer identity.
///
/// Owns its connection and the task forwarding the connection's inbound
/// envelopes; both are released by [`Session::close`].
pub struct Session {
    pub identity: String,
    pub domain: String,
    /// Bot this session talks to; outbound envelopes are addressed to it.
    pub agent_bot_id: String,
    /// Consumer address replies on this session are delivered to.
    pub consumer_address: String,
    pub state: SessionState,
    connection: Arc<dyn Connection>,
    forwarder: JoinHandle<()>,
}

impl Session {
    pub fn new(
        identity: String,
        domain: String,
        agent_bot_id: String,
        consumer_address: String,
        state: SessionState,
        connection: Arc<dyn Connection>,
        forwarder: JoinHandle<()>,
    ) -> Self {
        Self {
            identity,
            domain,
            agent_bot_id,
            consumer_address,
            state,
            connection,
            forwarder,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Closes the connection and stops inbound forwarding.
    pub async fn close(&self) {
        if let Err(e) = self.connection.close().await {
            warn!(identity = %self.identity, error = %e, "failed to close agent connection");
        }
        self.forwarder.abort();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("domain", &self.domain)
            .field("agent_bot_id", &self.agent_bot_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Identity-keyed storage for live sessions.
///
/// Lifetime policy (idle eviction, capacity) belongs to implementations; the
/// session manager only gets, upserts, and evicts.
pub trait SessionStore: Send + Sync + 'static {
    fn get(&self, identity: &str) -> Option<Arc<Session>>;

    /// Stores `session`, returning the one it replaced.
    fn upsert(&self, session: Arc<Session>) -> Option<Arc<Session>>;

    fn evict(&self, identity: &str) -> Option<Arc<Session>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns every session.
    fn drain(&self) -> Vec<Arc<Session>>;
}

/// Process-memory session store. Lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, identity: &str) -> Option<Arc<Session>> {
        self.sessions.get(identity).map(|s| s.value().clone())
    }

    fn upsert(&self, session: Arc<Session>) -> Option<Arc<Session>> {
        self.sessions.insert(session.identity.clone(), session)
    }

    fn evict(&self, identity: &str) -> Option<Arc<Session>> {
        self.sessions.remove(identity).map(|(_, s)| s)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }

    fn drain(&self) -> Vec<Arc<Session>> {
        let identities: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        identities
            .into_iter()
            .filter_map(|identity| self.evict(&identity))
            .collect()
    }
}
