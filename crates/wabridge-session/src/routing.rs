// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot routing table.
//!
//! Written on every outbound send, read once per inbound envelope. Entries
//! expire a fixed time after their last refresh; past `max_entries` the
//! least recently refreshed entry is dropped.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use wabridge_config::model::RoutingConfig;
use wabridge_core::BotRoutingEntry;

struct Slot {
    entry: BotRoutingEntry,
    refreshed: Instant,
}

pub struct BotRoutingTable {
    entries: DashMap<String, Slot>,
    max_entries: usize,
    ttl: Duration,
}

impl BotRoutingTable {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.max_entries, config.entry_ttl())
    }

    /// Inserts or refreshes the entry for `bot_id`.
    pub fn upsert(&self, bot_id: &str, entry: BotRoutingEntry) {
        self.entries.insert(
            bot_id.to_string(),
            Slot {
                entry,
                refreshed: Instant::now(),
            },
        );
        self.enforce_capacity(bot_id);
    }

    /// Live entry for `bot_id`. Expired entries are removed and reported absent.
    pub fn get(&self, bot_id: &str) -> Option<BotRoutingEntry> {
        let expired = match self.entries.get(bot_id) {
            Some(slot) if !self.is_expired(&slot) => return Some(slot.entry.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(bot_id, |_, slot| self.is_expired(slot));
            debug!(bot_id, "routing entry expired");
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, slot: &Slot) -> bool {
        slot.refreshed.elapsed() >= self.ttl
    }

    fn enforce_capacity(&self, keep: &str) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        self.entries.retain(|_, slot| !self.is_expired(slot));

        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .filter(|slot| slot.key() != keep)
                .min_by_key(|slot| slot.value().refreshed)
                .map(|slot| slot.key().clone());
            match oldest {
                Some(bot_id) => {
                    self.entries.remove(&bot_id);
                    debug!(%bot_id, "routing table full, evicted oldest entry");
                }
                None => break,
            }
        }
    }
}
