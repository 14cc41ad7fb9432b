// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelt key is
//! reported at startup instead of silently ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level bridge configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WabridgeConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Agent-platform addressing and session timeouts.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Consumer delivery API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Media relay settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Bot routing table limits.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// User-visible fallback strings for interactive messages.
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/api/*` routes. When unset every
    /// authenticated route answers 401.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Domain consumer identities live under (`<phone>@<domain>`).
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Domain agent bots are addressed under (`<botId>@<bot_domain>`).
    #[serde(default = "default_bot_domain")]
    pub bot_domain: String,

    /// Instance name used for guest registration nodes.
    #[serde(default = "default_guest_instance")]
    pub guest_instance: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Capacity of each session's inbound channel and of the shared
    /// dispatcher channel.
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,
}

impl AgentConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            bot_domain: default_bot_domain(),
            guest_instance: default_guest_instance(),
            connect_timeout_secs: default_connect_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            inbound_buffer: default_inbound_buffer(),
        }
    }
}

fn default_domain() -> String {
    "0mn.io".to_string()
}

fn default_bot_domain() -> String {
    "msging.net".to_string()
}

fn default_guest_instance() -> String {
    "default".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_send_timeout_secs() -> u64 {
    10
}

fn default_inbound_buffer() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API base, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl WhatsAppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com/v20.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Upload endpoint of the object store. Media relay is disabled when unset.
    #[serde(default)]
    pub store_url: Option<String>,

    /// Credential for the object store.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header carrying the storage namespace on upload.
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,

    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,

    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl MediaConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            api_key: None,
            tenant_header: default_tenant_header(),
            resolve_timeout_secs: default_resolve_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

fn default_tenant_header() -> String {
    "X-Tenant-Id".to_string()
}

fn default_resolve_timeout_secs() -> u64 {
    15
}

fn default_download_timeout_secs() -> u64 {
    30
}

fn default_upload_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Maximum number of bots remembered at once.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Seconds an entry stays valid after its last refresh.
    #[serde(default = "default_entry_ttl_secs")]
    pub entry_ttl_secs: u64,
}

impl RoutingConfig {
    pub fn entry_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_ttl_secs)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            entry_ttl_secs: default_entry_ttl_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

fn default_entry_ttl_secs() -> u64 {
    86_400
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LabelsConfig {
    /// Body text for reply buttons when the select carries none.
    #[serde(default = "default_button_prompt")]
    pub button_prompt: String,

    /// Caption of the button that opens a list.
    #[serde(default = "default_list_button")]
    pub list_button: String,

    /// Section title for list selects without a title.
    #[serde(default = "default_list_section")]
    pub list_section: String,

    /// Body text for collection lists.
    #[serde(default = "default_collection_prompt")]
    pub collection_prompt: String,

    /// Prefix for untitled collection sections (`Item 1`, `Item 2`, ...).
    #[serde(default = "default_collection_item")]
    pub collection_item: String,

    /// Prefix for collection rows without a label.
    #[serde(default = "default_collection_option")]
    pub collection_option: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            button_prompt: default_button_prompt(),
            list_button: default_list_button(),
            list_section: default_list_section(),
            collection_prompt: default_collection_prompt(),
            collection_item: default_collection_item(),
            collection_option: default_collection_option(),
        }
    }
}

fn default_button_prompt() -> String {
    "Choose an option:".to_string()
}

fn default_list_button() -> String {
    "View options".to_string()
}

fn default_list_section() -> String {
    "Options".to_string()
}

fn default_collection_prompt() -> String {
    "See the options below:".to_string()
}

fn default_collection_item() -> String {
    "Item".to_string()
}

fn default_collection_option() -> String {
    "Option".to_string()
}
