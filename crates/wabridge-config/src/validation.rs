// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks the constraints serde attributes cannot express. All failures are
//! collected so the operator sees every problem in one run.

use crate::diagnostic::ConfigError;
use crate::model::WabridgeConfig;

pub fn validate_config(config: &WabridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    if let Some(token) = &config.server.bearer_token
        && token.trim().is_empty()
    {
        fail("server.bearer_token must not be blank when set".to_string());
    }

    if config.agent.domain.trim().is_empty() {
        fail("agent.domain must not be empty".to_string());
    }
    if config.agent.bot_domain.trim().is_empty() {
        fail("agent.bot_domain must not be empty".to_string());
    }
    if config.agent.guest_instance.trim().is_empty() {
        fail("agent.guest_instance must not be empty".to_string());
    }
    if config.agent.inbound_buffer == 0 {
        fail("agent.inbound_buffer must be at least 1".to_string());
    }

    let timeouts = [
        ("agent.connect_timeout_secs", config.agent.connect_timeout_secs),
        ("agent.send_timeout_secs", config.agent.send_timeout_secs),
        ("whatsapp.request_timeout_secs", config.whatsapp.request_timeout_secs),
        ("media.resolve_timeout_secs", config.media.resolve_timeout_secs),
        ("media.download_timeout_secs", config.media.download_timeout_secs),
        ("media.upload_timeout_secs", config.media.upload_timeout_secs),
    ];
    for (key, secs) in timeouts {
        if secs == 0 {
            fail(format!("{key} must be greater than 0"));
        }
    }

    if !is_http_url(&config.whatsapp.api_base_url) {
        fail(format!(
            "whatsapp.api_base_url `{}` must be an http(s) URL",
            config.whatsapp.api_base_url
        ));
    }

    if let Some(store_url) = &config.media.store_url {
        if !is_http_url(store_url) {
            fail(format!("media.store_url `{store_url}` must be an http(s) URL"));
        }
        if config.media.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            fail("media.api_key is required when media.store_url is set".to_string());
        }
    }

    if config.media.tenant_header.trim().is_empty() {
        fail("media.tenant_header must not be empty".to_string());
    }

    if config.routing.max_entries == 0 {
        fail("routing.max_entries must be at least 1".to_string());
    }
    if config.routing.entry_ttl_secs == 0 {
        fail("routing.entry_ttl_secs must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}
