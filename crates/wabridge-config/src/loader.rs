// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! `./wabridge.toml` > `~/.config/wabridge/wabridge.toml` > `/etc/wabridge/wabridge.toml`,
//! with `WABRIDGE_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WabridgeConfig;
use crate::{CONFIG_FILE, SYSTEM_CONFIG};

/// Config sections, in the order env var names are matched against.
const SECTIONS: &[&str] = &["server", "agent", "whatsapp", "media", "routing", "labels"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wabridge/wabridge.toml`
/// 3. `~/.config/wabridge/wabridge.toml`
/// 4. `./wabridge.toml`
/// 5. `WABRIDGE_*` environment variables
pub fn load_config() -> Result<WabridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<WabridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WabridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WabridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WabridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full provider stack before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(WabridgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(path) = user_config_path() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Toml::file(CONFIG_FILE)).merge(env_provider())
}

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wabridge").join(CONFIG_FILE))
}

/// Environment provider mapping `WABRIDGE_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `WABRIDGE_MEDIA_API_KEY` maps to `media.api_key`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("WABRIDGE_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
