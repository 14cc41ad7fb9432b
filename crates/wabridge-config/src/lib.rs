// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the WhatsApp to BLIP bridge.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`), an
//! XDG-style file hierarchy, `WABRIDGE_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use wabridge_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::WabridgeConfig;

const CONFIG_FILE: &str = "wabridge.toml";
const SYSTEM_CONFIG: &str = "/etc/wabridge/wabridge.toml";

/// Load configuration from the file hierarchy and environment, then validate it.
///
/// Figment errors are turned into diagnostics carrying source spans and
/// suggestions; validation errors are collected rather than failing fast.
pub fn load_and_validate() -> Result<WabridgeConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<WabridgeConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| CONFIG_FILE.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    if let Ok(content) = std::fs::read_to_string(SYSTEM_CONFIG) {
        sources.push((SYSTEM_CONFIG.to_string(), content));
    }

    sources
}
