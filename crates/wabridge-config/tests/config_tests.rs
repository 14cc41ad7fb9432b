// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and diagnostics.

use wabridge_config::diagnostic::ConfigError;
use wabridge_config::model::WabridgeConfig;
use wabridge_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
bearer_token = "gateway-token"
log_level = "debug"

[agent]
domain = "example.io"
bot_domain = "bots.example.io"
connect_timeout_secs = 5
inbound_buffer = 32

[whatsapp]
api_base_url = "http://localhost:9000/v20.0"

[media]
store_url = "https://store.example.com/upload"
api_key = "store-key"
tenant_header = "X-Namespace"

[routing]
max_entries = 50
entry_ttl_secs = 60

[labels]
list_button = "Ver opções"
list_section = "Opções"
collection_prompt = "Veja as opções abaixo:"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.bearer_token.as_deref(), Some("gateway-token"));
    assert_eq!(config.agent.domain, "example.io");
    assert_eq!(config.agent.bot_domain, "bots.example.io");
    assert_eq!(config.agent.connect_timeout().as_secs(), 5);
    assert_eq!(config.agent.send_timeout_secs, 10);
    assert_eq!(config.agent.inbound_buffer, 32);
    assert_eq!(config.whatsapp.api_base_url, "http://localhost:9000/v20.0");
    assert_eq!(config.media.tenant_header, "X-Namespace");
    assert_eq!(config.routing.max_entries, 50);
    assert_eq!(config.labels.list_button, "Ver opções");
    assert_eq!(config.labels.button_prompt, "Choose an option:");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3001);
    assert!(config.server.bearer_token.is_none());
    assert_eq!(config.agent.domain, "0mn.io");
    assert_eq!(config.agent.bot_domain, "msging.net");
    assert_eq!(config.agent.guest_instance, "default");
    assert_eq!(config.whatsapp.api_base_url, "https://graph.facebook.com/v20.0");
    assert!(config.media.store_url.is_none());
    assert_eq!(config.media.upload_timeout_secs, 120);
    assert_eq!(config.routing.entry_ttl_secs, 86_400);
    assert_eq!(config.labels.collection_item, "Item");
}

#[test]
fn dotted_override_maps_underscored_key() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: WabridgeConfig = Figment::new()
        .merge(Serialized::defaults(WabridgeConfig::default()))
        .merge(Toml::string("[media]\ntenant_header = \"X-From-File\"\n"))
        .merge(("media.api_key", "from-env"))
        .merge(("media.tenant_header", "X-From-Env"))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.media.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.media.tenant_header, "X-From-Env");
}

#[test]
fn missing_config_files_are_skipped() {
    let config =
        wabridge_config::load_config_from_path(std::path::Path::new("/nonexistent/wabridge.toml"))
            .expect("missing file should be skipped");
    assert_eq!(config.server.port, 3001);
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[logging]\nlevel = \"debug\"\n")
        .expect_err("unknown section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_key_carries_suggestion_and_valid_keys() {
    let toml = r#"
[agent]
bot_domian = "msging.net"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "bot_domian"
                && suggestion.as_deref() == Some("bot_domain")
                && valid_keys.contains("guest_instance")
        })
    });
    assert!(found, "expected UnknownKey for bot_domian, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[server]
port = "not-a-number"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_are_returned_together() {
    let toml = r#"
[server]
port = 0

[media]
store_url = "https://store.example.com/upload"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn config_error_renders_with_help() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port, bearer_token, log_level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `port`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("prot"));
}
