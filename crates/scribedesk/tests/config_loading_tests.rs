//! Table-driven tests for configuration loading and validation.

use std::io::Write;

use scribedesk::config::{load_config_from_str, load_config_or_default};
use scribedesk::load_config;

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "empty_object",
        config_json: "{}",
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "server": {
                "base_url": "https://transcricao.example.com",
                "connect_timeout_secs": 5,
                "request_timeout_secs": 600,
                "upload_chunk_bytes": 131072
            },
            "polling": { "interval_ms": 1500, "max_attempts": 400, "eviction_delay_ms": 0 },
            "events": { "capacity": 64 },
            "logging": { "level": "debug", "json": true }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: "{ not json",
        should_succeed: false,
        expected_error: Some("parse config JSON"),
    },
    ConfigTestCase {
        name: "unknown_top_level_field",
        config_json: r#"{ "workers": 4 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "zero_poll_interval",
        config_json: r#"{ "polling": { "interval_ms": 0 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "zero_max_attempts",
        config_json: r#"{ "polling": { "max_attempts": 0 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "interval_wrong_type",
        config_json: r#"{ "polling": { "interval_ms": "2s" } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_version",
        config_json: r#"{ "version": "2.0" }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version"),
    },
    ConfigTestCase {
        name: "base_url_without_scheme",
        config_json: r#"{ "server": { "base_url": "transcricao.example.com" } }"#,
        should_succeed: false,
        expected_error: Some("must start with http://"),
    },
];

#[test]
fn test_json_config_loading() {
    for case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);
        match (result, case.should_succeed) {
            (Ok(_), true) => {}
            (Err(e), false) => {
                if let Some(expected) = case.expected_error {
                    assert!(
                        e.to_string().contains(expected),
                        "[{}] expected error containing '{}', got '{}'",
                        case.name,
                        expected,
                        e
                    );
                }
            }
            (Ok(_), false) => panic!("[{}] expected failure, got success", case.name),
            (Err(e), true) => panic!("[{}] expected success, got error: {}", case.name, e),
        }
    }
}

#[test]
fn test_defaults_applied() {
    let config = load_config_from_str(r#"{ "polling": { "max_attempts": 10 } }"#).unwrap();
    assert_eq!(config.polling.max_attempts, 10);
    assert_eq!(config.polling.interval_ms, 2000);
    assert_eq!(config.polling.eviction_delay_ms, 1000);
    assert_eq!(config.events.capacity, 256);
    assert_eq!(config.server.base_url, "http://localhost:8000");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_yaml_file_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "server:\n  base_url: https://transcricao.example.com\npolling:\n  interval_ms: 500"
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.server.base_url, "https://transcricao.example.com");
    assert_eq!(config.polling.interval_ms, 500);
}

#[test]
fn test_explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_config_or_default(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}
