use psn_domain::config::{AttributeDefaults, LoggingConfig, ServiceConfig, StorageConfig};
use psn_domain::constants::DEFAULT_ALPHABET;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
    assert!(logging.directory.is_none());

    let storage = StorageConfig::default();
    assert_eq!(storage.data_dir, std::path::PathBuf::from("data"));
    assert!(storage.create);

    let defaults = AttributeDefaults::default();
    assert_eq!(defaults.algorithm, "SHA2");
    assert_eq!(defaults.alphabet, DEFAULT_ALPHABET);
    assert_eq!(defaults.alphabet.chars().count() % 2, 0);
    assert_eq!(defaults.pseudonym_length, 32);
    assert!(defaults.padding_enabled);
    assert!(defaults.add_check_digit);
    assert!(!defaults.multiple_pseudonyms_allowed);
}

#[test]
fn service_config_deserializes_with_seeds() {
    let raw = json!({
        "logging": { "level": "debug", "json": true },
        "storage": { "data_dir": "/tmp/psn" },
        "defaults": { "algorithm": "MD5", "pseudonym_length": 16 },
        "domains": [
            { "name": "TS", "prefix": "TS-", "algorithm": "MD5", "pseudonym_length": 32 },
            { "name": "TS-SUB", "prefix": "TSS-", "parent": "TS", "salt": "pepper" }
        ]
    });

    let cfg: ServiceConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/tmp/psn"));
    assert_eq!(cfg.defaults.algorithm, "MD5");
    assert_eq!(cfg.defaults.padding_char, '0');

    assert_eq!(cfg.domains.len(), 2);
    assert_eq!(cfg.domains[0].attributes.pseudonym_length, Some(32));
    assert_eq!(cfg.domains[1].parent.as_deref(), Some("TS"));
    assert_eq!(cfg.domains[1].attributes.salt.as_deref(), Some("pepper"));
    assert!(cfg.domains[1].attributes.algorithm.is_none());
}

#[test]
fn empty_document_yields_defaults() {
    let cfg: ServiceConfig = serde_json::from_value(json!({})).expect("config deserialize");
    assert!(cfg.domains.is_empty());
    assert_eq!(cfg.defaults, AttributeDefaults::default());
}
