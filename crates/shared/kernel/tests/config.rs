use psn_kernel::config::{ConfigError, load_config};
use psn_kernel::domain::config::ServiceConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_toml_file_with_domain_seeds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("psn.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"

[storage]
data_dir = "/var/lib/psn"

[defaults]
algorithm = "MD5"
pseudonym_length = 32

[[domains]]
name = "TS"
prefix = "TS-"
alphabet = "0123456789ABCDEF"
add_check_digit = true

[[domains]]
name = "TS-CHILD"
prefix = "TSC-"
parent = "TS"
padding_char = "X"
"#,
    )
    .unwrap();

    let cfg: ServiceConfig = load_config(Some(&path)).unwrap();

    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/var/lib/psn"));
    assert_eq!(cfg.defaults.algorithm, "MD5");
    assert_eq!(cfg.domains.len(), 2);
    assert_eq!(cfg.domains[0].attributes.alphabet.as_deref(), Some("0123456789ABCDEF"));
    assert_eq!(cfg.domains[0].attributes.add_check_digit, Some(true));
    assert_eq!(cfg.domains[1].attributes.padding_char, Some('X'));
    assert_eq!(cfg.domains[1].parent.as_deref(), Some("TS"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_config::<ServiceConfig>(Some(dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ConfigError::Config { .. }));
    assert_eq!(err.context_str(), Some("Failed to build config"));
}

#[test]
fn no_file_falls_back_to_defaults() {
    let cfg: ServiceConfig = load_config(None::<&str>).unwrap();
    assert!(cfg.domains.is_empty());
    assert_eq!(cfg.defaults.pseudonym_length, 32);
}
