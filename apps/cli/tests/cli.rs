use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("psn.toml");
    let body = format!(
        r#"
[logging]
level = "warn"

[storage]
data_dir = "{data}"

[[domains]]
name = "TS"
prefix = "TS-"
algorithm = "MD5"
alphabet = "0123456789ABCDEF"
pseudonym_length = 32

[[domains]]
name = "TS-SITE"
prefix = "TSS-"
parent = "TS"
pseudonym_length = 16
"#,
        data = dir.join("data").display().to_string().replace('\\', "/"),
    );
    std::fs::write(&path, body).unwrap();
    path
}

fn psn() -> Command {
    Command::new(env!("CARGO_BIN_EXE_psn"))
}

#[test]
fn check_digit_append_and_validate() {
    psn()
        .args(["check-digit", "append", "--algorithm", "CONSECUTIVE", "7992739871"])
        .assert()
        .success()
        .stdout("79927398713\n");

    psn()
        .args(["check-digit", "validate", "--algorithm", "consecutive", "79927398713"])
        .assert()
        .success()
        .stdout("valid\n");

    psn()
        .args(["check-digit", "validate", "--algorithm", "consecutive", "79927398714"])
        .assert()
        .code(1)
        .stdout("invalid\n");

    psn()
        .args(["check-digit", "validate", "--algorithm", "consecutive", "7992739871X"])
        .assert()
        .code(2)
        .stdout("unverifiable\n");
}

#[test]
fn issue_resolve_and_path() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_config(tmp.path());

    psn()
        .arg("--config")
        .arg(&config)
        .args(["issue", "TS", "1234356", "--id-type", "MRN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pseudonym\": \"TS-"))
        .stdout(predicate::str::contains("\"reused\": false"));

    psn()
        .arg("--config")
        .arg(&config)
        .args(["resolve", "TS-SITE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"MD5\""))
        .stdout(predicate::str::contains("\"inherited\": true"));

    psn()
        .arg("--config")
        .arg(&config)
        .args(["path", "TS-SITE", "TS"])
        .assert()
        .success()
        .stdout("TS-SITE -> TS\n");

    psn()
        .arg("--config")
        .arg(&config)
        .args(["issue", "NOPE", "1"])
        .assert()
        .failure();
}

#[test]
fn environment_overrides_the_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_config(tmp.path());
    let elsewhere = tmp.path().join("elsewhere");

    psn()
        .arg("--config")
        .arg(&config)
        .env("PSN__STORAGE__DATA_DIR", &elsewhere)
        .args(["issue", "TS", "42"])
        .assert()
        .success();

    assert!(elsewhere.is_dir());
    assert!(!tmp.path().join("data").exists());
}
