use psn_domain::config::LoggingConfig;
use psn_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn config_with_directory_writes_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let config = LoggingConfig {
        name: "psn-file-logging".to_owned(),
        level: "debug".to_owned(),
        console: false,
        json: true,
        directory: Some(log_dir.clone()),
        env_filter: None,
    };
    let logger = Logger::from_config(&config)?;
    assert!(logger.guard().is_some());

    tracing::info!(domain = 7_u64, "pseudonym issued");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let first = contents.lines().next().expect("at least one line");
    let line: serde_json::Value = serde_json::from_str(first)?;
    assert_eq!(line["fields"]["message"], "pseudonym issued");

    Ok(())
}
