use psn_logger::{LevelFilter, Logger};

#[test]
fn console_only_logger_holds_no_file_guard() {
    let logger = Logger::builder()
        .name("psn-console-only")
        .console(true)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
}
