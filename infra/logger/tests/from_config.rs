use bootkit_domain::AppEnvironment;
use bootkit_domain::config::LoggingConfig;
use bootkit_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn production_config_writes_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let config = LoggingConfig {
        level: Some("info".to_owned()),
        console: false,
        path: Some(log_dir.clone()),
        ..LoggingConfig::default()
    };

    let logger = Logger::from_config("bootkit-from-config", &config, AppEnvironment::Production)?;
    assert!(logger.guard().is_some());

    tracing::info!(order_id = 7, "order accepted");
    tracing::debug!("filtered out at info");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    let line = contents.lines().find(|l| l.contains("order accepted")).expect("event should be logged");
    assert!(line.trim_start().starts_with('{'), "expected JSON, got {line}");
    assert!(line.contains("\"order_id\":7"));
    assert!(!contents.contains("filtered out at info"));

    Ok(())
}
