use bootkit_domain::config::{AppConfig, DatabaseConfig, LoggingConfig};
use bootkit_domain::{AppEnvironment, ExecutorKind};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let logging = LoggingConfig::default();
    assert!(logging.console);
    assert!(logging.path.is_none());
    assert_eq!(logging.max_files, 10);

    let db = DatabaseConfig::default();
    assert_eq!(db.default_connection, "default");
    assert_eq!(db.executor_kind, ExecutorKind::Default);

    let app = AppConfig::default();
    assert_eq!(app.environment, AppEnvironment::Development);
    assert!(app.vault.is_none());
    assert!(app.bootstrap.excluded_units.is_empty());
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "environment": "production",
        "database": { "default_connection": "main", "executor_kind": "stored_proc" },
        "connection_strings": { "main": "sqlite::memory:" },
        "bootstrap": { "excluded_units": ["app::LegacyUnit"] },
        "vault": { "address": "http://127.0.0.1:8200", "role_id": "r", "secret_id": "s", "path": "app" }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.environment, AppEnvironment::Production);
    assert_eq!(cfg.database.executor_kind, ExecutorKind::StoredProc);
    assert_eq!(cfg.connection_strings.get("main").map(String::as_str), Some("sqlite::memory:"));
    assert_eq!(cfg.bootstrap.excluded_units, vec!["app::LegacyUnit".to_owned()]);

    let vault = cfg.vault.as_ref().expect("vault section");
    assert_eq!(vault.mount_point, "secret");
    assert_eq!(vault.path, "app");
}
