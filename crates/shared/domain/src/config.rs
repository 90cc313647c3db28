use crate::constants::DEFAULT_VAULT_MOUNT;
use crate::data::ExecutorKind;
use crate::environment::AppEnvironment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration, as read from `app.toml` plus overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub environment: AppEnvironment,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub connection_strings: BTreeMap<String, String>,
    pub bootstrap: BootstrapConfig,
    pub vault: Option<VaultConfig>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Logging knobs consumed by the logger crate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`); `None` picks the environment default.
    pub level: Option<String>,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    pub env_filter: Option<String>,
}

/// Defaults for database executors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub default_connection: String,
    pub executor_kind: ExecutorKind,
}

/// Bootstrap knobs: which configuration units to leave out, and which modules to scan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub excluded_units: Vec<String>,
    pub modules: Vec<String>,
}

/// `HashiCorp` Vault `AppRole` access to a KV v2 secret.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    pub address: String,
    pub role_id: String,
    pub secret_id: String,
    #[serde(default = "default_mount_point")]
    pub mount_point: String,
    pub path: String,
}

fn default_mount_point() -> String {
    DEFAULT_VAULT_MOUNT.to_owned()
}

// --- Default ---

impl Default for AppConfigInner {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            logging: LoggingConfig::default(),
            database: DatabaseConfig::default(),
            connection_strings: BTreeMap::new(),
            bootstrap: BootstrapConfig::default(),
            vault: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: None, console: true, path: None, json: false, max_files: 10, env_filter: None }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { default_connection: "default".to_owned(), executor_kind: ExecutorKind::Default }
    }
}
