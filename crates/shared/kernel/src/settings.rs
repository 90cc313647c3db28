//! Typed access to the application settings.
//!
//! [`Settings`] is the contract the bootstrap and the configuration units see;
//! [`AppSettings`] is the implementation over a built [`config::Config`].

use bootkit_domain::AppEnvironment;
use bootkit_domain::constants::{CONNECTION_STRINGS_SECTION, ENVIRONMENT_KEY};
use config::Config;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

#[bootkit_derive::bootkit_error]
pub enum SettingsError {
    #[error("Setting not found{}: {key}", format_context(.context))]
    NotFound { key: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unable to resolve the application environment{}: {message}", format_context(.context))]
    Environment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Setting has an unexpected shape{}: {source}", format_context(.context))]
    Conversion { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Read access to application settings.
///
/// The trait stays object safe: [`Settings::get`] is only available on sized implementors.
pub trait Settings {
    /// The environment the application runs in.
    fn environment(&self) -> AppEnvironment;

    /// Connection string registered under `name`.
    ///
    /// # Errors
    /// [`SettingsError::NotFound`] when the entry is missing or blank.
    fn connection_string(&self, name: &str) -> Result<String, SettingsError>;

    /// Deserializes the value or section at `key`. Both `:` and `.` separate path segments.
    ///
    /// # Errors
    /// [`SettingsError::NotFound`] for a missing key, [`SettingsError::Conversion`] when the
    /// value does not fit `T`.
    fn get<T>(&self, key: &str) -> Result<T, SettingsError>
    where
        T: DeserializeOwned,
        Self: Sized;

    fn is_development(&self) -> bool {
        self.environment().is_development()
    }

    fn is_staging(&self) -> bool {
        self.environment().is_staging()
    }

    fn is_production(&self) -> bool {
        self.environment().is_production()
    }
}

/// Settings backed by the layered `config` crate tree.
#[derive(Debug, Clone)]
pub struct AppSettings {
    config: Arc<Config>,
    environment: AppEnvironment,
}

impl AppSettings {
    /// Wraps a built configuration, resolving the `environment` key eagerly.
    ///
    /// # Errors
    /// [`SettingsError::Environment`] when the key is missing or names an unknown environment.
    pub fn new(config: Config) -> Result<Self, SettingsError> {
        let raw = config.get_string(ENVIRONMENT_KEY).map_err(|_| SettingsError::Environment {
            message: format!("'{ENVIRONMENT_KEY}' is not set").into(),
            context: None,
        })?;

        let environment =
            AppEnvironment::from_str(raw.trim()).map_err(|_| SettingsError::Environment {
                message: format!("'{raw}' is not a known environment").into(),
                context: None,
            })?;

        Ok(Self { config: Arc::new(config), environment })
    }

    /// Loads settings from the layered file + environment sources.
    ///
    /// # Errors
    /// Propagates build failures as [`SettingsError::Conversion`] and environment failures
    /// as in [`AppSettings::new`].
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, SettingsError> {
        let config = crate::config::builder(path).build().context("Failed to build settings")?;
        Self::new(config)
    }

    /// The underlying configuration tree.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Settings for AppSettings {
    fn environment(&self) -> AppEnvironment {
        self.environment
    }

    fn connection_string(&self, name: &str) -> Result<String, SettingsError> {
        let key = format!("{CONNECTION_STRINGS_SECTION}.{name}");
        match self.config.get_string(&key) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SettingsError::NotFound {
                key: key.into(),
                context: Some("Connection string".into()),
            }),
        }
    }

    fn get<T>(&self, key: &str) -> Result<T, SettingsError>
    where
        T: DeserializeOwned,
    {
        let key = normalize_key(key);
        self.config.get::<T>(&key).map_err(|err| match err {
            config::ConfigError::NotFound(_) => SettingsError::NotFound { key: key.into(), context: None },
            other => SettingsError::Conversion { source: other, context: Some(key.into()) },
        })
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().replace(':', ".")
}
