use bootkit_domain::constants::{ENV_PREFIX, ENV_SEPARATOR};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default settings file, resolved relative to the working directory (extension optional).
pub const DEFAULT_CONFIG_PATH: &str = "app";

#[bootkit_derive::bootkit_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Returns the layered builder behind [`load_config`] so callers can append sources
/// (a secret store, for instance) before building.
///
/// Layers, lowest precedence first:
/// 1. **Base file**: `path`, or [`DEFAULT_CONFIG_PATH`] when absent. The file is required.
/// 2. **Environment**: variables prefixed with `BOOTKIT__`; nesting uses double underscores
///    (`BOOTKIT__DATABASE__DEFAULT_CONNECTION` maps to `database.default_connection`).
#[must_use]
pub fn builder(path: Option<impl AsRef<Path>>) -> ConfigBuilder<DefaultState> {
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), |p| p.as_ref().to_path_buf());

    info!(path = %effective_path.display(), "Loading config");

    Config::builder().add_source(File::from(effective_path.as_path()).required(true)).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .convert_case(config::Case::Snake),
    )
}

/// Loads and deserializes the layered configuration into `T`.
///
/// # Errors
/// Fails when the file is missing or unreadable, or when the merged values do not
/// match the shape of `T`.
///
/// # Example
/// ```rust
/// use bootkit_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Ports {
///     http: u16,
/// }
///
/// let cfg: Ports = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let config = builder(path)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
