use crate::error::SecretsError;
use crate::options::VaultOptions;
use crate::transport::{HttpTransport, VaultTransport};
use bootkit_domain::constants::VAULT_TOKEN_MIN_TTL_SECS;
use config::{ConfigError, Map, Source, Value as ConfigValue};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// `config` source that reads one KV v2 secret from Vault.
///
/// Secret keys may use `:` or `.` as path separators (`connection_strings:main`).
/// Clones share one transport and one cached token.
#[derive(Clone)]
pub struct VaultSource {
    options: Arc<VaultOptions>,
    transport: Arc<dyn VaultTransport>,
    token: Arc<Mutex<Option<String>>>,
}

impl VaultSource {
    /// Source over the Vault HTTP API at `options.address`.
    ///
    /// # Errors
    /// [`SecretsError::MissingArgument`] for a blank option, or an HTTP client failure.
    pub fn new(options: VaultOptions) -> Result<Self, SecretsError> {
        options.validate()?;
        let transport = HttpTransport::new(options.address.clone())?;
        Self::with_transport(options, transport)
    }

    /// # Errors
    /// [`SecretsError::MissingArgument`] for a blank option.
    pub fn with_transport(options: VaultOptions, transport: impl VaultTransport + 'static) -> Result<Self, SecretsError> {
        options.validate()?;
        Ok(Self { options: Arc::new(options), transport: Arc::new(transport), token: Arc::default() })
    }

    #[must_use]
    pub fn options(&self) -> &VaultOptions {
        &self.options
    }

    /// Reads the secret as flat string entries.
    ///
    /// # Errors
    /// [`SecretsError::NoData`] when the path holds no data section, or any transport failure.
    /// An empty secret yields no entries.
    #[instrument(skip(self), fields(mount = %self.options.mount_point, path = %self.options.path))]
    pub fn load(&self) -> Result<Vec<(String, String)>, SecretsError> {
        let token = self.ensure_token()?;
        let data = self
            .transport
            .read_secret(&token, &self.options.mount_point, &self.options.path)?
            .ok_or_else(|| SecretsError::NoData { path: self.location().into(), context: None })?;

        let entries: Vec<(String, String)> = data
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key.replace(':', "."), value))
            })
            .collect();
        info!(entries = entries.len(), "Vault secrets loaded");
        Ok(entries)
    }

    /// Returns a usable token: renews a short-lived or non-renewable one, and logs in
    /// again when lookup or renewal fails.
    fn ensure_token(&self) -> Result<String, SecretsError> {
        let mut cached = self.token.lock();
        let Some(token) = cached.clone() else {
            return self.login(&mut cached);
        };

        let info = match self.transport.lookup_self(&token) {
            Ok(info) => info,
            Err(err) => {
                warn!(error = %err, "Vault token lookup failed; logging in again");
                return self.login(&mut cached);
            },
        };

        if info.renewable && info.ttl >= VAULT_TOKEN_MIN_TTL_SECS {
            return Ok(token);
        }
        debug!(renewable = info.renewable, ttl = info.ttl, "Renewing Vault token");
        match self.transport.renew_self(&token) {
            Ok(()) => Ok(token),
            Err(err) => {
                warn!(error = %err, "Vault token renewal failed; logging in again");
                self.login(&mut cached)
            },
        }
    }

    fn login(&self, cached: &mut Option<String>) -> Result<String, SecretsError> {
        let token = self.transport.login(&self.options.role_id, &self.options.secret_id)?;
        debug!("Vault AppRole login succeeded");
        *cached = Some(token.clone());
        Ok(token)
    }

    fn location(&self) -> String {
        format!("{}/{}", self.options.mount_point, self.options.path)
    }
}

impl Source for VaultSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, ConfigValue>, ConfigError> {
        let origin = format!("vault:{}", self.location());
        Ok(self.load()?.into_iter().map(|(key, value)| (key, ConfigValue::new(Some(&origin), value))).collect())
    }
}

impl fmt::Debug for VaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSource")
            .field("options", &self.options)
            .field("authenticated", &self.token.lock().is_some())
            .finish_non_exhaustive()
    }
}
