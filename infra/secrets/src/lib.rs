//! # Vault Secrets
//!
//! A [`config`] source that logs in to HashiCorp Vault with AppRole and reads one KV v2
//! secret into the configuration tree.
//!
//! Tokens are looked up before each read: a token that is not renewable or expires within
//! a minute is renewed, and a failed renewal falls back to a fresh login.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bootkit_secrets::VaultConfigExt;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = config::Config::builder()
//!     .add_vault(|options| {
//!         options.address = "https://vault.internal:8200".into();
//!         options.role_id = "orders-role".into();
//!         options.secret_id = "s3cr3t".into();
//!         options.path = "orders/config".into();
//!     })?
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod source;
mod transport;

pub use error::{SecretsError, SecretsErrorExt};
pub use options::VaultOptions;
pub use source::VaultSource;
pub use transport::{HttpTransport, TokenInfo, VaultTransport};

use config::ConfigBuilder;
use config::builder::DefaultState;

/// Adds Vault to a [`ConfigBuilder`].
pub trait VaultConfigExt: Sized {
    /// Configures [`VaultOptions`] in place and adds a [`VaultSource`] over HTTP.
    ///
    /// # Errors
    /// [`SecretsError::MissingArgument`] for a blank option.
    fn add_vault(self, configure: impl FnOnce(&mut VaultOptions)) -> Result<Self, SecretsError>;

    fn add_vault_source(self, source: VaultSource) -> Self;
}

impl VaultConfigExt for ConfigBuilder<DefaultState> {
    fn add_vault(self, configure: impl FnOnce(&mut VaultOptions)) -> Result<Self, SecretsError> {
        let mut options = VaultOptions::default();
        configure(&mut options);
        Ok(self.add_vault_source(VaultSource::new(options)?))
    }

    fn add_vault_source(self, source: VaultSource) -> Self {
        self.add_source(source)
    }
}
