use crate::error::SecretsError;
use bootkit_domain::config::VaultConfig;
use bootkit_domain::constants::DEFAULT_VAULT_MOUNT;

/// AppRole credentials and the KV v2 secret to read.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultOptions {
    /// Server address, e.g. `https://vault.internal:8200`.
    pub address: String,
    pub role_id: String,
    pub secret_id: String,
    /// KV v2 mount point; `secret` unless set.
    pub mount_point: String,
    /// Secret path below the mount, e.g. `orders/config`.
    pub path: String,
}

impl VaultOptions {
    /// # Errors
    /// [`SecretsError::MissingArgument`] naming the first blank option.
    pub fn validate(&self) -> Result<(), SecretsError> {
        let fields = [
            ("address", &self.address),
            ("role_id", &self.role_id),
            ("secret_id", &self.secret_id),
            ("mount_point", &self.mount_point),
            ("path", &self.path),
        ];
        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(SecretsError::MissingArgument { name: name.into(), context: None }),
            None => Ok(()),
        }
    }
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self {
            address: String::new(),
            role_id: String::new(),
            secret_id: String::new(),
            mount_point: DEFAULT_VAULT_MOUNT.to_owned(),
            path: String::new(),
        }
    }
}

impl From<&VaultConfig> for VaultOptions {
    fn from(config: &VaultConfig) -> Self {
        Self {
            address: config.address.clone(),
            role_id: config.role_id.clone(),
            secret_id: config.secret_id.clone(),
            mount_point: config.mount_point.clone(),
            path: config.path.clone(),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for VaultOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultOptions")
            .field("address", &self.address)
            .field("mount_point", &self.mount_point)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> VaultOptions {
        VaultOptions {
            address: "http://127.0.0.1:8200".into(),
            role_id: "role".into(),
            secret_id: "secret".into(),
            path: "orders/config".into(),
            ..VaultOptions::default()
        }
    }

    #[test]
    fn mount_point_defaults_to_secret() {
        assert_eq!(VaultOptions::default().mount_point, "secret");
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn every_blank_option_is_named() {
        let cases: [(&str, fn(&mut VaultOptions)); 5] = [
            ("address", |o| o.address.clear()),
            ("role_id", |o| o.role_id = "  ".into()),
            ("secret_id", |o| o.secret_id.clear()),
            ("mount_point", |o| o.mount_point.clear()),
            ("path", |o| o.path.clear()),
        ];
        for (expected, blank) in cases {
            let mut options = complete();
            blank(&mut options);
            match options.validate() {
                Err(SecretsError::MissingArgument { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected MissingArgument for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn debug_hides_credentials() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("role"));
        assert!(rendered.contains("orders/config"));
    }
}
