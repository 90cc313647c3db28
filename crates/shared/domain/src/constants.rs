//! Well-known keys shared by the settings provider and config files.

/// Key holding the runtime environment (`development`, `staging`, `production`).
pub const ENVIRONMENT_KEY: &str = "environment";

/// Section holding named connection strings.
pub const CONNECTION_STRINGS_SECTION: &str = "connection_strings";

/// Prefix for environment variable overrides (`BOOTKIT__DATABASE__DEFAULT_CONNECTION`).
pub const ENV_PREFIX: &str = "BOOTKIT";

/// Separator for nested environment variable overrides.
pub const ENV_SEPARATOR: &str = "__";

/// Default Vault KV v2 mount point.
pub const DEFAULT_VAULT_MOUNT: &str = "secret";

/// Remaining token lifetime (seconds) under which a Vault token is renewed.
pub const VAULT_TOKEN_MIN_TTL_SECS: u64 = 60;
