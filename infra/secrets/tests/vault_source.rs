use bootkit_kernel::{AppSettings, Settings};
use bootkit_secrets::{SecretsError, TokenInfo, VaultConfigExt, VaultOptions, VaultSource, VaultTransport};
use config::Source;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Scripted Vault: every call is recorded and answered from the fields below.
#[derive(Default)]
struct Fake {
    calls: Mutex<Vec<String>>,
    logins: Mutex<u32>,
    token_info: Mutex<Option<TokenInfo>>,
    renew_fails: bool,
    secret: Option<Map<String, Value>>,
}

impl Fake {
    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

struct Shared(Arc<Fake>);

impl VaultTransport for Shared {
    fn login(&self, role_id: &str, secret_id: &str) -> Result<String, SecretsError> {
        let mut logins = self.0.logins.lock();
        *logins += 1;
        self.0.record(format!("login:{role_id}:{secret_id}"));
        Ok(format!("token-{logins}"))
    }

    fn lookup_self(&self, token: &str) -> Result<TokenInfo, SecretsError> {
        self.0.record(format!("lookup:{token}"));
        (*self.0.token_info.lock()).ok_or_else(|| "token revoked".into())
    }

    fn renew_self(&self, token: &str) -> Result<(), SecretsError> {
        self.0.record(format!("renew:{token}"));
        if self.0.renew_fails {
            return Err(SecretsError::Vault { message: "permission denied".into(), context: None });
        }
        Ok(())
    }

    fn read_secret(&self, token: &str, mount_point: &str, path: &str) -> Result<Option<Map<String, Value>>, SecretsError> {
        self.0.record(format!("read:{token}:{mount_point}/{path}"));
        Ok(self.0.secret.clone())
    }
}

fn options() -> VaultOptions {
    VaultOptions {
        address: "http://vault.test:8200".into(),
        role_id: "role".into(),
        secret_id: "sid".into(),
        path: "orders/config".into(),
        ..VaultOptions::default()
    }
}

fn secret() -> Option<Map<String, Value>> {
    match json!({
        "connection_strings:orders": "sqlite://orders.db",
        "database.default_connection": "orders",
        "pool_size": 8,
        "retired": null,
    }) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn source(fake: &Arc<Fake>) -> VaultSource {
    VaultSource::with_transport(options(), Shared(Arc::clone(fake))).unwrap()
}

fn healthy() -> Mutex<Option<TokenInfo>> {
    Mutex::new(Some(TokenInfo { renewable: true, ttl: 3600 }))
}

#[test]
fn first_load_logs_in_and_reads_the_secret() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: secret(), ..Fake::default() });

    let mut entries = source(&fake).load().unwrap();
    entries.sort();

    assert_eq!(
        entries,
        [
            ("connection_strings.orders".to_owned(), "sqlite://orders.db".to_owned()),
            ("database.default_connection".to_owned(), "orders".to_owned()),
            ("pool_size".to_owned(), "8".to_owned()),
        ]
    );
    assert_eq!(*fake.calls.lock(), ["login:role:sid", "read:token-1:secret/orders/config"]);
}

#[test]
fn healthy_token_is_reused() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: secret(), ..Fake::default() });
    let source = source(&fake);

    source.load().unwrap();
    source.clone().load().unwrap();

    assert_eq!(*fake.logins.lock(), 1);
    assert_eq!(fake.calls.lock()[2..], ["lookup:token-1", "read:token-1:secret/orders/config"]);
}

#[test]
fn short_lived_token_is_renewed() {
    let fake = Arc::new(Fake {
        token_info: Mutex::new(Some(TokenInfo { renewable: true, ttl: 59 })),
        secret: secret(),
        ..Fake::default()
    });
    let source = source(&fake);

    source.load().unwrap();
    source.load().unwrap();

    assert_eq!(fake.calls.lock()[2..], ["lookup:token-1", "renew:token-1", "read:token-1:secret/orders/config"]);
}

#[test]
fn failed_renewal_falls_back_to_login() {
    let fake = Arc::new(Fake {
        token_info: Mutex::new(Some(TokenInfo { renewable: false, ttl: 3600 })),
        renew_fails: true,
        secret: secret(),
        ..Fake::default()
    });
    let source = source(&fake);

    source.load().unwrap();
    source.load().unwrap();

    assert_eq!(
        fake.calls.lock()[2..],
        ["lookup:token-1", "renew:token-1", "login:role:sid", "read:token-2:secret/orders/config"]
    );
}

#[test]
fn revoked_token_logs_in_again() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: secret(), ..Fake::default() });
    let source = source(&fake);
    source.load().unwrap();
    *fake.token_info.lock() = None;

    source.load().unwrap();

    assert_eq!(*fake.logins.lock(), 2);
}

#[test]
fn missing_secret_is_an_error() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: None, ..Fake::default() });

    let err = source(&fake).load().unwrap_err();

    assert_eq!(err.kind(), "NoData");
    assert!(err.to_string().contains("secret/orders/config"), "{err}");
}

#[test]
fn empty_secret_is_an_empty_layer() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: Some(Map::new()), ..Fake::default() });

    assert!(source(&fake).load().unwrap().is_empty());

    let config = config::Config::builder()
        .set_override("environment", "production")
        .unwrap()
        .add_vault_source(source(&fake))
        .build()
        .unwrap();
    assert!(AppSettings::new(config).unwrap().is_production());
}

#[test]
fn blank_options_are_rejected_up_front() {
    let fake = Arc::new(Fake::default());
    let err = VaultSource::with_transport(VaultOptions { path: " ".into(), ..options() }, Shared(Arc::clone(&fake)))
        .unwrap_err();

    assert!(matches!(err, SecretsError::MissingArgument { ref name, .. } if name == "path"));
    assert!(fake.calls.lock().is_empty());

    let err = config::Config::builder().add_vault(|o| o.address = "http://vault.test".into()).unwrap_err();
    assert!(matches!(err, SecretsError::MissingArgument { ref name, .. } if name == "role_id"));
}

#[test]
fn secrets_layer_into_settings() {
    let fake = Arc::new(Fake { token_info: healthy(), secret: secret(), ..Fake::default() });

    let config = config::Config::builder()
        .set_override("environment", "staging")
        .unwrap()
        .add_vault_source(source(&fake))
        .build()
        .unwrap();
    let settings = AppSettings::new(config).unwrap();

    assert_eq!(settings.connection_string("orders").unwrap(), "sqlite://orders.db");
    assert_eq!(settings.get::<u32>("pool_size").unwrap(), 8);
    assert_eq!(source(&fake).collect().unwrap().len(), 3);
}

#[test]
fn missing_data_fails_the_config_build() {
    let fake = Arc::new(Fake { token_info: healthy(), ..Fake::default() });

    let err = config::Config::builder().add_vault_source(source(&fake)).build().unwrap_err();

    assert!(err.to_string().contains("No secret data found"), "{err}");
}
