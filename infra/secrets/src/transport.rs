//! Vault HTTP API access.

use crate::error::{SecretsError, SecretsErrorExt};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::trace;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// What Vault reports about the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub renewable: bool,
    /// Remaining lifetime in seconds.
    pub ttl: u64,
}

/// The Vault calls a [`VaultSource`](crate::VaultSource) needs.
pub trait VaultTransport: Send + Sync {
    /// Logs in with AppRole and returns a client token.
    fn login(&self, role_id: &str, secret_id: &str) -> Result<String, SecretsError>;

    fn lookup_self(&self, token: &str) -> Result<TokenInfo, SecretsError>;

    fn renew_self(&self, token: &str) -> Result<(), SecretsError>;

    /// Reads the latest version of a KV v2 secret; `None` when nothing is stored there.
    fn read_secret(&self, token: &str, mount_point: &str, path: &str)
    -> Result<Option<Map<String, Value>>, SecretsError>;
}

/// [`VaultTransport`] over the Vault HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    address: String,
}

impl HttpTransport {
    /// Builds a transport with its own blocking client.
    ///
    /// The blocking client must not be created or dropped on an async runtime thread.
    ///
    /// # Errors
    /// [`SecretsError::Http`] when the HTTP client cannot be initialized.
    pub fn new(address: impl Into<String>) -> Result<Self, SecretsError> {
        let client = Client::builder().build().context("Failed to build Vault HTTP client")?;
        Ok(Self::with_client(client, address))
    }

    pub fn with_client(client: Client, address: impl Into<String>) -> Self {
        Self { client, address: address.into().trim_end_matches('/').to_owned() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }

    fn send<T>(request: RequestBuilder, what: &'static str) -> Result<Option<T>, SecretsError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.send().context(what)?;
        let status = response.status();
        trace!(%status, what, "Vault response");
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SecretsError::Vault { message: format!("{what} returned {status}").into(), context: None });
        }
        response.json::<T>().map(Some).context(what)
    }

    fn require<T>(value: Option<T>, what: &'static str) -> Result<T, SecretsError> {
        value.ok_or_else(|| SecretsError::Vault { message: format!("{what} returned 404 Not Found").into(), context: None })
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: LoginAuth,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    data: LookupData,
}

#[derive(Deserialize)]
struct LookupData {
    #[serde(default)]
    renewable: bool,
    #[serde(default)]
    ttl: u64,
}

#[derive(Deserialize)]
struct SecretResponse {
    data: Option<SecretData>,
}

#[derive(Deserialize)]
struct SecretData {
    data: Option<Map<String, Value>>,
}

impl VaultTransport for HttpTransport {
    fn login(&self, role_id: &str, secret_id: &str) -> Result<String, SecretsError> {
        let request =
            self.client.post(self.url("auth/approle/login")).json(&json!({ "role_id": role_id, "secret_id": secret_id }));
        let response: LoginResponse = Self::require(Self::send(request, "AppRole login")?, "AppRole login")?;
        Ok(response.auth.client_token)
    }

    fn lookup_self(&self, token: &str) -> Result<TokenInfo, SecretsError> {
        let request = self.client.get(self.url("auth/token/lookup-self")).header(TOKEN_HEADER, token);
        let response: LookupResponse = Self::require(Self::send(request, "Token lookup")?, "Token lookup")?;
        Ok(TokenInfo { renewable: response.data.renewable, ttl: response.data.ttl })
    }

    fn renew_self(&self, token: &str) -> Result<(), SecretsError> {
        let request = self.client.post(self.url("auth/token/renew-self")).header(TOKEN_HEADER, token).json(&json!({}));
        Self::require(Self::send::<Value>(request, "Token renewal")?, "Token renewal").map(drop)
    }

    fn read_secret(
        &self,
        token: &str,
        mount_point: &str,
        path: &str,
    ) -> Result<Option<Map<String, Value>>, SecretsError> {
        let url = self.url(&format!("{}/data/{}", mount_point.trim_matches('/'), path.trim_matches('/')));
        let request = self.client.get(url).header(TOKEN_HEADER, token);
        let response: Option<SecretResponse> = Self::send(request, "Secret read")?;
        Ok(response.and_then(|r| r.data).and_then(|d| d.data))
    }
}
