//! Vault HTTP client.
//!
//! Talks to the KV v2 engine and the handful of `sys/` and `auth/` endpoints
//! the setup wizard needs. Requests are blocking; each carries the session
//! token in the `X-Vault-Token` header when one is set.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::error::{OnboardError, Result};

use super::{join_path, Health, SecretStoreClient};

/// Default KV v2 mount.
pub const DEFAULT_MOUNT: &str = "secret";

const TOKEN_HEADER: &str = "x-vault-token";

/// Result of `sys/init`.
#[derive(Debug, Clone, Deserialize)]
pub struct InitResponse {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub keys_base64: Vec<String>,
    pub root_token: String,
}

/// Result of `sys/unseal`.
#[derive(Debug, Clone, Deserialize)]
pub struct SealStatus {
    pub sealed: bool,
    #[serde(default)]
    pub t: u32,
    #[serde(default)]
    pub progress: u32,
}

/// Subset of `auth/token/lookup-self` data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub ttl: u64,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct KeyList {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct AuthEnvelope {
    auth: LoginAuth,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Blocking client for one Vault server.
#[derive(Debug, Clone)]
pub struct VaultClient {
    addr: String,
    token: Option<String>,
    mount: String,
    client: Client,
    timeout: Duration,
}

impl VaultClient {
    /// Create a client with the default 10-second request timeout.
    pub fn new(addr: &str) -> Result<Self> {
        Self::with_timeout(addr, Duration::from_secs(10))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("vault-onboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(anyhow::Error::from)?;

        Ok(Self {
            addr: addr.trim_end_matches('/').to_string(),
            token: None,
            mount: DEFAULT_MOUNT.to_string(),
            client,
            timeout,
        })
    }

    /// Use the given session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a KV v2 mount other than `secret`.
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into().trim_matches('/').to_string();
        self
    }

    /// Replace the session token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// The session token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Server address without a trailing slash.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, api_path: &str) -> String {
        format!("{}/v1/{}", self.addr, api_path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                OnboardError::Connectivity {
                    addr: self.addr.clone(),
                    message: e.to_string(),
                }
            } else {
                OnboardError::Other(e.into())
            }
        })
    }

    fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(OnboardError::Auth {
                message: "no Vault token configured".to_string(),
            });
        }
        Ok(())
    }

    /// Turn a non-success response into an error.
    fn check(&self, response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .filter(|b| !b.errors.is_empty())
            .map(|b| b.errors.join("; "))
            .unwrap_or(body);
        let message = if detail.is_empty() {
            format!("{}: HTTP {}", what, status)
        } else {
            format!("{}: HTTP {}: {}", what, status, detail.trim())
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(OnboardError::Auth { message })
        } else {
            Err(OnboardError::Other(anyhow::anyhow!(message)))
        }
    }

    /// Initialize a fresh server.
    pub fn init(&self, secret_shares: u32, secret_threshold: u32) -> Result<InitResponse> {
        let request = self.client.put(self.url("sys/init")).json(&json!({
            "secret_shares": secret_shares,
            "secret_threshold": secret_threshold,
        }));
        let response = self.check(self.send(request)?, "sys/init")?;
        Ok(response.json().map_err(anyhow::Error::from)?)
    }

    /// Submit one unseal key share.
    pub fn unseal(&self, key: &str) -> Result<SealStatus> {
        let request = self
            .client
            .put(self.url("sys/unseal"))
            .json(&json!({ "key": key }));
        let response = self.check(self.send(request)?, "sys/unseal")?;
        Ok(response.json().map_err(anyhow::Error::from)?)
    }

    /// Exchange a GitHub token for a Vault token.
    pub fn github_login(&self, github_token: &str) -> Result<String> {
        let request = self
            .client
            .post(self.url("auth/github/login"))
            .json(&json!({ "token": github_token }));
        let response = self.send(request)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OnboardError::Auth {
                message: format!("GitHub login rejected (HTTP {}): {}", status, body.trim()),
            });
        }
        let envelope: AuthEnvelope = response.json().map_err(anyhow::Error::from)?;
        Ok(envelope.auth.client_token)
    }

    /// Look up the current token.
    pub fn lookup_self(&self) -> Result<TokenInfo> {
        self.require_token()?;
        let request = self.authed(self.client.get(self.url("auth/token/lookup-self")));
        let response = self.check(self.send(request)?, "token lookup")?;
        let envelope: DataEnvelope<TokenInfo> = response.json().map_err(anyhow::Error::from)?;
        Ok(envelope.data)
    }
}

impl SecretStoreClient for VaultClient {
    fn describe(&self) -> String {
        format!("{} ({} mount)", self.addr, self.mount)
    }

    fn mount(&self) -> &str {
        &self.mount
    }

    fn health(&self) -> Result<Health> {
        // Sealed and uninitialized servers answer with 503/501 but still
        // describe themselves in the body.
        let response = self.send(self.client.get(self.url("sys/health")))?;
        let status = response.status();
        let body = response.text().map_err(anyhow::Error::from)?;
        serde_json::from_str(&body).map_err(|_| OnboardError::Connectivity {
            addr: self.addr.clone(),
            message: format!("unexpected health response (HTTP {})", status),
        })
    }

    fn put_secret(&self, path: &str, key: &str, value: &str) -> Result<()> {
        self.require_token()?;
        let api_path = join_path(&[&self.mount, "data", path, key]);
        let request = self
            .authed(self.client.post(self.url(&api_path)))
            .json(&json!({ "data": { "value": value } }));
        self.check(self.send(request)?, &format!("write {}", api_path))?;
        Ok(())
    }

    fn list_keys(&self, path: &str) -> Result<Vec<String>> {
        self.require_token()?;
        let api_path = join_path(&[&self.mount, "metadata", path]);
        let url = format!("{}?list=true", self.url(&api_path));
        let response = self.send(self.authed(self.client.get(url)))?;

        // Vault answers 404 for a path with no keys.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = self.check(response, &format!("list {}", api_path))?;
        let envelope: DataEnvelope<KeyList> = response.json().map_err(anyhow::Error::from)?;
        Ok(envelope.data.keys)
    }
}
