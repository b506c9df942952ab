//! HTTP client for registry lookups.
//!
//! Without credentials requests go out unauthenticated. With an
//! [`OpenIdcConfig`] every request carries a bearer token obtained through a
//! password grant:
//!
//! ```text
//! POST {token_url}
//! Authorization: Basic base64({client_id}:)
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=password&username=..&password=..&scope=openid+profile+email+groups
//! ```
//!
//! The token is cached and fetched again once it is within ten seconds of
//! expiry. Refreshes are serialised so concurrent lookups share one exchange.

use reqwest::{Client, Response, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subscriber_dns_domain::{DomainError, OpenIdcConfig, RegistryConfig};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Scopes requested with every token.
pub const TOKEN_SCOPES: [&str; 4] = ["openid", "profile", "email", "groups"];

/// Margin before expiry at which a cached token is considered stale.
const EXPIRY_DELTA: Duration = Duration::from_secs(10);

pub struct RegistryHttpClient {
    client: Client,
    credentials: Option<TokenSource>,
}

impl RegistryHttpClient {
    pub fn new(openidc: Option<&OpenIdcConfig>, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::ConfigInvalid(format!("Failed to build HTTP client: {}", e))
            })?;

        let credentials = openidc.map(TokenSource::new).transpose()?;
        if credentials.is_some() {
            info!("Registry requests will carry bearer tokens");
        }

        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, DomainError> {
        Self::new(
            config.openidc.as_ref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// GET `url`, attaching a bearer token when credentials are configured.
    pub async fn get(&self, url: Url) -> Result<Response, DomainError> {
        let mut request = self.client.get(url.clone());

        if let Some(source) = &self.credentials {
            let token = source.token(&self.client).await?;
            request = request.bearer_auth(token);
        }

        request.send().await.map_err(|e| {
            DomainError::UpstreamUnreachable(format!("GET {} failed: {}", url, e))
        })
    }
}

#[derive(Debug, Clone)]
struct BearerToken {
    access_token: Arc<str>,
    expires_at: Option<Instant>,
}

impl BearerToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now + EXPIRY_DELTA < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct TokenSource {
    token_url: Url,
    client_id: String,
    username: String,
    password: String,
    cached: Mutex<Option<BearerToken>>,
}

impl TokenSource {
    fn new(config: &OpenIdcConfig) -> Result<Self, DomainError> {
        let token_url = Url::parse(&config.token_url).map_err(|e| {
            DomainError::ConfigInvalid(format!("invalid token URL '{}': {}", config.token_url, e))
        })?;

        Ok(Self {
            token_url,
            client_id: config.client_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            cached: Mutex::new(None),
        })
    }

    async fn token(&self, client: &Client) -> Result<Arc<str>, DomainError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(Arc::clone(&token.access_token));
        }

        let token = self.exchange(client).await?;
        let access_token = Arc::clone(&token.access_token);
        *cached = Some(token);
        Ok(access_token)
    }

    async fn exchange(&self, client: &Client) -> Result<BearerToken, DomainError> {
        debug!(token_url = %self.token_url, "Requesting access token");

        let scope = TOKEN_SCOPES.join(" ");
        let params = [
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(""))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                DomainError::CredentialExchange(format!(
                    "token request to {} failed: {}",
                    self.token_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::CredentialExchange(format!(
                "token endpoint {} returned HTTP {}",
                self.token_url,
                status.as_u16()
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            DomainError::CredentialExchange(format!("failed to read token response: {}", e))
        })?;

        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            DomainError::CredentialExchange(format!("invalid token response: {}", e))
        })?;

        if parsed.access_token.is_empty() {
            return Err(DomainError::CredentialExchange(
                "token response carries no access_token".to_string(),
            ));
        }

        debug!(
            token_type = parsed.token_type.as_deref().unwrap_or("bearer"),
            expires_in = ?parsed.expires_in,
            "Access token obtained"
        );

        Ok(BearerToken {
            access_token: parsed.access_token.into(),
            expires_at: parsed
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}
