use super::static_records::DEFAULT_RECORD_TTL;
use serde::{Deserialize, Serialize};

/// Client identifier presented to the token endpoint.
pub const DEFAULT_CLIENT_ID: &str = "aether-roc-gui";

/// Value of `DeviceState.attached` that marks a device as attached.
pub const DEFAULT_ATTACHED_VALUE: &str = "!";

/// Device registry the resolver consults for the served domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Base URL; lookups go to `{url}/{site}/devices/{device}`.
    #[serde(default)]
    pub url: String,

    /// Ceiling for a single registry lookup or token exchange.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_attached_value")]
    pub attached_value: String,

    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Bearer-token credentials; absent means unauthenticated requests.
    #[serde(default, alias = "OpenIDC")]
    pub openidc: Option<OpenIdcConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
            attached_value: default_attached_value(),
            ttl: default_ttl(),
            openidc: None,
        }
    }
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_openidc(mut self, openidc: OpenIdcConfig) -> Self {
        self.openidc = Some(openidc);
        self
    }
}

/// Password-grant credentials exchanged for a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OpenIdcConfig {
    #[serde(alias = "tokenUrl")]
    pub token_url: String,

    pub username: String,

    pub password: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,
}

impl OpenIdcConfig {
    pub fn new(
        token_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            username: username.into(),
            password: password.into(),
            client_id: default_client_id(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_attached_value() -> String {
    DEFAULT_ATTACHED_VALUE.to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}
