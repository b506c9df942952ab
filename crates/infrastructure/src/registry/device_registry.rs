use super::http_client::RegistryHttpClient;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use subscriber_dns_application::ports::DeviceRegistry;
use subscriber_dns_domain::{DeviceState, DomainError, RegistryConfig};
use tracing::debug;

/// Device registry reached over HTTP:
/// `GET {registry}/{site}/devices/{device}` returning a JSON [`DeviceState`].
pub struct HttpDeviceRegistry {
    base_url: Url,
    client: RegistryHttpClient,
}

impl HttpDeviceRegistry {
    pub fn new(config: &RegistryConfig, site_id: &str) -> Result<Self, DomainError> {
        let base_url = devices_url(&config.url, site_id)?;
        let client = RegistryHttpClient::from_config(config)?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: Url, client: RegistryHttpClient) -> Self {
        Self { base_url, client }
    }

    /// `{registry}/{site}/devices`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn device_url(&self, device_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(device_id);
        }
        url
    }
}

/// Join the site and `devices` onto the registry URL.
pub fn devices_url(registry_url: &str, site_id: &str) -> Result<Url, DomainError> {
    let mut url = Url::parse(registry_url).map_err(|e| {
        DomainError::ConfigInvalid(format!("invalid registry URL '{}': {}", registry_url, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::ConfigInvalid(format!(
            "registry URL '{}' must use http or https",
            registry_url
        )));
    }

    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            DomainError::ConfigInvalid(format!("registry URL '{}' cannot be a base", registry_url))
        })?;
        segments.pop_if_empty();
        if !site_id.is_empty() {
            segments.push(site_id);
        }
        segments.push("devices");
    }

    Ok(url)
}

#[async_trait]
impl DeviceRegistry for HttpDeviceRegistry {
    async fn fetch_device(&self, device_id: &str) -> Result<DeviceState, DomainError> {
        let url = self.device_url(device_id);
        debug!(url = %url, "Requesting device info");

        let response = self.client.get(url).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::DeviceNotFound(device_id.to_string()));
        }
        if status != StatusCode::OK {
            return Err(DomainError::UpstreamError(format!(
                "failed to get {} state ({})",
                device_id, status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            DomainError::UpstreamUnreachable(format!("failed to read {} state: {}", device_id, e))
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            DomainError::UpstreamError(format!("invalid state for {}: {}", device_id, e))
        })
    }
}
