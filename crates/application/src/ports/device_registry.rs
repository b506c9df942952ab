use async_trait::async_trait;
use subscriber_dns_domain::{DeviceState, DomainError};

/// Source of per-device attachment state.
///
/// Implementations map an unknown device to `DomainError::DeviceNotFound`,
/// transport failures to `DomainError::UpstreamUnreachable` and every other
/// unexpected answer to `DomainError::UpstreamError`.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn fetch_device(&self, device_id: &str) -> Result<DeviceState, DomainError>;
}
