use std::net::Ipv4Addr;
use std::sync::Arc;
use subscriber_dns_domain::{DomainError, RegistryConfig};
use tracing::{debug, info, instrument, warn};

use crate::ports::DeviceRegistry;

/// Resolves `<device>.<domain>` to the address the registry reports for
/// `<device>`, provided the device is attached.
pub struct ResolveDeviceUseCase {
    registry: Arc<dyn DeviceRegistry>,
    attached_value: Arc<str>,
}

impl ResolveDeviceUseCase {
    pub fn new(registry: Arc<dyn DeviceRegistry>, attached_value: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            attached_value: attached_value.into(),
        }
    }

    pub fn from_config(registry: Arc<dyn DeviceRegistry>, config: &RegistryConfig) -> Self {
        Self::new(registry, config.attached_value.as_str())
    }

    /// Registry key for a queried name: its first label.
    pub fn device_id(name: &str) -> Option<&str> {
        let label = name.split('.').next().unwrap_or_default();
        (!label.is_empty()).then_some(label)
    }

    #[instrument(skip(self), fields(device))]
    pub async fn execute(&self, name: &str) -> Result<Ipv4Addr, DomainError> {
        let device_id = Self::device_id(name).ok_or_else(|| {
            DomainError::InvalidDomainName(format!("no device label in '{}'", name))
        })?;
        tracing::Span::current().record("device", device_id);

        let state = self.registry.fetch_device(device_id).await?;
        debug!(?state, "Received device state from registry");

        if !state.is_resolvable(&self.attached_value) {
            info!(name = %name, attached = %state.attached, "Device is not active");
            return Err(DomainError::DeviceNotAttached(device_id.to_string()));
        }

        state.ip.parse::<Ipv4Addr>().map_err(|_| {
            warn!(name = %name, ip = %state.ip, "Registry returned a non-IPv4 address");
            DomainError::UpstreamError(format!(
                "device {} has invalid IPv4 address '{}'",
                device_id, state.ip
            ))
        })
    }
}
