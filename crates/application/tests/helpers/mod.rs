#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use subscriber_dns_application::ports::DeviceRegistry;
use subscriber_dns_domain::{DeviceState, DomainError};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MockDeviceRegistry {
    devices: Arc<RwLock<HashMap<String, Result<DeviceState, DomainError>>>>,
    requested: Arc<RwLock<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_device(&self, device_id: &str, state: DeviceState) {
        self.devices
            .write()
            .await
            .insert(device_id.to_string(), Ok(state));
    }

    pub async fn set_error(&self, device_id: &str, error: DomainError) {
        self.devices
            .write()
            .await
            .insert(device_id.to_string(), Err(error));
    }

    pub async fn requested(&self) -> Vec<String> {
        self.requested.read().await.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceRegistry for MockDeviceRegistry {
    async fn fetch_device(&self, device_id: &str) -> Result<DeviceState, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.write().await.push(device_id.to_string());

        self.devices
            .read()
            .await
            .get(device_id)
            .cloned()
            .unwrap_or_else(|| Err(DomainError::DeviceNotFound(device_id.to_string())))
    }
}

pub fn device(attached: &str, ip: &str) -> DeviceState {
    DeviceState {
        attached: attached.to_string(),
        ip: ip.to_string(),
        ..DeviceState::default()
    }
}
