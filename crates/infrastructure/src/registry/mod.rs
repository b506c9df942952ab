pub mod device_registry;
pub mod http_client;

pub use device_registry::{devices_url, HttpDeviceRegistry};
pub use http_client::{RegistryHttpClient, TOKEN_SCOPES};
