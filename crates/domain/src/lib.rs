//! Subscriber DNS Domain Layer
pub mod address_record;
pub mod config;
pub mod device_state;
pub mod errors;

pub use address_record::AddressRecord;
pub use config::{
    CliOverrides, Config, ConfigError, LogFormat, LoggingConfig, OpenIdcConfig, Protocol,
    RegistryConfig, StaticRecordConfig, TlsConfig,
};
pub use device_state::DeviceState;
pub use errors::DomainError;
