pub mod errors;
pub mod logging;
pub mod registry;
pub mod root;
pub mod server;
pub mod static_records;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use registry::{OpenIdcConfig, RegistryConfig, DEFAULT_ATTACHED_VALUE, DEFAULT_CLIENT_ID};
pub use root::{CliOverrides, Config};
pub use server::{Protocol, TlsConfig};
pub use static_records::{StaticRecordConfig, DEFAULT_RECORD_TTL};
