use serde::{Deserialize, Serialize};

pub const DEFAULT_RECORD_TTL: u32 = 3600;

/// A fixed host name to IPv4 address mapping served authoritatively.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StaticRecordConfig {
    pub host: String,

    pub address: String,

    #[serde(default)]
    pub ttl: Option<u32>,
}

impl StaticRecordConfig {
    pub fn new(host: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            address: address.into(),
            ttl: None,
        }
    }

    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(DEFAULT_RECORD_TTL)
    }
}
