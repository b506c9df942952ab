use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    ConfigInvalid(String),

    #[error("Registry unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Registry error: {0}")]
    UpstreamError(String),

    #[error("Credential exchange failed: {0}")]
    CredentialExchange(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device not attached: {0}")]
    DeviceNotAttached(String),

    #[error("Failed to write response: {0}")]
    ResponseWriteFailed(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// True for outcomes that mean "this name does not exist" rather than a
    /// failure of the responder or its upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::DeviceNotFound(_)
                | DomainError::DeviceNotAttached(_)
                | DomainError::InvalidDomainName(_)
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
