use crate::DomainError;
use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4 mapping for a fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    name: String,
    address: Ipv4Addr,
}

impl AddressRecord {
    pub fn new(name: impl Into<String>, address: Ipv4Addr) -> Result<Self, DomainError> {
        let name = fqdn(name.into())?;
        Ok(Self { name, address })
    }

    /// Build a record from configuration text, rejecting malformed input.
    pub fn parse(host: &str, address: &str) -> Result<Self, DomainError> {
        let ip: Ipv4Addr = address.trim().parse().map_err(|_| {
            DomainError::InvalidRecord(format!("{}: invalid IPv4 address '{}'", host, address))
        })?;
        Self::new(host.trim(), ip).map_err(|e| match e {
            DomainError::InvalidDomainName(msg) => DomainError::InvalidRecord(msg),
            other => other,
        })
    }

    /// Name in absolute form, always ending with `.`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} A {}", self.name, self.address)
    }
}

fn fqdn(name: String) -> Result<String, DomainError> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomainName(format!(
            "empty host name '{}'",
            name
        )));
    }

    for label in trimmed.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(DomainError::InvalidDomainName(format!(
                "invalid label in '{}'",
                name
            )));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidDomainName(format!(
                "invalid character in '{}'",
                name
            )));
        }
    }

    Ok(format!("{}.", trimmed))
}
