// # DNS Provider Trait
//
// Defines the interface for listing and updating DNS records via provider APIs.
//
// ## Implementations
//
// - Leaseweb: `homeip-provider-leaseweb` crate
//
// ## Usage
//
// ```rust,ignore
// use homeip_core::{DnsProvider, UpdateRequest};
//
// #[tokio::main]
// async fn main() -> homeip_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.list_records("example.com").await?;
//
//     provider.update_record(
//         "example.com",
//         &UpdateRequest::new("www", std::net::IpAddr::from([192, 0, 2, 1])),
//     ).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// TTL applied when the caller does not supply one (seconds)
pub const DEFAULT_TTL: u32 = 60;

/// DNS record type as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Any other record type (TXT, CNAME, MX, ...)
    Other(String),
}

impl RecordType {
    /// Record type that holds addresses of the given family
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Self::A,
            IpAddr::V6(_) => Self::Aaaa,
        }
    }

    /// Whether records of this type can be managed by the updater
    pub fn is_address(&self) -> bool {
        matches!(self, Self::A | Self::Aaaa)
    }

    /// Wire name of the type (e.g. `"AAAA"`)
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record set as listed by a provider
///
/// Providers normalize their own response shapes into this type before
/// returning, so nothing vendor-specific leaks into the updater.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Record name as returned by the provider (may carry a trailing dot)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record content, in provider order
    pub content: Vec<String>,
    /// Time-to-live, if the provider reports one
    pub ttl: Option<u32>,
}

impl DnsRecord {
    /// Create a record without TTL information
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        content: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            content,
            ttl: None,
        }
    }

    /// The authoritative value of the record: the first content entry
    pub fn primary_content(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}

/// Parameters of a record update
///
/// `name` may be a short name (`www`, `@`) or an FQDN; adapters normalize it
/// against the domain passed alongside the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Short record name or FQDN
    pub name: String,
    /// New address
    pub ip: IpAddr,
    /// Record type to update
    pub record_type: RecordType,
    /// TTL in seconds; [`DEFAULT_TTL`] when `None`
    pub ttl: Option<u32>,
}

impl UpdateRequest {
    /// Create a request whose record type is inferred from the address family
    pub fn new(name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
            record_type: RecordType::for_ip(&ip),
            ttl: None,
        }
    }

    /// Override the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }

    /// TTL to send to the provider
    pub fn effective_ttl(&self) -> u32 {
        self.ttl.unwrap_or(DEFAULT_TTL)
    }
}

/// Trait for DNS provider implementations
///
/// This trait defines the interface for reading and writing DNS records.
/// Implementations handle the specifics of each provider's API.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Allowed
/// - Perform HTTP/HTTPS API calls to their endpoints
/// - Parse provider-specific responses into [`DnsRecord`]
/// - Return success or failure (the updater handles retry)
///
/// ## Not Allowed
/// - Retry or back off (the next cycle is the retry)
/// - Decide whether an update is needed (owned by [`crate::Updater`])
/// - Cache records between calls
/// - Spawn background tasks
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the record sets of a domain
    ///
    /// # Parameters
    ///
    /// - `domain`: The zone to list (e.g. "example.com")
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: Records in provider order
    /// - `Err(Error::Provider)`: Transport failure or non-2xx response
    /// - `Err(Error::MalformedResponse)`: Payload had an unexpected shape
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Point a record at a new address
    ///
    /// No read-back is performed; the updater verifies on its next cycle.
    ///
    /// # Parameters
    ///
    /// - `domain`: The zone holding the record
    /// - `request`: Record identifier, address, type and TTL
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error::Provider)`: Transport failure or non-2xx response
    async fn update_record(
        &self,
        domain: &str,
        request: &UpdateRequest,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: The provider
    /// - `Err(Error::Config)`: Credentials are missing or the config targets another provider
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parsing() {
        assert_eq!(RecordType::from("A"), RecordType::A);
        assert_eq!(RecordType::from("aaaa"), RecordType::Aaaa);
        assert_eq!(RecordType::from("TXT"), RecordType::Other("TXT".to_string()));
        assert!(!RecordType::from("CNAME").is_address());
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
    }

    #[test]
    fn test_update_request_infers_type() {
        let v4 = UpdateRequest::new("www", IpAddr::from([192, 0, 2, 1]));
        assert_eq!(v4.record_type, RecordType::A);

        let v6 = UpdateRequest::new("www", "2001:db8::1".parse().unwrap());
        assert_eq!(v6.record_type, RecordType::Aaaa);
    }

    #[test]
    fn test_update_request_ttl_default() {
        let request = UpdateRequest::new("@", IpAddr::from([192, 0, 2, 1]));
        assert_eq!(request.effective_ttl(), DEFAULT_TTL);
        assert_eq!(request.with_ttl(Some(300)).effective_ttl(), 300);
    }

    #[test]
    fn test_primary_content_is_first_entry() {
        let record = DnsRecord::new(
            "www.example.com.",
            "A",
            vec!["192.0.2.1".to_string(), "192.0.2.2".to_string()],
        );
        assert_eq!(record.primary_content(), Some("192.0.2.1"));

        let empty = DnsRecord::new("www.example.com.", "A", Vec::new());
        assert_eq!(empty.primary_content(), None);
    }
}
