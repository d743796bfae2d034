//! Error types for the homeip updater
//!
//! This module defines all error types used throughout the crate.
//! The split between fatal and transient errors drives the update loop:
//! see [`Error::is_fatal`].

use thiserror::Error;

/// Result type alias for homeip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the homeip updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration or credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (e.g. an empty record or domain name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A fully qualified record name that does not belong to the domain
    #[error("Record '{record}' is not within domain '{domain}'")]
    DomainMismatch {
        /// The offending record name
        record: String,
        /// The domain it was checked against
        domain: String,
    },

    /// Public IP lookup failed
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Transport failure or non-2xx response from a DNS provider
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Provider returned a payload of unexpected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// The watched record is missing, of an unsupported type, or unusable
    #[error("Record mismatch: {0}")]
    RecordMismatch(String),

    /// Updating the record failed after drift was detected
    #[error("Update of {record} failed: {message}")]
    UpdateFailed {
        /// The FQDN being updated
        record: String,
        /// Underlying failure
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a domain mismatch error
    pub fn domain_mismatch(record: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::DomainMismatch {
            record: record.into(),
            domain: domain.into(),
        }
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a record mismatch error
    pub fn record_mismatch(msg: impl Into<String>) -> Self {
        Self::RecordMismatch(msg.into())
    }

    /// Create an update failure error
    pub fn update_failed(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Whether this error should halt the update loop
    ///
    /// Configuration and record problems will not fix themselves between
    /// cycles, so they stop the loop. Network, provider and update failures
    /// are retried on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InvalidInput(_)
                | Self::DomainMismatch { .. }
                | Self::RecordMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::config("missing token").is_fatal());
        assert!(Error::record_mismatch("no record").is_fatal());
        assert!(Error::domain_mismatch("a.other.com", "example.com").is_fatal());
        assert!(Error::invalid_input("empty").is_fatal());

        assert!(!Error::ip_source("timeout").is_fatal());
        assert!(!Error::provider("leaseweb", "HTTP 503").is_fatal());
        assert!(!Error::malformed("not an object").is_fatal());
        assert!(!Error::update_failed("www.example.com", "HTTP 500").is_fatal());

        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(!Error::from(json_err).is_fatal());
    }

    #[test]
    fn test_domain_mismatch_message() {
        let err = Error::domain_mismatch("sub.other.com", "example.com");
        assert_eq!(
            err.to_string(),
            "Record 'sub.other.com' is not within domain 'example.com'"
        );
    }
}
