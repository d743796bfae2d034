//! Configuration types for the homeip updater
//!
//! This module defines all configuration structures used throughout the crate.
//! They are plain data: reading them from the environment is the daemon's job,
//! and they are passed by value into the components that need them.

use crate::traits::IpVersion;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default seconds between update cycles
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Default public IP service
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org";

/// Provider identifier used when none is configured
pub const DEFAULT_PROVIDER: &str = "leaseweb";

/// Environment variable holding the Leaseweb API token
pub const LEASEWEB_API_TOKEN_VAR: &str = "LEASEWEB_API_TOKEN";

/// Environment variable selecting the provider mode (`dry-run` or `live`)
pub const DNS_MODE_VAR: &str = "DNS_MODE";

/// Update loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Zone to operate on (e.g. "example.com")
    pub domain: String,

    /// Record to watch: `@`, a short name, or an FQDN under `domain`
    pub record: String,

    /// Time to sleep between cycles
    #[serde(
        rename = "check_interval_secs",
        with = "duration_secs",
        default = "default_check_interval"
    )]
    pub check_interval: Duration,

    /// TTL to send with updates (provider default when `None`)
    #[serde(default)]
    pub ttl: Option<u32>,

    /// Capacity of the updater event channel
    ///
    /// When full, events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl UpdaterConfig {
    /// Create a configuration with default interval and TTL
    pub fn new(domain: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record: record.into(),
            check_interval: default_check_interval(),
            ttl: None,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the interval between cycles
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Set the TTL sent with updates
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config("DNS domain is required"));
        }
        if self.record.trim().is_empty() {
            return Err(crate::Error::config("DNS record is required"));
        }
        if self.check_interval.is_zero() {
            return Err(crate::Error::config("Check interval must be > 0"));
        }
        if self.ttl == Some(0) {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

fn default_check_interval() -> Duration {
    Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS)
}

fn default_event_channel_capacity() -> usize {
    100
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// IP source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// Plain-text "what is my IP" HTTP service
    Http {
        /// URL to fetch the IP from
        url: String,
        /// Reject addresses of the other family
        version: Option<IpVersion>,
    },

    /// Custom IP source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http { url, .. } => {
                if url.is_empty() {
                    return Err(crate::Error::config("IP service URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "IP service URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            IpSourceConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom IP source factory cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the IP source type name
    pub fn type_name(&self) -> &str {
        match self {
            IpSourceConfig::Http { .. } => "http",
            IpSourceConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: DEFAULT_IP_SERVICE_URL.to_string(),
            version: None,
        }
    }
}

/// DNS provider configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Leaseweb hosting DNS API
    Leaseweb {
        /// API token sent as `X-LSW-Auth`
        api_token: String,
        /// Log updates instead of sending them
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Build the configuration for a named provider
    ///
    /// Credentials are read through `lookup`, so callers decide where they
    /// come from (process environment in the daemon, a map in tests).
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if `name` is not a known provider.
    pub fn from_lookup<F>(name: &str, lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        match name.trim().to_lowercase().as_str() {
            "leaseweb" => Ok(ProviderConfig::Leaseweb {
                api_token: lookup(LEASEWEB_API_TOKEN_VAR).unwrap_or_default(),
                dry_run: lookup(DNS_MODE_VAR)
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run")),
            }),
            other => Err(crate::Error::config(format!(
                "Unsupported DNS provider '{}'. Supported providers: leaseweb",
                other
            ))),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Leaseweb { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config(format!(
                        "{} is required",
                        LEASEWEB_API_TOKEN_VAR
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Leaseweb { .. } => "leaseweb",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Leaseweb { dry_run, .. } => f
                .debug_struct("Leaseweb")
                .field("api_token", &"<REDACTED>")
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_updater_config_defaults() {
        let config = UpdaterConfig::new("example.com", "@");
        assert_eq!(config.check_interval, Duration::from_secs(300));
        assert_eq!(config.ttl, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_updater_config_requires_domain_and_record() {
        assert!(UpdaterConfig::new("", "www").validate().is_err());
        assert!(UpdaterConfig::new("example.com", " ").validate().is_err());
        assert!(
            UpdaterConfig::new("example.com", "www")
                .with_check_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_updater_config_serde_uses_seconds() {
        let json = serde_json::json!({
            "domain": "example.com",
            "record": "www",
            "check_interval_secs": 120
        });
        let config: UpdaterConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(120));
        assert_eq!(config.event_channel_capacity, 100);

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["check_interval_secs"], 120);
    }

    #[test]
    fn test_provider_from_lookup_leaseweb() {
        let config = ProviderConfig::from_lookup(
            "LeaseWeb",
            lookup_from(&[("LEASEWEB_API_TOKEN", "secret"), ("DNS_MODE", "dry-run")]),
        )
        .unwrap();

        assert_eq!(
            config,
            ProviderConfig::Leaseweb {
                api_token: "secret".to_string(),
                dry_run: true,
            }
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.type_name(), "leaseweb");
    }

    #[test]
    fn test_provider_missing_token_fails_validation() {
        let config = ProviderConfig::from_lookup("leaseweb", lookup_from(&[])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("LEASEWEB_API_TOKEN"));
    }

    #[test]
    fn test_provider_unknown_name_rejected() {
        let err = ProviderConfig::from_lookup("route53", lookup_from(&[])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_provider_debug_redacts_token() {
        let config = ProviderConfig::Leaseweb {
            api_token: "super-secret-token".to_string(),
            dry_run: false,
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_ip_source_config_validation() {
        assert!(IpSourceConfig::default().validate().is_ok());

        let bad = IpSourceConfig::Http {
            url: "ftp://example.com".to_string(),
            version: None,
        };
        assert!(bad.validate().is_err());
    }
}
