// # HTTP IP Source
//
// This crate provides an HTTP-based public IP source for the homeip updater.
//
// ## Architecture
//
// Fetches the current IP from an external plain-text service
// (e.g. api.ipify.org, icanhazip.com) with a single GET per call.
// There is no caching and no background polling: the updater decides
// when to ask.

use homeip_core::ProviderRegistry;
use homeip_core::config::IpSourceConfig;
use homeip_core::traits::{IpSource, IpSourceFactory, IpVersion};
use homeip_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default timeout for a single lookup
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// IP version to accept (None = either)
    version: Option<IpVersion>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `version`: IP version to accept (None = either)
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, version: Option<IpVersion>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("Invalid IP address: {:?}", ip_text)))?;

        if let Some(version) = self.version
            && !version.accepts(&ip)
        {
            return Err(Error::ip_source(format!(
                "Expected {:?} address, got: {}",
                version, ip
            )));
        }

        Ok(ip)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.fetch_ip().await
    }

    fn version(&self) -> Option<IpVersion> {
        self.version
    }
}

/// Factory for creating HTTP IP sources
pub struct HttpFactory;

impl IpSourceFactory for HttpFactory {
    fn create(&self, config: &IpSourceConfig) -> Result<Box<dyn IpSource>> {
        match config {
            IpSourceConfig::Http { url, version } => {
                config.validate()?;
                Ok(Box::new(HttpIpSource::new(url.clone(), *version)?))
            }
            _ => Err(Error::config("Invalid config for HTTP IP source")),
        }
    }
}

/// Register the HTTP IP source with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_ip_source("http", Box::new(HttpFactory));
}
