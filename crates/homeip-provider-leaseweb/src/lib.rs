// # Leaseweb DNS Provider
//
// This crate provides a Leaseweb DNS provider implementation for the homeip updater.
//
// ## Behavior
//
// - One HTTP request per update; listing follows `_metadata` page by page
// - Full error propagation to the updater (it decides whether to retry)
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 429, 5xx)
// - Dry-run mode for safe testing
// - Both A and AAAA record support
// - No retry, backoff, caching or background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider fails construction if the token is empty
//
// ## API Reference
//
// - Leaseweb Hosting API v2: https://developer.leaseweb.com/api-docs/domains_v2.html
// - List record sets: GET `/domains/:domain/resourceRecordSets?limit=&offset=`
// - Update record set: PUT `/domains/:domain/resourceRecordSets/:name./:type`
//   (the record name carries a trailing dot)

use async_trait::async_trait;
use homeip_core::config::ProviderConfig;
use homeip_core::fqdn;
use homeip_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, UpdateRequest};
use homeip_core::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Leaseweb hosting API base URL
pub const LEASEWEB_API_BASE: &str = "https://api.leaseweb.com/hosting/v2";

/// Header carrying the API token
const AUTH_HEADER: &str = "X-LSW-Auth";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "leaseweb";

/// Record sets requested per list page
const PAGE_LIMIT: usize = 50;

/// Leaseweb DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform list requests as usual
/// - Log the intended PUT request and payload
/// - **NOT** actually modify DNS records
pub struct LeasewebProvider {
    /// Leaseweb API token
    /// NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list as usual but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for LeasewebProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeasewebProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Response body of the record set list endpoint
#[derive(Debug, Deserialize)]
struct RecordSetList {
    #[serde(rename = "resourceRecordSets")]
    resource_record_sets: Vec<RecordSetEntry>,
    #[serde(rename = "_metadata", default)]
    metadata: Option<ListMetadata>,
}

/// Paging information attached to list responses
#[derive(Debug, Deserialize)]
struct ListMetadata {
    #[serde(rename = "totalCount")]
    total_count: usize,
}

/// One page of the record set list
#[derive(Debug)]
struct RecordSetPage {
    records: Vec<DnsRecord>,
    /// Record sets across all pages, when the API reports it
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RecordSetEntry {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    ttl: Option<u32>,
}

impl From<RecordSetEntry> for DnsRecord {
    fn from(entry: RecordSetEntry) -> Self {
        // Anything but an array of strings yields no content; the updater
        // rejects such a record if it is the one being watched.
        let content = match entry.content {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        DnsRecord {
            name: entry.name,
            record_type: entry.record_type.into(),
            content,
            ttl: entry.ttl,
        }
    }
}

/// Request body of the record set update endpoint
#[derive(Debug, Serialize)]
struct RecordSetUpdate {
    content: Vec<String>,
    ttl: u32,
}

impl LeasewebProvider {
    /// Create a new Leaseweb provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Leaseweb API token with DNS write access
    /// - `dry_run`: If true, skip PUT updates and log them instead
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Leaseweb API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: LEASEWEB_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at another API endpoint (e.g. a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn record_sets_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/resourceRecordSets", self.base_url, domain)
    }

    fn record_set_url(&self, domain: &str, fqdn: &str, record_type: &str) -> String {
        format!(
            "{}/{}./{}",
            self.record_sets_url(domain),
            fqdn,
            record_type
        )
    }

    /// Fetch one page of record sets starting at `offset`
    async fn fetch_record_set_page(&self, domain: &str, offset: usize) -> Result<RecordSetPage> {
        let response = self
            .request(Method::GET, &self.record_sets_url(domain))
            .query(&[("limit", PAGE_LIMIT), ("offset", offset)])
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(status_error(status, &body, "List record sets"));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::malformed(format!("Failed to parse response: {}", e)))?;

        parse_record_sets(json)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTH_HEADER, &self.api_token)
            .header(CONTENT_TYPE, "application/json")
    }
}

/// Convert one page of the list endpoint's JSON into records
fn parse_record_sets(json: Value) -> Result<RecordSetPage> {
    if !json.is_object() {
        return Err(Error::malformed("expected a JSON object of record sets"));
    }

    let list: RecordSetList = serde_json::from_value(json)
        .map_err(|e| Error::malformed(format!("unexpected record set list: {}", e)))?;

    Ok(RecordSetPage {
        records: list
            .resource_record_sets
            .into_iter()
            .map(DnsRecord::from)
            .collect(),
        total_count: list.metadata.map(|m| m.total_count),
    })
}

/// Map a non-2xx response to a provider error
fn status_error(status: StatusCode, body: &str, action: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("{} failed: domain or record set not found. Status: {}", action, status),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Leaseweb server error (transient): {} - {}", status, body),
        _ => format!("{} failed: {} - {}", action, status, body),
    };
    Error::provider(PROVIDER_NAME, message)
}

async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string())
}

#[async_trait]
impl DnsProvider for LeasewebProvider {
    /// List the record sets of a domain, following pagination
    ///
    /// ```http
    /// GET /domains/example.com/resourceRecordSets?limit=50&offset=0
    /// X-LSW-Auth: <token>
    /// ```
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let domain = fqdn::normalize(domain);
        tracing::debug!("Listing Leaseweb record sets for {}", domain);

        let mut records = Vec::new();
        loop {
            let page = self.fetch_record_set_page(&domain, records.len()).await?;
            let received = page.records.len();
            records.extend(page.records);

            // An empty page ends the walk even if totalCount disagrees.
            match page.total_count {
                Some(total) if received > 0 && records.len() < total => {
                    tracing::debug!("Fetched {}/{} record sets", records.len(), total);
                }
                _ => break,
            }
        }

        tracing::debug!("Leaseweb returned {} record set(s) for {}", records.len(), domain);
        Ok(records)
    }

    /// Replace the content of a record set
    ///
    /// ```http
    /// PUT /domains/example.com/resourceRecordSets/www.example.com./A
    /// X-LSW-Auth: <token>
    ///
    /// { "content": ["192.0.2.1"], "ttl": 60 }
    /// ```
    async fn update_record(&self, domain: &str, request: &UpdateRequest) -> Result<()> {
        let fqdn = fqdn::resolve(&request.name, domain)?;
        let domain = fqdn::normalize(domain);
        let url = self.record_set_url(&domain, &fqdn, request.record_type.as_str());
        let payload = RecordSetUpdate {
            content: vec![request.ip.to_string()],
            ttl: request.effective_ttl(),
        };

        tracing::info!(
            "Updating Leaseweb DNS record: {} -> {} ({}) [mode: {}]",
            fqdn,
            request.ip,
            request.record_type,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        let response = self
            .request(Method::PUT, &url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(status_error(status, &body, "Update record set"));
        }

        tracing::debug!("Leaseweb accepted update for {}", fqdn);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Leaseweb providers
pub struct LeasewebFactory;

impl DnsProviderFactory for LeasewebFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Leaseweb { api_token, dry_run } => {
                if api_token.is_empty() {
                    return Err(Error::config(format!(
                        "{} is required",
                        homeip_core::config::LEASEWEB_API_TOKEN_VAR
                    )));
                }

                if *dry_run {
                    tracing::warn!(
                        "Leaseweb provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(LeasewebProvider::new(api_token.clone(), *dry_run)?))
            }
            _ => Err(Error::config("Invalid config for Leaseweb provider")),
        }
    }
}

/// Register the Leaseweb provider with a registry
///
/// # Example
///
/// ```rust
/// use homeip_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// homeip_provider_leaseweb::register(&registry);
/// assert!(registry.has_provider("leaseweb"));
/// ```
pub fn register(registry: &homeip_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(LeasewebFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeip_core::traits::RecordType;

    #[test]
    fn test_factory_creation() {
        let config = ProviderConfig::Leaseweb {
            api_token: "test_token".to_string(),
            dry_run: false,
        };

        let provider = LeasewebFactory.create(&config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "leaseweb");
    }

    #[test]
    fn test_factory_missing_token() {
        let config = ProviderConfig::Leaseweb {
            api_token: String::new(),
            dry_run: false,
        };

        let err = LeasewebFactory.create(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)), "{err:?}");
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let config = ProviderConfig::Custom {
            factory: "other".to_string(),
            config: serde_json::json!({}),
        };
        assert!(LeasewebFactory.create(&config).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(LeasewebProvider::new("", false).is_err());
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = LeasewebProvider::new("secret_token_12345", false).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("LeasewebProvider"));
    }

    #[test]
    fn test_record_set_url_has_trailing_dot() {
        let provider = LeasewebProvider::new("token", false)
            .unwrap()
            .with_base_url("http://localhost:8080/");

        assert_eq!(
            provider.record_set_url("example.com", "www.example.com", "A"),
            "http://localhost:8080/domains/example.com/resourceRecordSets/www.example.com./A"
        );
    }

    #[test]
    fn test_parse_record_sets() {
        let json = serde_json::json!({
            "resourceRecordSets": [
                {
                    "name": "example.com.",
                    "type": "A",
                    "content": ["192.0.2.1", "192.0.2.2"],
                    "ttl": 3600,
                    "editable": true
                },
                {
                    "name": "example.com.",
                    "type": "TXT",
                    "content": ["v=spf1 -all"],
                    "ttl": 60
                }
            ],
            "_metadata": { "limit": 20, "offset": 0, "totalCount": 2 }
        });

        let page = parse_record_sets(json).unwrap();
        assert_eq!(page.total_count, Some(2));
        let records = page.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, RecordType::A);
        assert_eq!(records[0].content, vec!["192.0.2.1", "192.0.2.2"]);
        assert_eq!(records[0].ttl, Some(3600));
        assert_eq!(records[1].record_type, RecordType::Other("TXT".to_string()));
    }

    #[test]
    fn test_parse_record_sets_rejects_wrong_shape() {
        for json in [
            serde_json::json!([]),
            serde_json::json!("records"),
            serde_json::json!({ "records": [] }),
            serde_json::json!({ "resourceRecordSets": [{ "type": "A" }] }),
        ] {
            let err = parse_record_sets(json.clone()).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{json}: {err:?}");
        }
    }

    #[test]
    fn test_non_list_content_becomes_empty() {
        let json = serde_json::json!({
            "resourceRecordSets": [
                { "name": "www.example.com.", "type": "A", "content": "192.0.2.1" },
                { "name": "mail.example.com.", "type": "A" }
            ]
        });

        let page = parse_record_sets(json).unwrap();
        assert_eq!(page.total_count, None);
        let records = page.records;
        assert!(records[0].content.is_empty());
        assert!(records[1].content.is_empty());
    }

    #[test]
    fn test_status_error_messages() {
        let err = status_error(StatusCode::UNAUTHORIZED, "", "List record sets");
        assert!(err.to_string().contains("Authentication failed"));

        let err = status_error(StatusCode::NOT_FOUND, "", "Update record set");
        assert!(err.to_string().contains("Update record set failed: domain or record set not found"));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, "", "List record sets");
        assert!(err.to_string().contains("Rate limit exceeded"));
        assert!(!err.is_fatal());

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "down", "List record sets");
        assert!(err.to_string().contains("transient"));
        assert!(!err.is_fatal());
    }
}
