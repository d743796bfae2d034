// # homeipd - homeip Daemon
//
// A thin integration layer over homeip-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and IP sources
// 4. Running the updater until a signal or a fatal error
//
// All update logic lives in homeip-core.
//
// ## Configuration
//
// ### Record
// - `DNS_DOMAIN`: Zone to operate on (required)
// - `DNS_RECORD`: `@`, a short name, or an FQDN under the zone (required)
// - `DNS_TTL`: TTL sent with updates in seconds (default: 60)
//
// ### DNS Provider
// - `DNS_PROVIDER`: Provider type (default: leaseweb)
// - `LEASEWEB_API_TOKEN`: API token for the leaseweb provider
// - `DNS_MODE`: `dry-run` to log updates instead of sending them
//
// ### IP Source
// - `IP_SERVICE_URL`: Plain-text public IP service (default: https://api.ipify.org)
// - `IP_VERSION`: Accept only `v4` or `v6` addresses (default: any)
//
// ### Loop
// - `CHECK_INTERVAL`: Seconds between cycles (default: 300)
// - `LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export DNS_DOMAIN=example.com
// export DNS_RECORD=home
// export LEASEWEB_API_TOKEN=your_token
//
// homeipd
// ```

use anyhow::{Context, Result};
use homeip_core::config::{
    DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_IP_SERVICE_URL, DEFAULT_PROVIDER,
};
use homeip_core::traits::{DEFAULT_TTL, IpVersion};
use homeip_core::{IpSourceConfig, ProviderConfig, ProviderRegistry, Updater, UpdaterConfig};
use std::env;
use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Longest accepted `CHECK_INTERVAL` (one day)
const MAX_CHECK_INTERVAL_SECS: u64 = 86_400;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Fatal runtime error (e.g. the watched record is unusable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeipExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Fatal error while running
    RuntimeError = 2,
}

impl From<HomeipExitCode> for ExitCode {
    fn from(code: HomeipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    domain: String,
    record: String,
    ttl: u32,
    check_interval_secs: u64,
    provider: ProviderConfig,
    ip_service_url: String,
    ip_version: Option<IpVersion>,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    ///
    /// Required values must be present and non-empty; optional numeric
    /// values that fail to parse are errors rather than silently defaulted.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let domain = var("DNS_DOMAIN").context(
            "DNS_DOMAIN is required. Set it via: export DNS_DOMAIN=example.com",
        )?;
        let record = var("DNS_RECORD").context(
            "DNS_RECORD is required. Set it via: export DNS_RECORD=@ (or a name such as home)",
        )?;
        let provider_name = var("DNS_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        let check_interval_secs = match var("CHECK_INTERVAL") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("CHECK_INTERVAL must be a number of seconds. Got: {}", raw))?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };

        let ttl = match var("DNS_TTL") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DNS_TTL must be a number of seconds. Got: {}", raw))?,
            None => DEFAULT_TTL,
        };

        let ip_version = match var("IP_VERSION").map(|v| v.to_lowercase()).as_deref() {
            None | Some("any") => None,
            Some("v4") | Some("4") => Some(IpVersion::V4),
            Some("v6") | Some("6") => Some(IpVersion::V6),
            Some(other) => anyhow::bail!(
                "IP_VERSION '{}' is not valid. Valid values: v4, v6, any",
                other
            ),
        };

        let log_level = match var("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let provider = ProviderConfig::from_lookup(&provider_name, &lookup)?;

        Ok(Self {
            domain,
            record,
            ttl,
            check_interval_secs,
            provider,
            ip_service_url: var("IP_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_IP_SERVICE_URL.to_string()),
            ip_version,
            log_level,
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHECK_INTERVAL_SECS).contains(&self.check_interval_secs) {
            anyhow::bail!(
                "CHECK_INTERVAL must be between 1 and {} seconds. Got: {}",
                MAX_CHECK_INTERVAL_SECS,
                self.check_interval_secs
            );
        }

        self.provider.validate()?;
        self.ip_source_config().validate()?;
        self.updater_config().validate()?;

        // Rejects records outside the domain before anything is created.
        homeip_core::fqdn::resolve(&self.record, &self.domain)?;

        Ok(())
    }

    fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig::new(&self.domain, &self.record)
            .with_check_interval(Duration::from_secs(self.check_interval_secs))
            .with_ttl(self.ttl)
    }

    fn ip_source_config(&self) -> IpSourceConfig {
        IpSourceConfig::Http {
            url: self.ip_service_url.clone(),
            version: self.ip_version,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HomeipExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HomeipExitCode::ConfigError.into();
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {:#}", e);
        return HomeipExitCode::ConfigError.into();
    }

    info!("Starting homeipd");

    // One loop, one in-flight operation: a single-threaded runtime is enough.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HomeipExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> HomeipExitCode {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "leaseweb")]
    {
        info!("Registering Leaseweb provider");
        homeip_provider_leaseweb::register(&registry);
    }

    #[cfg(feature = "http")]
    {
        info!("Registering HTTP IP source");
        homeip_ip_http::register(&registry);
    }

    let updater = match build_updater(&config, &registry) {
        Ok(updater) => updater,
        Err(e) => {
            error!("Startup failed: {}", e);
            return HomeipExitCode::ConfigError;
        }
    };

    match updater.run_with_shutdown(shutdown_signal()).await {
        Ok(()) => {
            info!("Exiting homeipd");
            HomeipExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Unrecoverable error: {}", e);
            HomeipExitCode::RuntimeError
        }
    }
}

/// Create provider, IP source and updater from configuration
fn build_updater(config: &Config, registry: &ProviderRegistry) -> homeip_core::Result<Updater> {
    info!("Loading DNS provider: {}", config.provider.type_name());
    let provider = registry.create_provider(&config.provider)?;

    let ip_source = registry.create_ip_source(&config.ip_source_config())?;
    info!("Public IP service: {}", config.ip_service_url);

    // Nobody consumes events in the daemon; logs carry the same information.
    let (updater, _events) = Updater::new(ip_source, provider, config.updater_config())?;
    info!("Managing record: {}", updater.target());

    Ok(updater)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to setup signal handlers, falling back to Ctrl-C: {}", e);
            wait_for_ctrl_c(tokio::signal::ctrl_c()).await;
            return;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    wait_for_ctrl_c(tokio::signal::ctrl_c()).await;
}

/// Wait for a Ctrl-C listener to fire
///
/// A listener that fails never resolves: only a real interrupt may end the
/// updater with a clean exit.
async fn wait_for_ctrl_c<F>(ctrl_c: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match ctrl_c.await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
