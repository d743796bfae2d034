//! The update loop
//!
//! The Updater is responsible for:
//! - Fetching the current public IP via IpSource
//! - Fetching the published records via DnsProvider
//! - Locating the watched record and deciding whether it drifted
//! - Updating the record when it did
//!
//! ## Cycle
//!
//! ```text
//! Idle ─► FetchIP ─► FetchRecords ─► Resolve+Match ─► Decide ─┬─► Update ─┐
//!            ▲                                                └─► Skip ───┤
//!            └──────────────────────────── Sleep ◄────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! Failures to fetch the IP or the records, and failures of the update call,
//! abort the cycle and are retried after the next sleep. A watched record
//! that is missing, not A/AAAA, or has unusable content is a configuration
//! problem: the loop stops and returns the error (see [`Error::is_fatal`]).
//!
//! Nothing is remembered between cycles; each one re-reads the provider.

use crate::config::UpdaterConfig;
use crate::error::{Error, Result};
use crate::fqdn;
use crate::traits::{DnsProvider, DnsRecord, IpSource, RecordType, UpdateRequest};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, trace, warn};

/// Events emitted by the Updater
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdaterEvent {
    /// Loop started watching a record
    Started {
        fqdn: String,
    },

    /// Published IP differs from the current one
    DriftDetected {
        fqdn: String,
        record_ip: IpAddr,
        current_ip: IpAddr,
    },

    /// Record was updated
    UpdateSucceeded {
        fqdn: String,
        new_ip: IpAddr,
        previous_ip: IpAddr,
    },

    /// Record already points at the current IP
    UpdateSkipped {
        fqdn: String,
        current_ip: IpAddr,
    },

    /// A cycle failed
    CycleFailed {
        error: String,
        fatal: bool,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Result of one successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The record already matched the current IP
    Unchanged {
        ip: IpAddr,
    },
    /// The record was pointed at a new IP
    Updated {
        previous_ip: IpAddr,
        new_ip: IpAddr,
    },
}

/// Comparison of the current IP with the published one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateDecision {
    pub should_update: bool,
    pub current_ip: IpAddr,
    pub record_ip: IpAddr,
}

/// Find the record whose name matches `target`.
///
/// Names are compared case-insensitively and without trailing dots.
/// When several records share the name (e.g. A and AAAA on a dual-stack
/// host), the one of type `wanted` is preferred; otherwise the first match
/// in provider order wins.
///
/// # Errors
///
/// [`Error::RecordMismatch`] if no record matches.
pub fn locate_record<'a>(
    records: &'a [DnsRecord],
    target: &str,
    wanted: &RecordType,
) -> Result<&'a DnsRecord> {
    let mut named = records
        .iter()
        .filter(|record| fqdn::matches(&record.name, target));

    let first = named
        .next()
        .ok_or_else(|| Error::record_mismatch(format!("No DNS record found for {}", target)))?;

    if first.record_type == *wanted {
        return Ok(first);
    }

    Ok(named
        .find(|record| record.record_type == *wanted)
        .unwrap_or(first))
}

/// Decide whether `record` must be updated to `current_ip`.
///
/// The first content entry is the published IP, whatever follows it.
///
/// # Errors
///
/// [`Error::RecordMismatch`] if the record is not A/AAAA, has no content,
/// its first entry is not an IP address, or its type does not hold
/// addresses of `current_ip`'s family.
pub fn decide(record: &DnsRecord, current_ip: IpAddr) -> Result<UpdateDecision> {
    if !record.record_type.is_address() {
        return Err(Error::record_mismatch(format!(
            "Unsupported DNS record type {} for {}",
            record.record_type, record.name
        )));
    }

    let content = record.primary_content().ok_or_else(|| {
        Error::record_mismatch(format!("DNS record {} has no content", record.name))
    })?;

    let record_ip: IpAddr = content.trim().parse().map_err(|_| {
        Error::record_mismatch(format!(
            "DNS record {} has invalid content: {:?}",
            record.name, record.content
        ))
    })?;

    if RecordType::for_ip(&current_ip) != record.record_type {
        return Err(Error::record_mismatch(format!(
            "DNS record {} is of type {} but the current IP {} needs {}",
            record.name,
            record.record_type,
            current_ip,
            RecordType::for_ip(&current_ip)
        )));
    }

    Ok(UpdateDecision {
        should_update: current_ip != record_ip,
        current_ip,
        record_ip,
    })
}

/// Dynamic DNS update loop
///
/// Watches a single record of a single domain.
///
/// ## Lifecycle
///
/// 1. Create with [`Updater::new()`] (validates configuration, resolves the FQDN)
/// 2. Start with [`Updater::run()`] or [`Updater::run_with_shutdown()`]
/// 3. The loop runs until shutdown or a fatal error
pub struct Updater {
    /// Source of the current public IP
    ip_source: Box<dyn IpSource>,

    /// Provider holding the record
    provider: Box<dyn DnsProvider>,

    /// Zone the record lives in
    domain: String,

    /// Canonical FQDN of the watched record
    target: String,

    /// Sleep between cycles
    check_interval: Duration,

    /// TTL sent with updates
    ttl: Option<u32>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<UpdaterEvent>,
}

impl Updater {
    /// Create a new updater
    ///
    /// # Returns
    ///
    /// A tuple of (updater, event_receiver) where event_receiver yields updater events
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is incomplete
    /// - [`Error::DomainMismatch`] / [`Error::InvalidInput`] if the record
    ///   does not resolve under the domain
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: UpdaterConfig,
    ) -> Result<(Self, mpsc::Receiver<UpdaterEvent>)> {
        config.validate()?;

        let target = fqdn::resolve(&config.record, &config.domain)?;
        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let updater = Self {
            ip_source,
            provider,
            domain: fqdn::normalize(&config.domain),
            target,
            check_interval: config.check_interval,
            ttl: config.ttl,
            event_tx: tx,
        };

        Ok((updater, rx))
    }

    /// The FQDN this updater watches
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run until Ctrl-C or a fatal error
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error (see [`Error::is_fatal`])
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes or a fatal error occurs
    ///
    /// The shutdown future is polled alongside the in-flight cycle and the
    /// sleep, so the loop stops promptly at any point.
    pub async fn run_with_shutdown<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Starting DNS updater for {} via {} (interval: {:?})",
            self.target,
            self.provider.provider_name(),
            self.check_interval
        );
        self.emit_event(UpdaterEvent::Started {
            fqdn: self.target.clone(),
        });

        loop {
            tokio::select! {
                result = self.run_cycle() => {
                    if let Err(e) = result {
                        let fatal = e.is_fatal();
                        self.emit_event(UpdaterEvent::CycleFailed {
                            error: e.to_string(),
                            fatal,
                        });

                        if fatal {
                            error!("Stopping DNS updater: {}", e);
                            self.emit_event(UpdaterEvent::Stopped {
                                reason: e.to_string(),
                            });
                            return Err(e);
                        }

                        warn!("Cycle aborted, retrying in {:?}: {}", self.check_interval, e);
                    }
                }

                _ = &mut shutdown => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.check_interval) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("Shutdown signal received, exiting DNS updater");
        self.emit_event(UpdaterEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        Ok(())
    }

    /// Execute a single cycle: fetch, match, decide, and update if needed
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let current_ip = self.ip_source.current().await?;
        info!("Current public IP: {}", current_ip);

        debug!("Fetching DNS records for domain: {}", self.domain);
        let records = self.provider.list_records(&self.domain).await?;
        for record in &records {
            debug!(
                "Record: {} | Type: {} | Content: {:?}",
                record.name, record.record_type, record.content
            );
        }

        let record = locate_record(&records, &self.target, &RecordType::for_ip(&current_ip))?;
        let decision = decide(record, current_ip)?;
        info!(
            "Found DNS record {} of type {}: {}",
            self.target, record.record_type, decision.record_ip
        );

        if !decision.should_update {
            info!("No change in public IP, skipping DNS update");
            self.emit_event(UpdaterEvent::UpdateSkipped {
                fqdn: self.target.clone(),
                current_ip,
            });
            return Ok(CycleOutcome::Unchanged { ip: current_ip });
        }

        warn!(
            "Public IP {} does not match DNS record IP {}, updating DNS record",
            current_ip, decision.record_ip
        );
        self.emit_event(UpdaterEvent::DriftDetected {
            fqdn: self.target.clone(),
            record_ip: decision.record_ip,
            current_ip,
        });

        let request = UpdateRequest::new(self.target.clone(), current_ip).with_ttl(self.ttl);
        self.provider
            .update_record(&self.domain, &request)
            .await
            .map_err(|e| Error::update_failed(&self.target, e.to_string()))?;

        info!("DNS record for {} updated to {}", self.target, current_ip);
        self.emit_event(UpdaterEvent::UpdateSucceeded {
            fqdn: self.target.clone(),
            new_ip: current_ip,
            previous_ip: decision.record_ip,
        });

        Ok(CycleOutcome::Updated {
            previous_ip: decision.record_ip,
            new_ip: current_ip,
        })
    }

    fn emit_event(&self, event: UpdaterEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(TrySendError::Closed(_)) => {
                trace!("No event receiver, dropping event");
            }
        }
    }
}
