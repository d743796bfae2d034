//! Test doubles and common utilities for updater contract tests
//!
//! The doubles are scripted: tests queue failures up front and inspect
//! call counters afterwards.

#![allow(dead_code)]

use homeip_core::error::{Error, Result};
use homeip_core::traits::{DnsProvider, DnsRecord, IpSource, UpdateRequest};
use homeip_core::{UpdaterConfig, UpdaterEvent};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Domain used by every contract test
pub const DOMAIN: &str = "example.com";

/// An IpSource that replays queued results, then a fixed IP
#[derive(Clone)]
pub struct ScriptedIpSource {
    fallback: IpAddr,
    script: Arc<Mutex<VecDeque<Result<IpAddr>>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            fallback: ip.parse().expect("valid test IP"),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next call fail
    pub fn fail_next(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::ip_source(message)));
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.fallback),
        }
    }
}

/// A DnsProvider backed by an in-memory record list
///
/// Successful updates are applied to the list, so the next cycle observes
/// them the way it would observe a real provider.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    pending_list_failures: Arc<AtomicUsize>,
    pending_update_failures: Arc<AtomicUsize>,
    list_call_count: Arc<AtomicUsize>,
    update_attempts: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<(String, UpdateRequest)>>>,
}

impl MockDnsProvider {
    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let provider = Self::default();
        *provider.records.lock().unwrap() = records;
        provider
    }

    /// Fail the next `n` list_records() calls with a provider error
    pub fn fail_next_lists(&self, n: usize) {
        self.pending_list_failures.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` update_record() calls with a provider error
    pub fn fail_next_updates(&self, n: usize) {
        self.pending_update_failures.store(n, Ordering::SeqCst);
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of update_record() calls, failed ones included
    pub fn update_attempts(&self) -> usize {
        self.update_attempts.load(Ordering::SeqCst)
    }

    /// Get the successful updates as (domain, request) pairs
    pub fn updates(&self) -> Vec<(String, UpdateRequest)> {
        self.updates.lock().unwrap().clone()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, _domain: &str) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.pending_list_failures) {
            return Err(Error::provider("mock", "HTTP error: 503 Service Unavailable"));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn update_record(&self, domain: &str, request: &UpdateRequest) -> Result<()> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.pending_update_failures) {
            return Err(Error::provider("mock", "HTTP error: 500 Internal Server Error"));
        }

        let mut records = self.records.lock().unwrap();
        for record in records.iter_mut() {
            if homeip_core::fqdn::matches(&record.name, &request.name)
                && record.record_type == request.record_type
            {
                record.content = vec![request.ip.to_string()];
            }
        }
        self.updates
            .lock()
            .unwrap()
            .push((domain.to_string(), request.clone()));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A DnsProvider whose list call never completes
pub struct HangingProvider;

#[async_trait::async_trait]
impl DnsProvider for HangingProvider {
    async fn list_records(&self, _domain: &str) -> Result<Vec<DnsRecord>> {
        std::future::pending().await
    }

    async fn update_record(&self, _domain: &str, _request: &UpdateRequest) -> Result<()> {
        std::future::pending().await
    }

    fn provider_name(&self) -> &'static str {
        "hanging"
    }
}

/// Build a record the way a provider would list it
pub fn record(name: &str, record_type: &str, content: &[&str]) -> DnsRecord {
    DnsRecord::new(
        name,
        record_type,
        content.iter().map(|c| c.to_string()).collect(),
    )
}

/// Helper to create a minimal UpdaterConfig for testing
pub fn minimal_config(record: &str) -> UpdaterConfig {
    UpdaterConfig::new(DOMAIN, record).with_check_interval(Duration::from_millis(20))
}

/// Wait (bounded) for the next event matching `predicate`
pub async fn next_matching<F>(rx: &mut mpsc::Receiver<UpdaterEvent>, predicate: F) -> UpdaterEvent
where
    F: Fn(&UpdaterEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Some(event) if predicate(&event) => return event,
                Some(_) => continue,
                None => panic!("event channel closed before expected event"),
            }
        }
    })
    .await
    .expect("timed out waiting for updater event")
}
