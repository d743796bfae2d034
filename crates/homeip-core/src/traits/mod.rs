//! Core traits for the homeip updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public IP address
//! - [`DnsProvider`]: List and update DNS records via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion, IpSourceFactory};
pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, RecordType, UpdateRequest, DEFAULT_TTL,
};
