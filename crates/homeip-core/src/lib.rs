// # homeip-core
//
// Core library for the homeip dynamic DNS updater.
//
// ## Architecture Overview
//
// The updater is a single polling loop built from small, replaceable parts:
// - **IpSource**: Trait for discovering the caller's current public IP
// - **DnsProvider**: Trait for listing and updating records via a provider API
// - **fqdn**: Pure record-name resolution and matching
// - **Updater**: The loop that compares the published IP with the current one
// - **ProviderRegistry**: Maps provider identifiers to factories
//
// ## Design Principles
//
// 1. **Stateless**: Every cycle re-derives the truth from the provider, nothing is persisted
// 2. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 3. **Library-First**: The daemon is a thin wrapper over this crate
// 4. **Fail Loudly on Misconfiguration**: Transient failures retry, bad records halt

pub mod traits;
pub mod fqdn;
pub mod updater;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord, RecordType, UpdateRequest};
pub use updater::{Updater, UpdaterEvent, CycleOutcome, UpdateDecision};
pub use registry::ProviderRegistry;
pub use config::{UpdaterConfig, IpSourceConfig, ProviderConfig};
pub use error::{Error, Result};
