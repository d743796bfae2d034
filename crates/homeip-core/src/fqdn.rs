//! Record name resolution
//!
//! Turns a user-supplied record name (`@`, `www`, or `www.example.com`)
//! into the canonical fully qualified name under a domain, and compares
//! names the way DNS does: case-insensitive, ignoring the trailing root dot.
//!
//! Canonical names are lowercase and carry no trailing dot. Resolution is
//! idempotent: `resolve(&resolve(r, d)?, d)? == resolve(r, d)?`.

use crate::error::{Error, Result};

/// Short record name that stands for the domain apex
pub const APEX: &str = "@";

/// Normalize a DNS name: strip trailing dots and lowercase.
///
/// Example: `"WWW.Example.com."` -> `"www.example.com"`
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Resolve a short or fully qualified record name into an FQDN under `domain`.
///
/// - `"@"` resolves to the domain itself
/// - A bare label (no dot) is prefixed to the domain
/// - A dotted name must equal the domain or end with `.<domain>`
///
/// # Errors
///
/// - [`Error::InvalidInput`] if either argument is empty
/// - [`Error::DomainMismatch`] if a dotted name is outside the domain
pub fn resolve(record: &str, domain: &str) -> Result<String> {
    let record = normalize(record);
    let domain = normalize(domain);

    if record.is_empty() || domain.is_empty() {
        return Err(Error::invalid_input(
            "Both record and domain names are required",
        ));
    }

    if !record.contains('.') {
        if record == APEX {
            return Ok(domain);
        }
        return Ok(format!("{record}.{domain}"));
    }

    if is_within(&record, &domain) {
        Ok(record)
    } else {
        Err(Error::domain_mismatch(record, domain))
    }
}

/// Check whether two DNS names refer to the same node.
#[must_use]
pub fn matches(name: &str, other: &str) -> bool {
    normalize(name) == normalize(other)
}

// Label-aware suffix check; both names must already be normalized.
fn is_within(name: &str, domain: &str) -> bool {
    name == domain
        || name
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
