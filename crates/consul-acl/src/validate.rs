//! Local checks on role payloads
//!
//! Policy links and service identities are checked before a request body is
//! built, so a malformed role never reaches the network.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::{PolicyLink, ServiceIdentity};

/// Every link must carry an `ID` or a `Name`. Stops at the first bad link.
pub fn validate_policy_links(links: &[PolicyLink]) -> Result<()> {
    links.iter().try_for_each(PolicyLink::validate)
}

/// Every identity must carry a `ServiceName`. Stops at the first bad one.
pub fn validate_service_identities(identities: &[ServiceIdentity]) -> Result<()> {
    identities.iter().try_for_each(ServiceIdentity::validate)
}

/// Validates `structures` with `check` and returns their JSON form.
///
/// Absent and empty inputs produce `None` so the caller emits no key at all.
pub fn format_structures<T, F>(structures: Option<&[T]>, check: F) -> Result<Option<Value>>
where
    T: Serialize,
    F: FnOnce(&[T]) -> Result<()>,
{
    let structures = match structures {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    check(structures)?;
    Ok(Some(serde_json::to_value(structures)?))
}
