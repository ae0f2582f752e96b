//! Payload validation for record and rule mutations.
//!
//! Runs before any policy evaluation or provider call. Malformed regex
//! patterns are rejected here, at rule-creation time, instead of being
//! discovered as silent no-ops at match time.

use crate::store::NewRule;
use crate::{GateError, Result};
use std::net::{Ipv4Addr, Ipv6Addr};
use zonegate_cloudflare::{NewRecord, RecordPatch};
use zonegate_core::{check_pattern, RecordType};

/// TTL upper bound (seconds); 1 means provider-automatic.
const MAX_TTL: u32 = i32::MAX as u32;

/// Validate a record creation payload.
pub fn validate_new_record(record: &NewRecord) -> Result<()> {
    if record.name.is_empty() {
        return Err(GateError::Invalid("name is required".to_string()));
    }
    if let Some(ttl) = record.ttl {
        validate_ttl(ttl)?;
    }
    if record.record_type == RecordType::Mx && record.priority.is_none() {
        return Err(GateError::Invalid("MX records require a priority".to_string()));
    }
    validate_content(record.record_type, &record.content)
}

/// Validate a record update payload (field presence only; the merged
/// candidate's content is validated by the gateway once the existing
/// record is known).
pub fn validate_patch(patch: &RecordPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(GateError::Invalid("no fields to update".to_string()));
    }
    if patch.name.as_deref() == Some("") {
        return Err(GateError::Invalid("name is required".to_string()));
    }
    if let Some(ttl) = patch.ttl {
        validate_ttl(ttl)?;
    }
    Ok(())
}

/// Validate record content for its type.
pub fn validate_content(record_type: RecordType, content: &str) -> Result<()> {
    if content.is_empty() {
        return Err(GateError::Invalid("content is required".to_string()));
    }
    match record_type {
        RecordType::A => {
            content.parse::<Ipv4Addr>().map_err(|_| {
                GateError::Invalid(format!("invalid IPv4 address: {content:?}"))
            })?;
        }
        RecordType::Aaaa => {
            content.parse::<Ipv6Addr>().map_err(|_| {
                GateError::Invalid(format!("invalid IPv6 address: {content:?}"))
            })?;
        }
        // Hostname/text contents are forwarded as-is; the provider is
        // the authority on their syntax.
        RecordType::Cname
        | RecordType::Mx
        | RecordType::Txt
        | RecordType::Srv
        | RecordType::Ns => {}
    }
    Ok(())
}

/// Validate a blocklist rule creation payload.
pub fn validate_new_rule(rule: &NewRule) -> Result<()> {
    check_pattern(&rule.pattern, rule.is_regex).map_err(GateError::Invalid)
}

fn validate_ttl(ttl: u32) -> Result<()> {
    if ttl == 0 || ttl > MAX_TTL {
        return Err(GateError::Invalid(format!(
            "ttl must be between 1 and {MAX_TTL}, got {ttl}"
        )));
    }
    Ok(())
}
