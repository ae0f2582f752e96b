//! Audit trail types and sink.
//!
//! Every gated mutation emits one [`AuditEvent`]. Writing the event is
//! best effort: a failing sink is logged and swallowed so audit
//! problems never break the operation being audited.

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::info;

/// Audit action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "dns.create")]
    DnsCreate,
    #[serde(rename = "dns.update")]
    DnsUpdate,
    #[serde(rename = "dns.delete")]
    DnsDelete,
    #[serde(rename = "blacklist.create")]
    BlocklistCreate,
    #[serde(rename = "blacklist.update")]
    BlocklistUpdate,
    #[serde(rename = "blacklist.delete")]
    BlocklistDelete,
    #[serde(rename = "user.role_change")]
    UserRoleChange,
    #[serde(rename = "user.activate")]
    UserActivate,
    #[serde(rename = "user.deactivate")]
    UserDeactivate,
}

impl AuditAction {
    /// Action tag as stored in the audit log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DnsCreate => "dns.create",
            Self::DnsUpdate => "dns.update",
            Self::DnsDelete => "dns.delete",
            Self::BlocklistCreate => "blacklist.create",
            Self::BlocklistUpdate => "blacklist.update",
            Self::BlocklistDelete => "blacklist.delete",
            Self::UserRoleChange => "user.role_change",
            Self::UserActivate => "user.activate",
            Self::UserDeactivate => "user.deactivate",
        }
    }

    /// Kind of entity this action targets.
    #[must_use]
    pub const fn target_type(self) -> &'static str {
        match self {
            Self::DnsCreate | Self::DnsUpdate | Self::DnsDelete => "dns_record",
            Self::BlocklistCreate | Self::BlocklistUpdate | Self::BlocklistDelete => "blacklist",
            Self::UserRoleChange | Self::UserActivate | Self::UserDeactivate => "user",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Id of the acting user
    pub actor_id: i64,

    /// Email of the acting user
    pub actor_email: String,

    /// What happened
    pub action: AuditAction,

    /// Id of the affected entity, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,

    /// Free-form context; sensitive keys are redacted on construction
    pub metadata: Value,

    /// When the event was recorded
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event, sanitizing the metadata.
    #[must_use]
    pub fn new(
        actor_id: i64,
        actor_email: impl Into<String>,
        action: AuditAction,
        target_id: Option<String>,
        metadata: Value,
    ) -> Self {
        Self {
            actor_id,
            actor_email: actor_email.into(),
            action,
            target_id,
            metadata: sanitize_metadata(metadata),
            at: Utc::now(),
        }
    }
}

/// Destination for audit events.
///
/// Implementations must tolerate concurrent calls; the gateway never
/// serializes event delivery.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one event.
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

#[async_trait]
impl<T: AuditSink + ?Sized> AuditSink for std::sync::Arc<T> {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        (**self).record(event).await
    }
}

/// Sink that writes events to the tracing subscriber.
///
/// The default when no durable audit store is wired up; mirrors what
/// the log pipeline receives alongside a durable sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

#[async_trait]
impl AuditSink for TracingAudit {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        info!(
            audit = true,
            actor_id = event.actor_id,
            actor_email = %event.actor_email,
            action = %event.action,
            target_type = event.action.target_type(),
            target_id = event.target_id.as_deref().unwrap_or(""),
            metadata = %event.metadata,
            "audit event"
        );
        Ok(())
    }
}

/// Keys whose values are never written to the audit trail.
const SENSITIVE_KEYS: [&str; 7] = [
    "password",
    "password_hash",
    "token",
    "secret",
    "key",
    "auth",
    "authorization",
];

/// Recursively redact sensitive fields from audit metadata.
#[must_use]
pub fn sanitize_metadata(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    let lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|s| lower.contains(s)) {
                        (key, Value::String("[REDACTED]".to_string()))
                    } else {
                        (key, sanitize_metadata(val))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_metadata).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_tags_and_targets() {
        assert_eq!(AuditAction::DnsCreate.as_str(), "dns.create");
        assert_eq!(AuditAction::DnsCreate.target_type(), "dns_record");
        assert_eq!(AuditAction::BlocklistDelete.target_type(), "blacklist");
        assert_eq!(AuditAction::UserRoleChange.target_type(), "user");
        assert_eq!(
            serde_json::to_string(&AuditAction::UserDeactivate).unwrap(),
            "\"user.deactivate\""
        );
    }

    #[test]
    fn test_sanitize_redacts_nested_sensitive_keys() {
        let dirty = json!({
            "record": { "name": "www", "api_token": "s3cret" },
            "password": "hunter2",
            "list": [{ "secret_value": "x", "ok": 1 }],
            "note": "fine"
        });
        let clean = sanitize_metadata(dirty);
        assert_eq!(clean["record"]["api_token"], "[REDACTED]");
        assert_eq!(clean["record"]["name"], "www");
        assert_eq!(clean["password"], "[REDACTED]");
        assert_eq!(clean["list"][0]["secret_value"], "[REDACTED]");
        assert_eq!(clean["list"][0]["ok"], 1);
        assert_eq!(clean["note"], "fine");
    }

    #[test]
    fn test_event_construction_sanitizes() {
        let event = AuditEvent::new(
            7,
            "owner@example.com",
            AuditAction::DnsCreate,
            Some("r1".to_string()),
            json!({ "auth_header": "Bearer xyz" }),
        );
        assert_eq!(event.metadata["auth_header"], "[REDACTED]");
        assert_eq!(event.actor_id, 7);
    }
}
