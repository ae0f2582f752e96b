//! Wire types for the Cloudflare DNS records API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zonegate_core::{Candidate, RecordType};

/// Standard Cloudflare response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the call succeeded
    pub success: bool,

    /// Payload (absent on failure)
    #[serde(default = "none")]
    pub result: Option<T>,

    /// Error list (populated on failure)
    #[serde(default)]
    pub errors: Vec<ApiError>,

    /// Informational messages
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,

    /// Pagination info for list calls
    #[serde(default = "none")]
    pub result_info: Option<ResultInfo>,
}

// serde's `default` cannot name `Option::None` generically.
const fn none<T>() -> Option<T> {
    None
}

/// Error entry in a failed envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Cloudflare error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
}

/// Pagination block on list responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_count: u64,
}

/// DNS record as stored at the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Provider-assigned record id
    pub id: String,

    /// Record type tag
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Fully-qualified record name
    pub name: String,

    /// Record content (address, target hostname, text, ...)
    pub content: String,

    /// Time to live in seconds (1 = provider-automatic)
    pub ttl: u32,

    /// Whether the record is proxied through the provider's edge
    #[serde(default)]
    pub proxied: bool,

    /// Priority (MX/SRV)
    #[serde(default)]
    pub priority: Option<u16>,

    /// Creation timestamp
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,

    /// Last modification timestamp
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

impl ProviderRecord {
    /// View this record as a policy-evaluation candidate.
    #[must_use]
    pub fn candidate(&self) -> Candidate {
        Candidate::new(self.record_type, self.name.clone(), self.content.clone())
    }
}

/// Payload for record creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    /// Record type tag
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record name
    pub name: String,

    /// Record content
    pub content: String,

    /// TTL in seconds; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Proxy through the provider's edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,

    /// Priority (required for MX)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl NewRecord {
    /// Build a minimal creation payload.
    #[must_use]
    pub fn new(record_type: RecordType, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: None,
            proxied: None,
            priority: None,
        }
    }

    /// View this payload as a policy-evaluation candidate.
    #[must_use]
    pub fn candidate(&self) -> Candidate {
        Candidate::new(self.record_type, self.name.clone(), self.content.clone())
    }
}

/// Partial update payload (PATCH semantics: absent fields keep their
/// stored value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    /// New record type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,

    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// New TTL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// New proxy setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,

    /// New priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl RecordPatch {
    /// True when the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.record_type.is_none()
            && self.name.is_none()
            && self.content.is_none()
            && self.ttl.is_none()
            && self.proxied.is_none()
            && self.priority.is_none()
    }

    /// The candidate this patch would produce when applied to `existing`.
    ///
    /// This is what the blocklist must see: the post-update state, not
    /// the patch in isolation.
    #[must_use]
    pub fn candidate_over(&self, existing: &ProviderRecord) -> Candidate {
        Candidate::new(
            self.record_type.unwrap_or(existing.record_type),
            self.name.clone().unwrap_or_else(|| existing.name.clone()),
            self.content.clone().unwrap_or_else(|| existing.content.clone()),
        )
    }
}

/// One page of the record listing
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Records on this page
    pub records: Vec<ProviderRecord>,
    /// Total record count across all pages
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decodes_failure() {
        let body = r#"{"success":false,"errors":[{"code":81044,"message":"Record not found"}],"messages":[],"result":null}"#;
        let env: ApiEnvelope<ProviderRecord> = serde_json::from_str(body).unwrap();
        assert!(!env.success);
        assert!(env.result.is_none());
        assert_eq!(env.errors[0].code, 81044);
    }

    #[test]
    fn test_provider_record_decodes() {
        let body = r#"{
            "id": "abc123",
            "type": "A",
            "name": "www.example.com",
            "content": "192.0.2.1",
            "ttl": 300,
            "proxied": true,
            "created_on": "2024-01-15T09:30:00Z",
            "modified_on": "2024-01-16T10:00:00Z"
        }"#;
        let record: ProviderRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.record_type, RecordType::A);
        assert!(record.proxied);
        assert!(record.created_on.is_some());
        let cand = record.candidate();
        assert_eq!(cand.name, "www.example.com");
        assert_eq!(cand.content, "192.0.2.1");
    }

    #[test]
    fn test_new_record_skips_absent_fields() {
        let payload = NewRecord::new(RecordType::Txt, "x.example.com", "v=spf1 -all");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "TXT");
        assert!(json.get("ttl").is_none());
        assert!(json.get("priority").is_none());
    }

    #[test]
    fn test_patch_merge_candidate() {
        let existing: ProviderRecord = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "type": "A",
            "name": "app.example.com",
            "content": "192.0.2.1",
            "ttl": 300
        }))
        .unwrap();

        let patch = RecordPatch {
            content: Some("198.51.100.9".to_string()),
            ..RecordPatch::default()
        };
        let cand = patch.candidate_over(&existing);
        assert_eq!(cand.record_type, RecordType::A);
        assert_eq!(cand.name, "app.example.com");
        assert_eq!(cand.content, "198.51.100.9");

        assert!(RecordPatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
