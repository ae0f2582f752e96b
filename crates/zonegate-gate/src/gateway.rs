//! The DNS mutation gateway.
//!
//! Orchestrates the permission check, blocklist evaluation, provider
//! call, and audit write for every record and rule operation. The
//! blocklist snapshot is re-fetched from the store on each evaluation;
//! callers wanting a compiled cache own its invalidation.

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::config::GateConfig;
use crate::store::{NewRule, RulePatch, RuleStore};
use crate::validation;
use crate::{GateError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use zonegate_cloudflare::{CloudflareClient, NewRecord, ProviderRecord, RecordPage, RecordPatch};
use zonegate_core::{check_pattern, evaluate, BlocklistRule, Candidate, Capability, RecordType, Role};

/// Authenticated principal, resolved by the session layer upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// User id
    pub id: i64,
    /// Login email (recorded in the audit trail)
    pub email: String,
    /// Access tier for this session
    pub role: Role,
}

impl Actor {
    /// Build an actor.
    #[must_use]
    pub fn new(id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Deny unless this actor's role carries the capability.
    pub(crate) fn require(&self, capability: Capability) -> Result<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            debug!(actor_id = self.id, role = %self.role, ?capability, "capability denied");
            Err(GateError::Forbidden { capability })
        }
    }
}

/// Filters for record listings.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Restrict to one record type
    pub record_type: Option<RecordType>,
    /// Restrict to one record name
    pub name: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Page size; clamped to the configured maximum
    pub per_page: Option<u32>,
}

/// Policy-gated facade over the DNS provider and the rule store.
pub struct DnsGateway<R, A> {
    provider: CloudflareClient,
    rules: R,
    audit: A,
    config: GateConfig,
}

impl<R: RuleStore, A: AuditSink> DnsGateway<R, A> {
    /// Assemble a gateway.
    pub const fn new(provider: CloudflareClient, rules: R, audit: A, config: GateConfig) -> Self {
        Self {
            provider,
            rules,
            audit,
            config,
        }
    }

    /// List records in the zone. Requires `viewDNS`.
    pub async fn list_records(&self, actor: &Actor, query: RecordQuery) -> Result<RecordPage> {
        actor.require(Capability::ViewDns)?;

        let mut request = self
            .provider
            .records()
            .list()
            .per_page(self.config.page_size(query.per_page));
        if let Some(record_type) = query.record_type {
            request = request.record_type(record_type);
        }
        if let Some(name) = query.name {
            request = request.name(name);
        }
        if let Some(page) = query.page {
            request = request.page(page);
        }
        Ok(request.send().await?)
    }

    /// Create a record. Requires `createDNS`; the candidate must clear
    /// the blocklist before it reaches the provider.
    pub async fn create_record(&self, actor: &Actor, mut record: NewRecord) -> Result<ProviderRecord> {
        actor.require(Capability::CreateDns)?;
        validation::validate_new_record(&record)?;
        self.check_blocklist(&record.candidate()).await?;

        if record.ttl.is_none() {
            record.ttl = Some(self.config.default_ttl);
        }

        let created = self.provider.records().create(&record).await?;
        debug!(actor_id = actor.id, record_id = %created.id, "record created");
        self.emit(
            actor,
            AuditAction::DnsCreate,
            Some(created.id.clone()),
            json!({ "record": {
                "type": created.record_type,
                "name": created.name,
                "content": created.content,
            }}),
        )
        .await;
        Ok(created)
    }

    /// Update a record. Requires `editDNS`. The blocklist sees the
    /// merged post-update state, not the patch in isolation.
    pub async fn update_record(
        &self,
        actor: &Actor,
        id: &str,
        patch: RecordPatch,
    ) -> Result<ProviderRecord> {
        actor.require(Capability::EditDns)?;
        validation::validate_patch(&patch)?;

        let existing = self.provider.records().get(id).await?;
        let candidate = patch.candidate_over(&existing);
        validation::validate_content(candidate.record_type, &candidate.content)?;
        self.check_blocklist(&candidate).await?;

        let updated = self.provider.records().update(id, &patch).await?;
        debug!(actor_id = actor.id, record_id = id, "record updated");
        self.emit(
            actor,
            AuditAction::DnsUpdate,
            Some(id.to_string()),
            json!({
                "before": { "name": existing.name, "content": existing.content },
                "patch": patch,
            }),
        )
        .await;
        Ok(updated)
    }

    /// Delete a record. Requires `deleteDNS`; deletions are not subject
    /// to the blocklist.
    pub async fn delete_record(&self, actor: &Actor, id: &str) -> Result<String> {
        actor.require(Capability::DeleteDns)?;

        let deleted = self.provider.records().delete(id).await?;
        debug!(actor_id = actor.id, record_id = %deleted, "record deleted");
        self.emit(
            actor,
            AuditAction::DnsDelete,
            Some(deleted.clone()),
            json!({}),
        )
        .await;
        Ok(deleted)
    }

    /// List blocklist rules in evaluation order. Requires `manageBlacklist`.
    pub async fn list_rules(&self, actor: &Actor) -> Result<Vec<BlocklistRule>> {
        actor.require(Capability::ManageBlocklist)?;
        self.rules.list().await
    }

    /// Create a blocklist rule. Requires `manageBlacklist`. Malformed
    /// patterns are rejected here rather than silently never matching.
    pub async fn add_rule(&self, actor: &Actor, mut rule: NewRule) -> Result<BlocklistRule> {
        actor.require(Capability::ManageBlocklist)?;
        validation::validate_new_rule(&rule)?;

        rule.description = rule.description.filter(|d| !d.is_empty());
        let created = self.rules.insert(rule).await?;
        self.emit(
            actor,
            AuditAction::BlocklistCreate,
            Some(created.id.to_string()),
            json!({ "rule": created }),
        )
        .await;
        Ok(created)
    }

    /// Partially update a rule. Requires `manageBlacklist`. The merged
    /// (pattern, is_regex) pair must still be valid.
    pub async fn edit_rule(&self, actor: &Actor, id: i64, patch: RulePatch) -> Result<BlocklistRule> {
        actor.require(Capability::ManageBlocklist)?;
        if patch.is_empty() {
            return Err(GateError::Invalid("no fields to update".to_string()));
        }

        let existing = self
            .rules
            .get(id)
            .await?
            .ok_or_else(|| GateError::NotFound(format!("blocklist rule {id}")))?;
        let pattern = patch.pattern.as_deref().unwrap_or(&existing.pattern);
        let is_regex = patch.is_regex.unwrap_or(existing.is_regex);
        check_pattern(pattern, is_regex).map_err(GateError::Invalid)?;

        let updated = self.rules.update(id, patch).await?;
        self.emit(
            actor,
            AuditAction::BlocklistUpdate,
            Some(id.to_string()),
            json!({ "rule": updated }),
        )
        .await;
        Ok(updated)
    }

    /// Delete a rule. Requires `manageBlacklist`.
    pub async fn remove_rule(&self, actor: &Actor, id: i64) -> Result<BlocklistRule> {
        actor.require(Capability::ManageBlocklist)?;

        let removed = self.rules.delete(id).await?;
        self.emit(
            actor,
            AuditAction::BlocklistDelete,
            Some(id.to_string()),
            json!({ "rule": removed }),
        )
        .await;
        Ok(removed)
    }

    /// Evaluate the current rule snapshot against a candidate mutation.
    async fn check_blocklist(&self, candidate: &Candidate) -> Result<()> {
        let rules = self.rules.list().await?;
        match evaluate(candidate, &rules) {
            Some(rule) => {
                debug!(rule_id = rule.id, name = %candidate.name, "mutation blocked");
                Err(GateError::Blocked { rule: rule.clone() })
            }
            None => Ok(()),
        }
    }

    /// Write an audit event; failures are logged, never surfaced.
    async fn emit(
        &self,
        actor: &Actor,
        action: AuditAction,
        target_id: Option<String>,
        metadata: serde_json::Value,
    ) {
        let event = AuditEvent::new(actor.id, actor.email.clone(), action, target_id, metadata);
        if let Err(err) = self.audit.record(event).await {
            warn!(%err, %action, "failed to record audit event");
        }
    }
}
