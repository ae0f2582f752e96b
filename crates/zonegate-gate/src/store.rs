//! Storage seams for rules and users.
//!
//! Persistence is outside this crate's scope; these traits are the
//! contract a backing store must satisfy. The gateway re-fetches the
//! rule snapshot on every evaluation rather than caching it, so store
//! implementations own consistency.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zonegate_core::{BlocklistRule, Role, RuleField, TypeFilter};

/// Blocklist rule storage.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// All rules in stable storage order. The order is the evaluation
    /// precedence: first match wins.
    async fn list(&self) -> Result<Vec<BlocklistRule>>;

    /// Fetch one rule by id.
    async fn get(&self, id: i64) -> Result<Option<BlocklistRule>>;

    /// Persist a new rule, assigning its id.
    async fn insert(&self, rule: NewRule) -> Result<BlocklistRule>;

    /// Apply a partial update, returning the stored result.
    async fn update(&self, id: i64, patch: RulePatch) -> Result<BlocklistRule>;

    /// Remove a rule, returning it for the audit trail.
    async fn delete(&self, id: i64) -> Result<BlocklistRule>;
}

#[async_trait]
impl<T: RuleStore + ?Sized> RuleStore for std::sync::Arc<T> {
    async fn list(&self) -> Result<Vec<BlocklistRule>> {
        (**self).list().await
    }

    async fn get(&self, id: i64) -> Result<Option<BlocklistRule>> {
        (**self).get(id).await
    }

    async fn insert(&self, rule: NewRule) -> Result<BlocklistRule> {
        (**self).insert(rule).await
    }

    async fn update(&self, id: i64, patch: RulePatch) -> Result<BlocklistRule> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<BlocklistRule> {
        (**self).delete(id).await
    }
}

/// Payload for rule creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRule {
    /// Which candidate field(s) to test
    pub field: RuleField,

    /// Glob or regex pattern
    pub pattern: String,

    /// Whether `pattern` is a regular expression
    #[serde(default)]
    pub is_regex: bool,

    /// Record-type scope
    #[serde(default = "TypeFilter::any", rename = "type")]
    pub types: TypeFilter,

    /// Explanation shown to blocked requesters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial rule update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulePatch {
    #[serde(default)]
    pub field: Option<RuleField>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub is_regex: Option<bool>,
    #[serde(default, rename = "type")]
    pub types: Option<TypeFilter>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RulePatch {
    /// True when the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.field.is_none()
            && self.pattern.is_none()
            && self.is_regex.is_none()
            && self.types.is_none()
            && self.description.is_none()
    }
}

/// Managed user account, as the gateway sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Storage id
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Access tier
    pub role: Role,
    /// Deactivated users cannot authenticate
    pub is_active: bool,
}

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch one user by id.
    async fn get(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Change a user's role, returning the stored result.
    async fn set_role(&self, id: i64, role: Role) -> Result<UserRecord>;

    /// Change a user's activation flag, returning the stored result.
    async fn set_active(&self, id: i64, active: bool) -> Result<UserRecord>;
}

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for std::sync::Arc<T> {
    async fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        (**self).get(id).await
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<UserRecord> {
        (**self).set_role(id, role).await
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<UserRecord> {
        (**self).set_active(id, active).await
    }
}
