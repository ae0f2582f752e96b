//! User management flow: role changes and activation toggles.
//!
//! Three checks guard every operation, in order: the actor must hold
//! `manageUsers` (owner only), the target must not be the actor
//! themselves (identity comparison, not role logic), and the role
//! hierarchy must admit the pairing (`can_manage`: owners manage
//! non-owners, nobody manages an owner).

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::store::{UserRecord, UserStore};
use crate::{Actor, GateError, Result};
use serde_json::json;
use tracing::{debug, warn};
use zonegate_core::{Capability, Role};

/// Gated user administration over a [`UserStore`].
pub struct UserAdmin<U, A> {
    users: U,
    audit: A,
}

impl<U: UserStore, A: AuditSink> UserAdmin<U, A> {
    /// Assemble the user admin facade.
    pub const fn new(users: U, audit: A) -> Self {
        Self { users, audit }
    }

    /// Change a user's role. Owner only; not on yourself; not on
    /// another owner.
    pub async fn change_role(
        &self,
        actor: &Actor,
        target_id: i64,
        new_role: Role,
    ) -> Result<UserRecord> {
        let target = self.authorize(actor, target_id).await?;
        let old_role = target.role;

        let updated = self.users.set_role(target_id, new_role).await?;
        debug!(actor_id = actor.id, target_id, %old_role, %new_role, "role changed");
        self.emit(
            actor,
            AuditAction::UserRoleChange,
            target_id,
            json!({
                "target_user": { "id": target.id, "email": target.email },
                "old_role": old_role,
                "new_role": new_role,
            }),
        )
        .await;
        Ok(updated)
    }

    /// Activate or deactivate a user. Same guards as role changes.
    pub async fn set_active(
        &self,
        actor: &Actor,
        target_id: i64,
        active: bool,
    ) -> Result<UserRecord> {
        let target = self.authorize(actor, target_id).await?;

        let updated = self.users.set_active(target_id, active).await?;
        let action = if active {
            AuditAction::UserActivate
        } else {
            AuditAction::UserDeactivate
        };
        debug!(actor_id = actor.id, target_id, active, "activation changed");
        self.emit(
            actor,
            action,
            target_id,
            json!({ "target_user": { "id": target.id, "email": target.email } }),
        )
        .await;
        Ok(updated)
    }

    /// Shared guard chain; returns the target on success.
    async fn authorize(&self, actor: &Actor, target_id: i64) -> Result<UserRecord> {
        actor.require(Capability::ManageUsers)?;

        let target = self
            .users
            .get(target_id)
            .await?
            .ok_or_else(|| GateError::NotFound(format!("user {target_id}")))?;

        if target.id == actor.id {
            return Err(GateError::SelfManagement);
        }
        if !actor.role.can_manage(target.role) {
            return Err(GateError::CannotManage {
                target: target.role,
            });
        }
        Ok(target)
    }

    async fn emit(
        &self,
        actor: &Actor,
        action: AuditAction,
        target_id: i64,
        metadata: serde_json::Value,
    ) {
        let event = AuditEvent::new(
            actor.id,
            actor.email.clone(),
            action,
            Some(target_id.to_string()),
            metadata,
        );
        if let Err(err) = self.audit.record(event).await {
            warn!(%err, %action, "failed to record audit event");
        }
    }
}
