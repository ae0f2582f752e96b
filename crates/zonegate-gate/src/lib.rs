//! Policy-gated DNS mutation service.
//!
//! The gateway sits between an authenticated caller and the DNS
//! provider. Every operation follows the same shape:
//!
//! 1. resolve the actor's role to a capability and check it;
//! 2. for create/update, evaluate the current blocklist snapshot
//!    against the candidate record; a match aborts the mutation;
//! 3. forward to the provider;
//! 4. record an audit event (best effort: audit failure never fails
//!    the operation).
//!
//! HTTP routing, sessions, and persistence live outside this crate:
//! callers supply an [`Actor`] they have already authenticated, and
//! storage is reached through the [`RuleStore`]/[`UserStore`] traits.

mod audit;
mod config;
mod error;
mod gateway;
mod store;
mod users;
mod validation;

pub use audit::{sanitize_metadata, AuditAction, AuditEvent, AuditSink, TracingAudit};
pub use config::GateConfig;
pub use error::{GateError, Result};
pub use gateway::{Actor, DnsGateway, RecordQuery};
pub use store::{NewRule, RulePatch, RuleStore, UserRecord, UserStore};
pub use users::UserAdmin;
pub use validation::{validate_content, validate_new_record, validate_new_rule, validate_patch};
