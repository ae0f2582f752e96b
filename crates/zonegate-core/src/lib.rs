//! Core policy types for the zonegate DNS administration gateway.
//!
//! This crate is the pure, side-effect-free heart of the system:
//!
//! - **Roles**: the `user < admin < owner` hierarchy and its fixed
//!   capability table ([`Role`], [`Permissions`], [`Capability`])
//! - **Blocklist**: pattern rules evaluated against a candidate DNS
//!   mutation before it is forwarded to the provider
//!   ([`BlocklistRule`], [`Candidate`], [`evaluate`])
//!
//! Nothing here performs I/O. Callers fetch the rule snapshot and the
//! authenticated role themselves and hand both in as arguments; every
//! function returns a plain value.
//!
//! # Example
//!
//! ```rust,ignore
//! use zonegate_core::{Capability, Role, evaluate};
//!
//! let role = Role::Admin;
//! assert!(role.allows(Capability::DeleteDns));
//!
//! if let Some(rule) = evaluate(&candidate, &rules) {
//!     println!("blocked by rule {}", rule.id);
//! }
//! ```

mod blocklist;
mod error;
mod record;
mod role;

pub use blocklist::{
    check_pattern, evaluate, BlocklistRule, Candidate, CompiledRules, RuleField, TypeFilter,
    Verdict,
};
pub use error::{CoreError, Result};
pub use record::RecordType;
pub use role::{Capability, Permissions, Role};
