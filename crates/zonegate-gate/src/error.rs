use thiserror::Error;
use zonegate_core::{BlocklistRule, Capability, Role};

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors that can occur in gated operations.
///
/// Authorization and blocklist denials are values here, never panics:
/// the embedding layer turns [`GateError::Forbidden`] into a 403 and
/// [`GateError::Blocked`] into a rejection that shows the offending
/// rule to the requester.
#[derive(Error, Debug)]
pub enum GateError {
    /// Actor's role lacks the capability for this operation
    #[error("forbidden: role lacks {capability:?}")]
    Forbidden {
        /// The missing capability
        capability: Capability,
    },

    /// Mutation matched a blocklist rule
    #[error("record blocked by blocklist rule: {}", .rule.pattern)]
    Blocked {
        /// The first rule that matched, in snapshot order
        rule: BlocklistRule,
    },

    /// Actor may not manage a target with this role
    #[error("cannot manage a user with role {target}")]
    CannotManage {
        /// The target's role
        target: Role,
    },

    /// Actors may not manage their own account through this path
    #[error("cannot manage your own account")]
    SelfManagement,

    /// Payload failed validation
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Provider call failed
    #[error("provider error: {0}")]
    Provider(#[from] zonegate_cloudflare::CloudflareError),

    /// Storage backend failed
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is invalid or missing required fields
    #[error("config error: {0}")]
    Config(String),
}

impl GateError {
    /// The blocklist rule that caused a [`GateError::Blocked`], if any
    #[must_use]
    pub const fn blocked_by(&self) -> Option<&BlocklistRule> {
        match self {
            Self::Blocked { rule } => Some(rule),
            _ => None,
        }
    }

    /// True for authorization denials (missing capability or hierarchy)
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::Forbidden { .. } | Self::CannotManage { .. } | Self::SelfManagement
        )
    }
}
