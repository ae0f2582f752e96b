use thiserror::Error;

/// Result type alias for core policy operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when parsing policy tags.
///
/// The resolver and evaluator themselves are total functions and have
/// no error paths; the only fallible surface in this crate is turning
/// wire strings into the closed enums.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Role tag is not one of `user`, `admin`, `owner`
    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    /// Record type tag is not in the supported vocabulary
    #[error("unknown record type: {0:?}")]
    UnknownRecordType(String),

    /// Blocklist rule field is not `name`, `content`, or `both`
    #[error("unknown rule field: {0:?}")]
    UnknownRuleField(String),
}
