//! Error types for the progression engine

/// Errors reported by the progression engine.
///
/// Every error is synchronous and local. A call that returns an error has
/// left the ledger, level and achievement state exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// Caller passed a value the engine refuses to coerce
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog entry failed validation at registration
    #[error("Invalid achievement definition '{id}': {reason}")]
    InvalidDefinition { id: String, reason: String },
}

impl ProgressionError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_definition(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_achievement(id: &str) -> Self {
        Self::InvalidArgument(format!("Unknown achievement id: {}", id))
    }
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
