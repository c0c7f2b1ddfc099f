//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, identifiers,
/// configuration). Storage concerns belong to the infra crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller-supplied attributes were rejected.
    ///
    /// The message is surfaced verbatim, e.g.
    /// `[Addresses] No country code given.`
    #[error("{0}")]
    FailedValidation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Static configuration is unusable (bad table or column name, ...).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DomainError {
    pub fn failed_validation(msg: impl Into<String>) -> Self {
        Self::FailedValidation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is the validation failure kind.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::FailedValidation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_validation_displays_message_verbatim() {
        let err = DomainError::failed_validation("[Addresses] No country code given.");
        assert_eq!(err.to_string(), "[Addresses] No country code given.");
        assert!(err.is_validation());
    }

    #[test]
    fn config_errors_are_not_validation_errors() {
        assert!(!DomainError::config("bad table").is_validation());
    }
}
