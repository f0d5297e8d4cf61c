//! Error types for Shelf domain values.
//!
//! Parsing identifiers and entity kinds from the outside world (HTTP paths,
//! configuration, seed files) is the only fallible thing the core does.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entity kind is not one of the cached kinds.
    #[error("unknown entity kind '{0}', expected 'product' or 'variant'")]
    UnknownEntityKind(String),

    /// The identifier is not a valid entity id.
    #[error("invalid entity id '{value}': {reason}")]
    InvalidEntityId { value: String, reason: String },
}

impl CoreError {
    /// Creates an invalid id error.
    pub fn invalid_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntityId {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::UnknownEntityKind("order".to_string());
        assert_eq!(
            err.to_string(),
            "unknown entity kind 'order', expected 'product' or 'variant'"
        );

        let err = CoreError::invalid_id("abc", "not a number");
        assert_eq!(err.to_string(), "invalid entity id 'abc': not a number");
    }
}
