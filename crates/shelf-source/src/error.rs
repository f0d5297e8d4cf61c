//! Error types for sources of record.

use std::path::PathBuf;

/// Errors that can occur when reading from a source of record.
///
/// A missing entity is not an error: lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source of record is not available.
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    /// A query against the source failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A timeout occurred while waiting for the source.
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse catalog data.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl SourceError {
    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::unavailable("connection refused");
        assert_eq!(err.to_string(), "source unavailable: connection refused");

        let err = SourceError::query("relation \"product\" does not exist");
        assert_eq!(
            err.to_string(),
            "query failed: relation \"product\" does not exist"
        );

        let err = SourceError::parse("/data/catalog.json", "expected array");
        assert_eq!(
            err.to_string(),
            "parse error in /data/catalog.json: expected array"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(SourceError::unavailable("db down").is_transient());
        assert!(SourceError::Timeout { seconds: 30 }.is_transient());
        assert!(!SourceError::query("syntax error").is_transient());
        assert!(!SourceError::parse("a.json", "bad").is_transient());
    }
}
