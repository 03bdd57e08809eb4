//! Engine errors.
//!
//! Every operation returns [`ActError`]. The first five variants are the
//! domain outcomes callers are expected to branch on; the rest are loading
//! and decoding failures that surface as configuration errors.

use thiserror::Error;

/// Errors produced by the ACT engine and its collaborators.
#[derive(Debug, Error)]
pub enum ActError {
    /// A label or dictionary is absent. Not retryable.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller supplied malformed input (wrong arity, `n < 1`, missing role).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No equation table exists for the requested dictionary/purpose.
    #[error("Missing equation table: {0}")]
    MissingTable(String),

    /// The solver's derived 3x3 system has no unique solution.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// The dictionary service could not be reached within the retry budget.
    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    /// Equation or dictionary data failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActError {
    /// Stable machine-readable code used in response envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            ActError::NotFound(_) => "NOT_FOUND",
            ActError::InvalidInput(_) => "INVALID_INPUT",
            ActError::MissingTable(_) => "MISSING_TABLE",
            ActError::SingularSystem(_) => "SINGULAR_SYSTEM",
            ActError::ExternalServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ActError::Config(_) | ActError::Yaml(_) | ActError::Io(_) => "CONFIG_ERROR",
            ActError::Json(_) => "INVALID_INPUT",
        }
    }

    /// Whether a bounded retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ActError::ExternalServiceUnavailable(_))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ActError::InvalidInput(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ActError::Config(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type ActResult<T> = Result<T, ActError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ActError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ActError::invalid("n < 1").error_code(), "INVALID_INPUT");
        assert_eq!(
            ActError::MissingTable("us_2015/emotion".into()).error_code(),
            "MISSING_TABLE"
        );
        assert_eq!(ActError::config("bad row").error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_only_service_outages_are_retryable() {
        assert!(ActError::ExternalServiceUnavailable("timeout".into()).is_retryable());
        assert!(!ActError::NotFound("doctor".into()).is_retryable());
        assert!(!ActError::SingularSystem("pivot".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ActError::NotFound("behavior 'frobnicate' in us_2015".into());
        assert!(err.to_string().contains("frobnicate"));
    }
}
