//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors describe transport-level failures: a request body that is
//! not valid JSON, a request that misses a field, a caller turned away by the
//! admission gate, or a file that cannot be read. Domain failures such as
//! division by zero are not errors here; they travel as data inside
//! [`RatioResult`](crate::domain::services::RatioResult).
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Decode(String)                    - Body is not decodable
//! ├── Validation(String)                - Required input missing
//! ├── AdmissionRejected { message, status } - Caller over its quota
//! ├── Io(std::io::Error)                - File system failure
//! ├── Configuration(String)             - Invalid runtime settings
//! └── Internal(String)                  - Worker task failed
//! ```
//!
//! # Examples
//!
//! ```
//! use decimal_ratio::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("missing field X1");
//! assert!(err.is_validation());
//!
//! let err = ApplicationError::admission_rejected("Слишком много запросов.", 429);
//! assert!(err.is_rejection());
//! ```

use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The request body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The admission gate refused the caller.
    #[error("admission rejected: {message}")]
    AdmissionRejected {
        /// Message returned to the caller.
        message: String,
        /// HTTP status returned to the caller.
        status: u16,
    },

    /// I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an admission rejection.
    #[must_use]
    pub fn admission_rejected(message: impl Into<String>, status: u16) -> Self {
        Self::AdmissionRejected {
            message: message.into(),
            status,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a decode error.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the admission gate refused the caller.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::AdmissionRejected { .. })
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_decode() {
        let err = ApplicationError::decode("expected value at line 1 column 1");
        assert!(err.to_string().contains("decode"));
        assert!(err.is_decode());
        assert!(!err.is_validation());
    }

    #[test]
    fn application_error_validation() {
        let err = ApplicationError::validation("missing field Y2");
        assert!(err.to_string().contains("Y2"));
        assert!(err.is_validation());
        assert!(!err.is_rejection());
    }

    #[test]
    fn application_error_admission_rejected() {
        let err = ApplicationError::admission_rejected("too many", 429);
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "admission rejected: too many");
        match err {
            ApplicationError::AdmissionRejected { status, .. } => assert_eq!(status, 429),
            other => unreachable!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn application_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: ApplicationError = io.into();
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn application_error_configuration() {
        let err = ApplicationError::configuration("limit must be positive");
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn application_error_internal() {
        let err = ApplicationError::internal("task cancelled");
        assert_eq!(err.to_string(), "internal error: task cancelled");
        assert!(!err.is_decode());
    }
}
