//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout dbeaver-provision.
//! All errors are structured and map to specific error codes for JSON output.
//!
//! # Error Categories
//! - `InvalidInput`: Descriptor text is not well-formed JSON, not an array, or has bad field types
//! - `ConfigError`: Missing or empty settings (connections text, output directory)
//! - `EncryptionError`: Cipher primitive could not be initialized
//! - `SerializationError`: A document could not be rendered to JSON
//! - `IoError`: An output file could not be written
//!
//! Non-fatal anomalies (unrecognized driver, duplicate ids) are not errors; see
//! [`crate::mapper::Diagnostic`].

use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Malformed descriptor input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (missing connections text or output directory)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cipher setup or encryption failure
    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    /// Document serialization failure
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    /// Output file could not be written
    #[error("I/O error ({path}): {detail}")]
    IoError { path: String, detail: String },
}

impl ProvisionError {
    /// Convert error to error code string for JSON output
    ///
    /// Error codes are stable and suitable for programmatic handling.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::EncryptionError(_) => "ENCRYPTION_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::IoError { .. } => "IO_ERROR",
        }
    }

    /// Get human-readable error message
    ///
    /// Messages never contain passwords or other credential material.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an encryption error
    pub fn encryption_error(message: impl Into<String>) -> Self {
        Self::EncryptionError(message.into())
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError(message.into())
    }

    /// Create an I/O error tied to a path
    pub fn io_error(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProvisionError::invalid_input("test").error_code(), "INVALID_INPUT");
        assert_eq!(ProvisionError::config_error("test").error_code(), "CONFIG_ERROR");
        assert_eq!(ProvisionError::encryption_error("test").error_code(), "ENCRYPTION_ERROR");
        assert_eq!(
            ProvisionError::serialization_error("test").error_code(),
            "SERIALIZATION_ERROR"
        );
        assert_eq!(ProvisionError::io_error("/tmp/x", "test").error_code(), "IO_ERROR");
    }

    #[test]
    fn test_error_messages() {
        let err = ProvisionError::invalid_input("expected a JSON array");
        assert!(err.message().contains("expected a JSON array"));

        let err = ProvisionError::io_error("/out/data-sources.json", "permission denied");
        assert!(err.message().contains("/out/data-sources.json"));
        assert!(err.message().contains("permission denied"));
    }

    #[test]
    fn test_error_constructors() {
        let err = ProvisionError::invalid_input("test");
        assert!(matches!(err, ProvisionError::InvalidInput(_)));

        let err = ProvisionError::config_error("test");
        assert!(matches!(err, ProvisionError::ConfigError(_)));

        let err = ProvisionError::encryption_error("test");
        assert!(matches!(err, ProvisionError::EncryptionError(_)));

        let err = ProvisionError::serialization_error("test");
        assert!(matches!(err, ProvisionError::SerializationError(_)));

        let err = ProvisionError::io_error("p", "d");
        assert!(matches!(err, ProvisionError::IoError { .. }));
    }
}
