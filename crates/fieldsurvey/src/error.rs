//! Error types for fieldsurvey.
//!
//! Only two kinds of failure ever reach the user: a remote write that did not
//! land in the archive, and a credential operation the identity service
//! refused. Everything else here is configuration or plumbing.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fieldsurvey operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Remote Errors ===
    /// Appending a survey to the archive failed (unreachable or rejected by
    /// access rules; the two are indistinguishable to the caller).
    #[error("remote write to '{collection}' failed: {message}")]
    RemoteWrite {
        /// Collection the write targeted.
        collection: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A credential operation failed (wrong pair, unknown identifier, or the
    /// service could not be reached).
    #[error("credential operation '{operation}' failed: {message}")]
    Credential {
        /// Name of the operation that failed.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// The configuration file does not exist.
    #[error("configuration file not found: {path}")]
    ConfigMissing {
        /// Path that was checked.
        path: PathBuf,
    },

    // === I/O Errors ===
    /// Console or file system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fieldsurvey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a remote write error for the given collection.
    #[must_use]
    pub fn remote_write(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteWrite {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Create a credential operation error.
    #[must_use]
    pub fn credential(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Credential {
            operation,
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error is a failed archive write.
    #[must_use]
    pub fn is_remote_write(&self) -> bool {
        matches!(self, Self::RemoteWrite { .. })
    }

    /// Check if this error is a failed credential operation.
    #[must_use]
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential { .. })
    }
}
