//! Error types for faqdesk.
//!
//! This module defines all error types used throughout the faqdesk crate,
//! providing detailed context for debugging and user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for faqdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The store rejected or failed to complete a write.
    #[error("store write failed during {operation}: {source}")]
    StoreWrite {
        /// The repository operation that issued the write.
        operation: &'static str,
        /// The underlying store error.
        #[source]
        source: Box<Error>,
    },

    /// The live snapshot stream reported a failure.
    #[error("subscription failed: {message}")]
    Subscription {
        /// Description of what went wrong.
        message: String,
    },

    // === Domain Errors ===
    /// A required field was empty or whitespace before a write was attempted.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    /// A stored or supplied category is not one of the known labels.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

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

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for faqdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the named field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wrap a store failure raised while performing `operation`.
    #[must_use]
    pub fn store_write(operation: &'static str, source: Error) -> Self {
        Self::StoreWrite {
            operation,
            source: Box::new(source),
        }
    }

    /// Create a subscription error.
    #[must_use]
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error was raised before any write was attempted.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is a failed store write.
    #[must_use]
    pub fn is_store_write(&self) -> bool {
        matches!(self, Self::StoreWrite { .. })
    }

    /// Check if this error came from the snapshot stream.
    #[must_use]
    pub fn is_subscription(&self) -> bool {
        matches!(self, Self::Subscription { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("question", "must not be empty");
        assert_eq!(err.to_string(), "invalid question: must not be empty");
        assert!(err.is_validation());
        assert!(!err.is_store_write());
    }

    #[test]
    fn test_store_write_wraps_source() {
        let err = Error::store_write("create", Error::internal("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("create"));
        assert!(msg.contains("disk full"));
        assert!(err.is_store_write());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_subscription_error() {
        let err = Error::subscription("connection reset");
        assert_eq!(err.to_string(), "subscription failed: connection reset");
        assert!(err.is_subscription());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = Error::UnknownCategory("GOSSIP".to_string());
        assert!(err.to_string().contains("GOSSIP"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "snapshot_buffer must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("snapshot_buffer"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
