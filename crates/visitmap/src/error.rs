//! Error types for visitmap.
//!
//! The pure aggregation and geo functions never fail; everything that touches
//! the store, the configuration or user input reports through [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for visitmap operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
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

    // === Record Errors ===
    /// No school with the given id exists.
    #[error("school not found: {id}")]
    SchoolNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A coordinate could not be parsed or is out of range.
    #[error("invalid coordinate '{input}': {message}")]
    InvalidCoordinate {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        message: String,
    },

    /// An import would overwrite existing schools without confirmation.
    #[error("refusing to replace {existing} existing school(s) without confirmation")]
    ReplaceRefused {
        /// Number of schools already stored.
        existing: i64,
    },

    /// A visit date could not be parsed.
    #[error("invalid visit date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The offending input.
        input: String,
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
}

/// A specialized Result type for visitmap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a school-not-found error.
    #[must_use]
    pub fn school_not_found(id: impl Into<String>) -> Self {
        Self::SchoolNotFound { id: id.into() }
    }

    /// Create an invalid coordinate error.
    #[must_use]
    pub fn invalid_coordinate(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the requested school does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SchoolNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::school_not_found("abc123");
        assert_eq!(err.to_string(), "school not found: abc123");

        let err = Error::ReplaceRefused { existing: 3 };
        assert_eq!(
            err.to_string(),
            "refusing to replace 3 existing school(s) without confirmation"
        );
    }

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::school_not_found("x").is_not_found());
        assert!(!Error::ReplaceRefused { existing: 1 }.is_not_found());
    }

    #[test]
    fn test_invalid_coordinate_display() {
        let err = Error::invalid_coordinate("91,200", "latitude out of range");
        let msg = err.to_string();
        assert!(msg.contains("91,200"));
        assert!(msg.contains("latitude out of range"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = Error::InvalidDate {
            input: "2025/03/01".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2025/03/01"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
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
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/visits.db",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "tracked_years must not be empty".to_string(),
        };
        assert!(err.to_string().contains("tracked_years"));
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
