//! Unified error types for all layers of the storefront.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// MySQL error number for a duplicate key on insert.
#[cfg(feature = "sqlx")]
const MYSQL_DUPLICATE_ENTRY: u16 = 1062;

/// Unified error type for the storefront.
///
/// Cache backend failures are represented by [`StorefrontError::Cache`] but
/// never escape the cache facade; every other variant is surfaced to the
/// caller as a typed result.
#[derive(Error, Debug)]
pub enum StorefrontError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (duplicate wishlist entry, cap exceeded, inactive product)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Neither a guest session nor an account could be resolved
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    // ============ Sequence Errors ============
    /// The optimistic sequence fallback lost every race it entered.
    #[error("Order sequence for {date_key} still contended after {attempts} attempts")]
    RaceExhausted { date_key: String, attempts: u32 },

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorefrontError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::InvalidOwner(_) => 400,
            Self::Conflict(_) => 409,
            Self::RaceExhausted { .. } => 503,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Cache(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidOwner(_) => "INVALID_OWNER",
            Self::RaceExhausted { .. } => "SEQUENCE_CONTENDED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an invalid owner error.
    #[must_use]
    pub fn invalid_owner<T: Into<String>>(message: T) -> Self {
        Self::InvalidOwner(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if the failed request may succeed when retried by the client.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::RaceExhausted { .. } | Self::Database(_) | Self::Cache(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StorefrontError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                let duplicate = db_err
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .is_some_and(|e| e.number() == MYSQL_DUPLICATE_ENTRY);
                if duplicate {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether the client may retry the same request
    pub retriable: bool,
}

impl ErrorResponse {
    /// Creates a new error response from a `StorefrontError`.
    #[must_use]
    pub fn from_error(error: &StorefrontError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            retriable: error.is_retriable(),
        }
    }
}

impl From<&StorefrontError> for ErrorResponse {
    fn from(error: &StorefrontError) -> Self {
        Self::from_error(error)
    }
}
