//! Unified error types for the recipe costing backend.
//!
//! Every fallible operation in the crate returns [`Result`]. Database errors are classified on
//! the way in so that foreign-key and uniqueness failures surface as domain errors rather than
//! opaque driver messages. The HTTP layer turns each variant into a status code through the
//! [`IntoResponse`] impl at the bottom of this file.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Start-up configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Request input failed validation before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// What went wrong
        message: String,
    },

    /// A price, cost or quantity was negative, zero where it must be positive, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    #[error("Ingredient not found: {id}")]
    IngredientNotFound { id: i64 },

    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    /// A recipe line pointed at a product or ingredient that does not exist
    #[error("Referential integrity violation: {message}")]
    ReferentialIntegrity {
        /// Driver message describing the failed constraint
        message: String,
    },

    /// Uniqueness or optimistic-version conflict
    #[error("Conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },

    /// Missing, malformed or rejected credentials
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the request was rejected
        message: String,
    },

    /// Unexpected failure outside the database (hashing, token signing)
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                Self::ReferentialIntegrity { message }
            }
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            _ => Self::Database(err),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
        }
    }
}

impl Error {
    /// HTTP status this error maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Self::IngredientNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ReferentialIntegrity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Internal { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
