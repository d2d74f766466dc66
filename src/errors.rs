//! # Error handling
//!
//! Every failure leaves the service as an [`ApiError`], which knows its HTTP
//! status and the sanitized message placed in the failure envelope. Storage
//! and blob-store details are logged with `tracing` and never sent to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use std::fmt;

use crate::messages;
use crate::response::ErrorEnvelope;

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// Resource type, e.g. "Employee"
        resource: String,
    },

    /// 400 Bad Request, malformed input that never reached validation
    BadRequest { message: String },

    /// 400 Bad Request, a cross-entity rule was broken (duplicate email,
    /// unknown department, empty update)
    Integrity { message: String },

    /// 400 Bad Request, one or more field rules failed
    ValidationFailed { errors: Vec<String> },

    /// 500 Internal Server Error (details logged, not exposed)
    Database {
        message: String,
        internal: DbErr,
    },

    /// 500 Internal Server Error for non-database failures
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Storage fault with a caller-chosen message, e.g. "Failed to fetch employees".
    pub fn storage(message: impl Into<String>, err: DbErr) -> Self {
        Self::Database {
            message: message.into(),
            internal: err,
        }
    }

    /// Storage fault raised while listing `resource_plural`.
    pub fn fetch_failed(resource_plural: &str, err: DbErr) -> Self {
        Self::storage(format!("Failed to fetch {resource_plural}"), err)
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::Integrity { .. } | Self::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::ValidationFailed { errors } => match errors.as_slice() {
                [] => "Validation Error".to_string(),
                [only] => only.clone(),
                many => format!("Validation failed: {}", many.join(", ")),
            },
            Self::BadRequest { message }
            | Self::Integrity { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { message, internal } => {
                tracing::error!(error = ?internal, "{message}");
            }
            Self::Internal {
                message,
                internal: Some(details),
            } => {
                tracing::error!(details = %details, "{message}");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let status = self.status_code();
        (status, Json(ErrorEnvelope::new(self.user_message()))).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` becomes 404, everything else 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg
                    .strip_suffix(" not found")
                    .unwrap_or("Resource")
                    .to_string();
                Self::NotFound { resource }
            }
            _ => Self::Database {
                message: messages::DATABASE_ERROR.to_string(),
                internal: err,
            },
        }
    }
}
