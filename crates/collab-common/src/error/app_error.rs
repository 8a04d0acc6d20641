//! Application error types
//!
//! Errors raised while wiring the server together (configuration, pools,
//! token handling) plus a transparent wrapper over domain errors.

use std::fmt;

use collab_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Status for a domain error, by kind
fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authentication() {
        401
    } else if e.is_authorization() {
        403
    } else if e.is_validation() || e.is_invalid_thread() {
        400
    } else if e.is_conflict() {
        409
    } else {
        500
    }
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired => 401,
            Self::InsufficientPermissions => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Cache(_) | Self::Config(_) | Self::Internal(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::Snowflake;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::InsufficientPermissions.status_code(), 403);
        assert_eq!(AppError::not_found("message 4").status_code(), 404);
        assert_eq!(
            AppError::from(crate::config::ConfigError::MissingVar("JWT_SECRET")).status_code(),
            500
        );
        assert_eq!(AppError::validation("emoji is required").status_code(), 400);
        assert_eq!(AppError::Cache("down".to_string()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::not_found("channel").error_code(), "NOT_FOUND");
        assert_eq!(AppError::Config("x".into()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_domain_errors_keep_their_codes() {
        let err = AppError::from(DomainError::InvalidThread("nested".to_string()));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_THREAD");

        assert_eq!(AppError::from(DomainError::NotMessageSender).status_code(), 403);
        assert_eq!(
            AppError::from(DomainError::PollAlreadyExists(Snowflake::new(1))).status_code(),
            409
        );
        assert_eq!(
            AppError::from(DomainError::Unauthenticated("bad token".to_string())).status_code(),
            401
        );
        assert_eq!(
            AppError::from(DomainError::DatabaseError("down".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::not_found("channel 123").to_string(),
            "Resource not found: channel 123"
        );
        assert_eq!(
            AppError::validation("emoji is required").to_string(),
            "Validation error: emoji is required"
        );
    }
}
