//! Typed error handling for the moving-orders service
//!
//! Each layer owns one error type and errors are translated, never passed
//! through raw, when they cross a layer boundary:
//!
//! - [`StorageError`]: produced by storage backends
//! - [`ServiceError`]: produced by the domain services; storage errors are
//!   folded into it at the service boundary
//! - [`ApiError`]: surfaced at the transport boundary; knows its gRPC code,
//!   machine-readable reason, and HTTP status for the gateway
//! - [`ConfigError`]: configuration loading and validation
//!
//! Wrapping keeps a readable chain: `failed to get order | query timed out`.

use crate::core::auth::AuthError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

/// Domain tag attached to every error surfaced to clients
pub const ERROR_DOMAIN: &str = "moving.orders";

/// Boxed error used as the source of wrapped backend failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors returned by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// No row matched, or a list query produced zero rows
    #[error("not found")]
    NotFound,

    /// The caller passed id 0; rejected before reaching the store
    #[error("invalid id")]
    InvalidId,

    /// An update carried no fields
    #[error("no fields to update")]
    EmptyPatch,

    /// Any other backend failure (connectivity, constraint, scan)
    #[error("failed to {operation} | {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    pub fn backend(operation: &'static str, source: impl Into<BoxError>) -> Self {
        StorageError::Backend {
            operation,
            source: source.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Service Errors
// =============================================================================

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested entity (or list) does not exist
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The request was structurally valid but cannot be applied
    #[error("failed to {operation} | {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    /// Unclassified downstream failure, wrapped with operation context
    #[error("failed to {operation} | {source}")]
    Unknown {
        operation: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    /// Translate a storage error for `operation` on `entity`
    pub fn from_storage(entity: &'static str, operation: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ServiceError::NotFound { entity },
            StorageError::InvalidId | StorageError::EmptyPatch => ServiceError::Rejected {
                operation,
                reason: err.to_string(),
            },
            other => ServiceError::Unknown {
                operation,
                source: other,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Errors
// =============================================================================

/// Errors surfaced at the transport boundary
///
/// Every variant maps to a gRPC code, a short machine-readable reason and an
/// HTTP status for the JSON gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Structural validation failed before the service was called
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Missing, malformed, unknown or insufficient credential
    #[error("{0}")]
    Unauthenticated(AuthError),

    /// Entity absent, or an empty list result
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Request could not be applied in the current state
    #[error("{message}")]
    Precondition { message: String },

    /// Unclassified failure
    #[error("{message}")]
    Unknown { message: String },

    /// A handler fault was recovered; details stay in the logs
    #[error("panic handled")]
    PanicHandled,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// gRPC status code for this error
    pub fn code(&self) -> Code {
        match self {
            ApiError::Validation { .. } => Code::InvalidArgument,
            ApiError::Unauthenticated(_) => Code::Unauthenticated,
            ApiError::NotFound { .. } => Code::NotFound,
            ApiError::Precondition { .. } => Code::FailedPrecondition,
            ApiError::Unknown { .. } => Code::Unknown,
            ApiError::PanicHandled => Code::Unknown,
        }
    }

    /// Machine-readable reason for programmatic handling
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_FAILED",
            ApiError::Unauthenticated(e) => e.reason(),
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Precondition { .. } => "REQUEST_REJECTED",
            ApiError::Unknown { .. } => "UNKNOWN",
            ApiError::PanicHandled => "PANIC_HANDLED",
        }
    }

    /// Build the wire status, carrying reason and domain as `ErrorInfo`
    pub fn into_status(self) -> Status {
        let code = self.code();
        let reason = self.reason();
        Status::with_error_details(
            code,
            format!("error: {}", self),
            ErrorDetails::with_error_info(reason, ERROR_DOMAIN, HashMap::new()),
        )
    }
}

impl From<ApiError> for Status {
    fn from(err: ApiError) -> Self {
        err.into_status()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { entity } => ApiError::NotFound { entity },
            rejected @ ServiceError::Rejected { .. } => ApiError::Precondition {
                message: rejected.to_string(),
            },
            unknown @ ServiceError::Unknown { .. } => ApiError::Unknown {
                message: unknown.to_string(),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::validation(errors.to_string())
    }
}

/// Error body returned by the JSON gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// gRPC code name, e.g. `NotFound`
    pub code: String,
    /// Machine-readable reason
    pub reason: String,
    /// Error domain tag
    pub domain: String,
    /// Human-readable message
    pub message: String,
}

/// HTTP status used by the gateway for a gRPC code
pub fn http_status_for(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ErrorResponse {
    /// Rebuild the structured error from a wire status
    pub fn from_status(status: &Status) -> Self {
        let (reason, domain) = match status.get_details_error_info() {
            Some(info) => (info.reason, info.domain),
            None => ("UNKNOWN".to_string(), ERROR_DOMAIN.to_string()),
        };
        ErrorResponse {
            code: format!("{:?}", status.code()),
            reason,
            domain,
            message: status.message().to_string(),
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment or layered source could not be read/deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// YAML document could not be parsed
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// IO error while reading a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A loaded value breaks a configuration rule
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

// =============================================================================
// Tests
// =============================================================================
