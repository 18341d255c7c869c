use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::error::ErrorKind;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use utoipa::ToSchema;

/// One schema violation in a request body, reported per field.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Name of the offending field.
    #[schema(example = "email")]
    pub field: &'static str,
    /// Human-readable description of the violation.
    #[schema(example = "value is not a valid email address")]
    pub message: String,
}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Database-related errors.
    DatabaseError(mongodb::error::Error),
    /// Resource not found error.
    NotFound(String),
    /// Request body failed schema validation.
    Validation(Vec<FieldViolation>),
    /// A required backing service cannot be reached.
    ServiceUnavailable(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Validation(violations) => {
                write!(f, "Validation failed: {} field(s)", violations.len())
            }
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// The `detail` key carries either a message string or, for validation
    /// failures, the list of per-field violations.
    fn into_response(self) -> Response {
        match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": msg }))).into_response()
            }
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": violations })),
            )
                .into_response(),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": msg })),
                )
                    .into_response()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

/// Whether a driver error means the deployment itself is unreachable
/// (connection, server selection, authentication) as opposed to a bad
/// command or a decode problem.
pub fn is_connectivity_error(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::Authentication { .. }
    )
}
