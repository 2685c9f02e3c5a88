//! Error types shared by the handlers, the repository and the media host.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A single rejected request field, shaped like the validation errors the
/// frontend already renders.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
        }
    }

    pub fn missing_image(field: &str) -> Self {
        Self::new(field, format!("{} image is required", field))
    }
}

/// Body of every non-validation error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a validation error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The aggregate changed (or vanished) between load and save.
    #[error("{0} was modified by another request, reload and retry")]
    VersionConflict(Uuid),
}

/// Media host failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("media host rejected upload: {0}")]
    Rejected(String),
}

/// API error type. Every handler returns `Result<_, ApiError>`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthorized,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Not Allowed")]
    NotAllowed,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotAllowed => StatusCode::FORBIDDEN,
            Self::Repository(RepositoryError::VersionConflict(_)) => StatusCode::CONFLICT,
            Self::Upload(_) => StatusCode::BAD_GATEWAY,
            Self::Repository(RepositoryError::Database(_)) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(param, errs)| {
                errs.iter().map(move |err| {
                    let msg = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                    FieldError::new(param.to_string(), msg)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.param.cmp(&b.param));
        Self::Validation(fields)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("malformed form field: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Validation(errors) => {
                (status, Json(ValidationErrorResponse { errors })).into_response()
            }
            err if status.is_server_error() && status != StatusCode::BAD_GATEWAY => {
                tracing::error!(error = %err, "request failed");
                (
                    status,
                    Json(ErrorResponse {
                        error: "Internal Server Error".to_string(),
                    }),
                )
                    .into_response()
            }
            err => {
                if status == StatusCode::BAD_GATEWAY {
                    tracing::error!(error = %err, "media host failure");
                }
                (
                    status,
                    Json(ErrorResponse {
                        error: err.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
