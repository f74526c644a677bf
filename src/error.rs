use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::speech::{ErrorKind, GenerationError, ValidationError};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Generation(GenerationError::Validation(err))
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub kind: String,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Generation(e) => match e.kind() {
                ErrorKind::Validation | ErrorKind::Parse => StatusCode::BAD_REQUEST,
                ErrorKind::Quota => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::Network
                | ErrorKind::Auth
                | ErrorKind::Server
                | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
                ErrorKind::Builder | ErrorKind::Decode | ErrorKind::Playback => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generation(e) => e.kind().as_str(),
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Generation failures carry the user-facing German message; the technical
    /// detail only goes to the log
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            Self::Generation(e) => e.user_message(),
            other => other.to_string(),
        };
        ErrorResponse {
            message,
            kind: self.kind().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                kind = self.kind(),
                status = %status.as_u16(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                kind = self.kind(),
                status = %status.as_u16(),
                "Request rejected"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
