use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use dwitter_dispatch::{DispatchError, FieldErrors};
use dwitter_persist::PersistError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Not found.")]
    NotFound,

    #[error("No active session.")]
    NoActiveSession,

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::ValidationFailed(fields) => ApiError::Validation(fields),
            DispatchError::Forbidden => ApiError::Forbidden,
            DispatchError::NotFound => ApiError::NotFound,
            DispatchError::InvalidCredentials => {
                ApiError::Unauthorized("Unable to log in with provided credentials.".to_string())
            }
            DispatchError::NoActiveSession => ApiError::NoActiveSession,
            DispatchError::Store(e) => ApiError::Persist(e),
            DispatchError::Hashing(msg) => ApiError::Hashing(msg),
            DispatchError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(fields) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "fields": fields,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound | ApiError::NoActiveSession => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Persist(e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Hashing(msg) => {
                tracing::error!("Password hashing error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
