use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

pub mod accounts;
pub mod health;
pub mod posts;

/// Unwrap a JSON body, reporting malformed input in the API's error format
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
