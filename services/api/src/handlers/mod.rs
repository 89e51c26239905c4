pub mod auth;
pub mod users;

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};

use app_error::{AppError, AppResult};

/// Map a missing or malformed JSON body to our 400 shape instead of
/// axum's default rejection. A body over the configured size limit keeps
/// its 413 status rather than degrading to a validation failure.
pub(crate) fn require_json<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLargeError(rejection.body_text()))
        }
        Err(rejection) => Err(AppError::ValidationError(vec![rejection.body_text()])),
    }
}
