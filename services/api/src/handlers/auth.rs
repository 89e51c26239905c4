use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use app_auth::{AuthService, Claims, service::AuthServiceTrait};
use app_error::AppResult;
use app_models::user::{AuthTokenResponse, LoginInput, SignupInput};

use super::require_json;

pub async fn signup(
    State(auth_service): State<Arc<AuthService>>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = require_json(payload)?;
    let user = auth_service.signup(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> AppResult<Json<AuthTokenResponse>> {
    let input = require_json(payload)?;
    let token = auth_service.login(input).await?;

    Ok(Json(token))
}

/// Echo the claims the auth gate validated, so a client can confirm an
/// active session
pub async fn verify(Extension(claims): Extension<Claims>) -> Json<Claims> {
    Json(claims)
}
