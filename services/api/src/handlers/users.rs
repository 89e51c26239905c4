use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use std::sync::Arc;

use app_auth::{AuthService, Claims, service::AuthServiceTrait};
use app_error::AppResult;
use app_models::user::{UpdateUserInput, UserProfile};

use super::require_json;

pub async fn list_users(
    State(auth_service): State<Arc<AuthService>>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = auth_service.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(auth_service): State<Arc<AuthService>>,
    Path(id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let user = auth_service.get_user(&id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(auth_service): State<Arc<AuthService>>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> AppResult<Json<UserProfile>> {
    let input = require_json(payload)?;
    let user = auth_service.update_user(&claims, &id, input).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(auth_service): State<Arc<AuthService>>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Value>> {
    auth_service.delete_user(&claims, &id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
