use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use axum::{
    Json, Router,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use app_auth::{AuthService, service::AuthServiceTrait};
use app_config::AppConfig;
use app_error::{AppError, middleware_handling::error_handling_middleware};
use app_middleware::{auth_gate, logging_middleware, security_headers_middleware};

use crate::handlers::{auth, users};

pub fn create_routes(auth_service: Arc<AuthService>, config: &AppConfig) -> Router {
    let body_limit = config.server.body_limit;
    let cors_config = &config.security.cors;

    let jwt_service = auth_service.get_jwt_service();

    // Configure CORS with settings from config
    let cors = CorsLayer::new()
        .allow_origin(
            if cors_config.allowed_origins.contains(&"*".to_string()) {
                tower_http::cors::AllowOrigin::any()
            } else {
                tower_http::cors::AllowOrigin::list(
                    cors_config
                        .allowed_origins
                        .iter()
                        .filter_map(|origin| origin.parse().ok())
                        .collect::<Vec<_>>(),
                )
            },
        )
        .allow_methods(
            cors_config
                .allowed_methods
                .iter()
                .filter_map(|method| method.parse::<Method>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_headers(
            cors_config
                .allowed_headers
                .iter()
                .filter_map(|header| header.parse().ok())
                .collect::<Vec<_>>(),
        );

    // Every protected route sits behind the auth gate: token failures
    // return 401 before any handler runs
    let protected = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(jwt_service, auth_gate));

    let app = Router::new()
        .route("/", get(service_status))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .fallback(route_not_found)
        .with_state(auth_service);

    // The body-limit layer sits inside the error normalizer so its bare
    // 413 responses are rewritten into the standard JSON shape
    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::from_fn(error_handling_middleware));

    let app = app
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(cors),
    )
}

async fn service_status() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "message": "API is running",
            "documentation": "/api",
        })),
    )
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFoundError(format!("Route {} {} not found", method, uri.path()))
}
