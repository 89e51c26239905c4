use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use app_auth::JwtService;
use app_error::{AppError, AppResult};

/// Pull the bearer token out of the Authorization header, if any
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Gate for protected routes: a missing, malformed, expired, or tampered
/// token short-circuits with 401 before any handler logic runs. Validated
/// claims are inserted into request extensions for handlers to read.
pub async fn auth_gate(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let Some(token) = extract_bearer_token(req.headers()) else {
        warn!("Rejected request without bearer token: {}", req.uri().path());
        return Err(AppError::token_invalid());
    };

    let claims = jwt_service.validate_token(token)?;

    info!("JWT validated for user {}", claims.sub);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// Security headers middleware
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

// Logging middleware with performance tracking
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    use std::time::Instant;

    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    info!(
        method = %method,
        path = %path,
        "Request started"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    if status < 400 {
        info!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else if status < 500 {
        warn!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    }

    response
}
