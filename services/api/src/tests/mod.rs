use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_routes;
use app_auth::{AuthService, service::AuthServiceTrait};
use app_config::{AppConfig, JwtConfig};
use app_database::{db_connect::initialize_memory_db, service::DbService};
use app_models::user::User;

/// Each test gets its own in-memory store, so tests are isolated and can
/// run in parallel.
async fn setup_app() -> (Router, Arc<AuthService>) {
    let db = initialize_memory_db()
        .await
        .expect("Database initialization failed");
    let user_db = Arc::new(DbService::<User>::new(db, "users"));

    let config = AppConfig::default();
    let jwt_config = JwtConfig::from(&config);
    let auth_service = Arc::new(AuthService::new(
        &jwt_config,
        user_db,
        config.security.password.min_length,
    ));

    let app = create_routes(Arc::clone(&auth_service), &config);
    (app, auth_service)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Signup + login over HTTP, returning (user id, bearer token)
async fn signup_and_login(app: &Router, email: &str, password: &str, name: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": email, "password": password, "name": name}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let signup_body = body_json(response).await;
    let user_id = signup_body["user"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login_body = body_json(response).await;
    let token = login_body["authToken"].as_str().unwrap().to_string();

    (user_id, token)
}

#[tokio::test]
async fn test_service_status_route() {
    let (app, _) = setup_app().await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "API is running");
}

#[tokio::test]
async fn test_signup_creates_user_without_password_in_response() {
    let (app, _) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "password": "secret1", "name": "Ann"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["name"], "Ann");
    assert!(body["user"]["id"].is_string());
    assert!(
        body["user"].get("password").is_none(),
        "Password hash must never be serialized"
    );
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let (app, _) = setup_app().await;

    // Missing field entirely (fails body deserialization)
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty field
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "password": "secret1", "name": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "not-an-email", "password": "secret1", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"].is_array(), "Validation failures list fields");

    // Password below the minimum length
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "password": "short", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "dup@b.com", "password": "secret1", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same email, different password and name
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "dup@b.com", "password": "other77", "name": "Bob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_returns_verifiable_token() {
    let (app, auth_service) = setup_app().await;

    let (user_id, token) = signup_and_login(&app, "a@b.com", "secret1", "Ann").await;

    let claims = auth_service
        .verify_token(&token)
        .expect("issued token should verify");
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "a@b.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "known@b.com", "password": "secret1", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let unknown = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "unknown@b.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    let wrong = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "known@b.com", "password": "wrong-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong).await;

    // No account enumeration through differing messages
    assert_eq!(unknown_body["message"], wrong_body["message"]);
}

#[tokio::test]
async fn test_verify_echoes_claims() {
    let (app, _) = setup_app().await;

    let (user_id, token) = signup_and_login(&app, "a@b.com", "secret1", "Ann").await;

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/auth/verify", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claims = body_json(response).await;
    assert_eq!(claims["sub"], user_id);
    assert_eq!(claims["email"], "a@b.com");
    assert_eq!(claims["name"], "Ann");

    // No token
    let request = Request::builder()
        .uri("/auth/verify")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Tampered token
    let mut tampered = token.clone();
    tampered.push('x');
    let response = app
        .oneshot(authed_request("GET", "/auth/verify", &tampered, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_reject_missing_token() {
    let (app, _) = setup_app().await;

    for (method, uri) in [
        ("GET", "/auth/verify"),
        ("GET", "/api/users"),
        ("GET", "/api/users/some-id"),
        ("PUT", "/api/users/some-id"),
        ("DELETE", "/api/users/some-id"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require a token",
            method,
            uri
        );
    }
}

#[tokio::test]
async fn test_list_users_strips_passwords() {
    let (app, _) = setup_app().await;

    let (_, token) = signup_and_login(&app, "ann@b.com", "secret1", "Ann").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "bob@b.com", "password": "secret2", "name": "Bob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed_request("GET", "/api/users", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let users = body_json(response).await;
    let users = users.as_array().expect("list response is an array");
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none(), "no password in any record");
        assert!(user["email"].is_string());
    }
}

#[tokio::test]
async fn test_get_user_by_id() {
    let (app, _) = setup_app().await;

    let (user_id, token) = signup_and_login(&app, "ann@b.com", "secret1", "Ann").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/users/{}", user_id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["name"], "Ann");
    assert!(user.get("password").is_none());

    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/users/no-such-user",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_requires_ownership() {
    let (app, _) = setup_app().await;

    let (ann_id, _) = signup_and_login(&app, "ann@b.com", "secret1", "Ann").await;
    let (_, bob_token) = signup_and_login(&app, "bob@b.com", "secret2", "Bob").await;

    // Bob's token on Ann's id: forbidden even though the target exists
    let response = app
        .oneshot(authed_request(
            "PUT",
            &format!("/api/users/{}", ann_id),
            &bob_token,
            Some(&json!({"name": "Hijacked", "email": "ann@b.com"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_self() {
    let (app, _) = setup_app().await;

    let (user_id, token) = signup_and_login(&app, "ann@b.com", "secret1", "Ann").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            &format!("/api/users/{}", user_id),
            &token,
            Some(&json!({"name": "Anna", "email": "anna@b.com"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["name"], "Anna");
    assert_eq!(user["email"], "anna@b.com");
    assert!(user.get("password").is_none());

    // Extra fields in the body are rejected, not silently applied
    let response = app
        .oneshot(authed_request(
            "PUT",
            &format!("/api/users/{}", user_id),
            &token,
            Some(&json!({"name": "Anna", "email": "anna@b.com", "password": "sneaky"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_flow() {
    let (app, _) = setup_app().await;

    let (ann_id, ann_token) = signup_and_login(&app, "ann@b.com", "secret1", "Ann").await;
    let (_, bob_token) = signup_and_login(&app, "bob@b.com", "secret2", "Bob").await;

    // Bob cannot delete Ann
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/users/{}", ann_id),
            &bob_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Ann deletes herself
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/users/{}", ann_id),
            &ann_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User deleted successfully");

    // The record is gone
    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/api/users/{}", ann_id),
            &bob_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_returns_json_413() {
    let (app, _) = setup_app().await;

    // Default body limit is 1MB
    let big_name = "a".repeat(2 * 1024 * 1024);
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "password": "secret1", "name": big_name}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_unmatched_route_returns_json_404() {
    let (app, _) = setup_app().await;

    let request = Request::builder()
        .uri("/no/such/route")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("/no/such/route"),
        "fallback names the missing route"
    );
}

#[tokio::test]
async fn test_signup_login_read_update_scenario() {
    let (app, _) = setup_app().await;

    // signup → 201
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            &json!({"email": "a@b.com", "password": "secret1", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let ann_id = body_json(response).await["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // login → 200 with token
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "a@b.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["authToken"]
        .as_str()
        .unwrap()
        .to_string();

    // read own record → 200, no password field
    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/users/{}", ann_id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(record["name"], "Ann");
    assert!(record.get("password").is_none());

    // another user's token on Ann's id → 403
    let (_, other_token) = signup_and_login(&app, "c@d.com", "secret2", "Cam").await;
    let response = app
        .oneshot(authed_request(
            "PUT",
            &format!("/api/users/{}", ann_id),
            &other_token,
            Some(&json!({"name": "Not Ann", "email": "a@b.com"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
