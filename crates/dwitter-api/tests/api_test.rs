use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use dwitter_api::{build_router, config::Config, state::AppState};
use dwitter_dispatch::{Argon2Hasher, Services};
use dwitter_persist::MemoryPersistenceClient;

fn app() -> Router {
    let config = Config::default();
    let hasher = Argon2Hasher::with_params(argon2::Params::new(8, 1, 1, None).unwrap());
    let services = Services::with_hasher(
        Arc::new(MemoryPersistenceClient::new()),
        config.service_config(),
        Arc::new(hasher),
    );
    build_router(Arc::new(AppState::new(config, services)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn signup_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/accounts",
        None,
        Some(json!({
            "username": username,
            "password": "correct-horse",
            "password2": "correct-horse",
            "email": format!("{}@example.com", username),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["memory"], "connected");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/posts"].is_object());
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/accounts",
        None,
        Some(json!({ "username": "alice", "password": "short", "password2": "other" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["fields"]["password2"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/accounts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = app();
    signup_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = app();
    let alice = signup_and_login(&app, "alice").await;
    let bob = signup_and_login(&app, "bob").await;

    let (status, post) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&alice),
        Some(json!({ "text": "hello world" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["owner"], "alice");
    let post_id = post["id"].as_str().unwrap().to_string();

    let (status, reply) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&bob),
        Some(json!({ "text": "hi!", "reply_to": post_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["reply_to"], post_id.as_str());

    let uri = format!("/api/posts/{}", post_id);
    let (status, thread) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["replies"][0]["text"], "hi!");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&bob),
        Some(json!({ "text": "defaced" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "text": "hello again" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "hello again");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&alice),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["text"].is_array());

    let (status, page) = send(&app, Method::GET, "/api/posts?limit=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["posts"].as_array().unwrap().len(), 1);
    assert_eq!(page["has_more"], true);
}

#[tokio::test]
async fn test_anonymous_post_is_forbidden() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts",
        None,
        Some(json!({ "text": "anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_and_malformed_post_ids() {
    let app = app();
    let alice = signup_and_login(&app, "alice").await;

    let uri = format!("/api/posts/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/posts/not-a-uuid", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_views_and_updates() {
    let app = app();
    let alice = signup_and_login(&app, "alice").await;
    let bob = signup_and_login(&app, "bob").await;

    let (status, body) = send(&app, Method::GET, "/api/accounts/alice", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("is_admin").is_none());

    let (status, body) = send(&app, Method::GET, "/api/accounts/alice", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["is_admin"], false);

    let (status, _) = send(&app, Method::GET, "/api/accounts/alice", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/accounts/alice",
        Some(&bob),
        Some(json!({ "first_name": "Mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/accounts/alice",
        Some(&alice),
        Some(json!({ "first_name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alice");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = app();
    let token = signup_and_login(&app, "alice").await;

    let (status, _) = send(&app, Method::POST, "/api/accounts/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // The revoked token no longer authenticates
    let (status, _) = send(&app, Method::POST, "/api/accounts/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/api/accounts/logout", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/posts", Some("deadbeef"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token.");
}
