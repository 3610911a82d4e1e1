use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use harmonarr::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = harmonarr::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    harmonarr::api::router(state)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

#[tokio::test]
async fn test_signup() {
    let app = spawn_app().await;

    let (status, body) = post_json(
        &app,
        "/auth/signup",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = post_json(
        &app,
        "/auth/signup",
        json!({"login": "dave", "password": "other"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this login already exists");

    let (status, _) = post_json(&app, "/auth/signup", json!({"login": "eve"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let app = spawn_app().await;

    post_json(
        &app,
        "/auth/signup",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"login": "dave", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"login": "nobody", "password": "hunter2"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_refresh_rotation() {
    let app = spawn_app().await;

    post_json(
        &app,
        "/auth/signup",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;
    let (_, first) = post_json(
        &app,
        "/auth/login",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;
    let first_refresh = first["refreshToken"].as_str().unwrap().to_string();

    // Stall so the rotated pair carries a different iat and therefore
    // a different signature.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let (status, second) = post_json(
        &app,
        "/auth/refresh",
        json!({"refreshToken": first_refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_refresh = second["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(second_refresh, first_refresh);

    // The rotated-out token is dead.
    let (status, _) = post_json(
        &app,
        "/auth/refresh",
        json!({"refreshToken": first_refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The current one still works.
    let (status, _) = post_json(
        &app,
        "/auth/refresh",
        json!({"refreshToken": second_refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_foreign_tokens() {
    let app = spawn_app().await;

    post_json(
        &app,
        "/auth/signup",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;
    let (_, pair) = post_json(
        &app,
        "/auth/login",
        json!({"login": "dave", "password": "hunter2"}),
    )
    .await;

    // An access token is signed with the other secret and must not refresh.
    let access = pair["accessToken"].as_str().unwrap();
    let (status, _) = post_json(&app, "/auth/refresh", json!({"refreshToken": access})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &app,
        "/auth/refresh",
        json!({"refreshToken": "garbage.token.here"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(&app, "/auth/refresh", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
