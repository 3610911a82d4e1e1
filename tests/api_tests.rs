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
    // Cheap hashing params keep the tests fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = harmonarr::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    harmonarr::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn access_token(app: &Router) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({"login": "tester", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"login": "tester", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_routes_require_access_token() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/artist", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/artist")
                .header("Authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/artist", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let id = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/artist/{id}"), Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(
        body["message"],
        format!("Artist with id: {id} not found!")
    );
    assert_eq!(body["path"], format!("/artist/{id}"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_user_crud() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (status, user) = send(
        &app,
        "POST",
        "/user",
        Some(&token),
        Some(json!({"login": "alice", "password": "wonderland"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["login"], "alice");
    assert_eq!(user["version"], 1);
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    let id = user["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, "GET", "/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        list.as_array()
            .unwrap()
            .iter()
            .any(|u| u["login"] == "alice")
    );

    let (status, fetched) = send(&app, "GET", &format!("/user/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());

    let (status, _) = send(&app, "GET", "/user/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/user",
        Some(&token),
        Some(json!({"login": "bob", "password": "xy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/user",
        Some(&token),
        Some(json!({"login": "alice", "password": "different"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this login already exists");

    let (status, _) = send(&app, "DELETE", &format!("/user/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/user/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_update_bumps_version() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (_, user) = send(
        &app,
        "POST",
        "/user",
        Some(&token),
        Some(json!({"login": "carol", "password": "first-pass"})),
    )
    .await;
    let id = user["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/user/{id}"),
        Some(&token),
        Some(json!({"oldPassword": "wrong", "newPassword": "second-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Old password is wrong!");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/user/{id}"),
        Some(&token),
        Some(json!({"oldPassword": "first-pass", "newPassword": "second-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"], 2);
    assert!(updated["updatedAt"].as_i64().unwrap() >= updated["createdAt"].as_i64().unwrap());

    // The new password works for login, the old one does not.
    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"login": "carol", "password": "second-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"login": "carol", "password": "first-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_artist_crud() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (status, artist) = send(
        &app,
        "POST",
        "/artist",
        Some(&token),
        Some(json!({"name": "Freddie Mercury", "grammy": false})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(artist["name"], "Freddie Mercury");
    assert_eq!(artist["grammy"], false);
    let id = artist["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/artist/{id}"),
        Some(&token),
        Some(json!({"grammy": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Freddie Mercury");
    assert_eq!(updated["grammy"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/artist",
        Some(&token),
        Some(json!({"name": "Nameless"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Mistyped grammy never reaches the store.
    let (status, _) = send(
        &app,
        "POST",
        "/artist",
        Some(&token),
        Some(json!({"name": "Typo", "grammy": "yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/artist/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/artist/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artist_delete_cascades() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (_, artist) = send(
        &app,
        "POST",
        "/artist",
        Some(&token),
        Some(json!({"name": "Muse", "grammy": true})),
    )
    .await;
    let artist_id = artist["id"].as_str().unwrap().to_string();

    let (status, album) = send(
        &app,
        "POST",
        "/album",
        Some(&token),
        Some(json!({"name": "Drones", "year": 2015, "artistId": artist_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(album["artistId"], artist_id.as_str());
    let album_id = album["id"].as_str().unwrap().to_string();

    let (status, track) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({
            "name": "The Handler",
            "duration": 273,
            "artistId": artist_id,
            "albumId": album_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let track_id = track["id"].as_str().unwrap().to_string();

    let (_, _) = send(
        &app,
        "POST",
        &format!("/favs/artist/{artist_id}"),
        Some(&token),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/artist/{artist_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Album and track survive with their artist reference cleared.
    let (status, album) = send(
        &app,
        "GET",
        &format!("/album/{album_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(album["artistId"], Value::Null);

    let (status, track) = send(
        &app,
        "GET",
        &format!("/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track["artistId"], Value::Null);
    assert_eq!(track["albumId"], album_id.as_str());

    // And the artist is gone from favorites.
    let (_, favs) = send(&app, "GET", "/favs", Some(&token), None).await;
    assert!(favs["artists"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_album_delete_clears_track_reference() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (_, album) = send(
        &app,
        "POST",
        "/album",
        Some(&token),
        Some(json!({"name": "Standalone", "year": 1999})),
    )
    .await;
    let album_id = album["id"].as_str().unwrap().to_string();
    assert_eq!(album["artistId"], Value::Null);

    let (_, track) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({"name": "Opener", "duration": 185, "albumId": album_id})),
    )
    .await;
    let track_id = track["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/album/{album_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, track) = send(
        &app,
        "GET",
        &format!("/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(track["albumId"], Value::Null);
}

#[tokio::test]
async fn test_track_validation() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({"name": "Zero Length", "duration": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({"name": "No Duration"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({"name": "Bad Ref", "duration": 60, "artistId": "not-a-uuid"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorites_lifecycle() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let (_, track) = send(
        &app,
        "POST",
        "/track",
        Some(&token),
        Some(json!({"name": "Bohemian Rhapsody", "duration": 355})),
    )
    .await;
    let track_id = track["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/favs/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "Track Bohemian Rhapsody was added to favorite tracks successfully"
    );

    // Adding again is acknowledged, not an error, and stays single-entry.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/favs/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "Track 'Bohemian Rhapsody' is already in favorites"
    );

    let (status, favs) = send(&app, "GET", "/favs", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let tracks = favs["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0]["id"], track_id.as_str());
    assert!(favs["artists"].as_array().unwrap().is_empty());
    assert!(favs["albums"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/favs/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/favs/track/{track_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Track not found in favorites");
}

#[tokio::test]
async fn test_favorites_missing_target_is_unprocessable() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let id = uuid::Uuid::new_v4();
    let (status, body) = send(
        &app,
        "POST",
        &format!("/favs/album/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        format!("There is not an album with id: {id}")
    );

    let (status, _) = send(&app, "POST", "/favs/album/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;
    let token = access_token(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/artist")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
