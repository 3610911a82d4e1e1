use axum::{
    Router,
    extract::FromRequest,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, TokenService};

mod albums;
mod artists;
pub mod auth;
mod error;
mod favorites;
mod observability;
mod tracks;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub tokens: TokenService,

    pub auth: AuthService,
}

/// JSON extractor whose rejections map into [`ApiError`], so malformed
/// bodies come back as 400 with the shared error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::new(&config.general.database_path).await?;

    let tokens = TokenService::new(&config.auth);
    let auth = AuthService::new(store.clone(), tokens.clone(), config.security.clone());

    Ok(Arc::new(AppState {
        config,
        store,
        tokens,
        auth,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(protected_routes)
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .with_state(state)
        .layer(middleware::from_fn(observability::request_logger))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", get(users::list_users).post(users::create_user))
        .route(
            "/user/{id}",
            get(users::get_user)
                .put(users::update_password)
                .delete(users::delete_user),
        )
        .route(
            "/artist",
            get(artists::list_artists).post(artists::create_artist),
        )
        .route(
            "/artist/{id}",
            get(artists::get_artist)
                .put(artists::update_artist)
                .delete(artists::delete_artist),
        )
        .route(
            "/album",
            get(albums::list_albums).post(albums::create_album),
        )
        .route(
            "/album/{id}",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        .route(
            "/track",
            get(tracks::list_tracks).post(tracks::create_track),
        )
        .route(
            "/track/{id}",
            get(tracks::get_track)
                .put(tracks::update_track)
                .delete(tracks::delete_track),
        )
        .route("/favs", get(favorites::list_favorites))
        .route(
            "/favs/artist/{id}",
            post(favorites::add_artist).delete(favorites::remove_artist),
        )
        .route(
            "/favs/album/{id}",
            post(favorites::add_album).delete(favorites::remove_album),
        )
        .route(
            "/favs/track/{id}",
            post(favorites::add_track).delete(favorites::remove_track),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_guard))
}
