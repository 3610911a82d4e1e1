use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::db::{FavoriteAdd, FavoriteKind};

use super::types::{FavoritesDto, MessageResponse};
use super::validation::validate_uuid;
use super::{ApiError, AppState};

/// GET /favs -- the whole aggregate, hydrated.
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FavoritesDto>, ApiError> {
    let view = state.store.list_favorites().await?;
    Ok(Json(FavoritesDto::from(view)))
}

pub async fn add_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    add_favorite(&state, FavoriteKind::Artist, &id).await
}

pub async fn remove_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_favorite(&state, FavoriteKind::Artist, &id).await
}

pub async fn add_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    add_favorite(&state, FavoriteKind::Album, &id).await
}

pub async fn remove_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_favorite(&state, FavoriteKind::Album, &id).await
}

pub async fn add_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    add_favorite(&state, FavoriteKind::Track, &id).await
}

pub async fn remove_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_favorite(&state, FavoriteKind::Track, &id).await
}

/// Adding an already-present favorite is acknowledged, not rejected.
/// A target that does not exist anywhere is 422, not 404.
async fn add_favorite(
    state: &AppState,
    kind: FavoriteKind,
    id: &str,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    validate_uuid(id, kind.param())?;

    match state.store.add_favorite(kind, id).await? {
        FavoriteAdd::TargetMissing => Err(ApiError::unprocessable(format!(
            "There is not {} with id: {id}",
            with_article(kind)
        ))),
        FavoriteAdd::AlreadyPresent(name) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(format!(
                "{} '{name}' is already in favorites",
                kind.display()
            ))),
        )),
        FavoriteAdd::Added(name) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(format!(
                "{} {name} was added to favorite {} successfully",
                kind.display(),
                kind.plural()
            ))),
        )),
    }
}

async fn remove_favorite(
    state: &AppState,
    kind: FavoriteKind,
    id: &str,
) -> Result<StatusCode, ApiError> {
    validate_uuid(id, kind.param())?;

    if state.store.remove_favorite(kind, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "{} not found in favorites",
            kind.display()
        )))
    }
}

const fn with_article(kind: FavoriteKind) -> &'static str {
    match kind {
        FavoriteKind::Artist => "an artist",
        FavoriteKind::Album => "an album",
        FavoriteKind::Track => "a track",
    }
}
