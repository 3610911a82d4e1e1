use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::AlbumPatch;

use super::types::{AlbumDto, double_option};
use super::validation::validate_uuid;
use super::{ApiError, AppJson, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub artist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub artist_id: Option<Option<String>>,
}

fn album_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Album with id: {id} not found!"))
}

/// GET /album
pub async fn list_albums(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlbumDto>>, ApiError> {
    let albums = state.store.list_albums().await?;
    Ok(Json(albums.into_iter().map(AlbumDto::from).collect()))
}

/// GET /album/{id}
pub async fn get_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AlbumDto>, ApiError> {
    validate_uuid(&id, "albumId")?;

    let album = state
        .store
        .get_album(&id)
        .await?
        .ok_or_else(|| album_not_found(&id))?;

    Ok(Json(AlbumDto::from(album)))
}

/// POST /album
pub async fn create_album(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<AlbumDto>), ApiError> {
    let (Some(name), Some(year)) = (payload.name.as_deref(), payload.year) else {
        return Err(ApiError::validation("name and year are required!"));
    };
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty!"));
    }
    if let Some(artist_id) = payload.artist_id.as_deref() {
        validate_uuid(artist_id, "artistId")?;
    }

    let album = state
        .store
        .create_album(name, year, payload.artist_id.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(AlbumDto::from(album))))
}

/// PUT /album/{id}
pub async fn update_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateAlbumRequest>,
) -> Result<Json<AlbumDto>, ApiError> {
    validate_uuid(&id, "albumId")?;

    if let Some(Some(artist_id)) = payload.artist_id.as_ref() {
        validate_uuid(artist_id, "artistId")?;
    }

    let patch = AlbumPatch {
        name: payload.name,
        year: payload.year,
        artist_id: payload.artist_id,
    };

    let album = state
        .store
        .update_album(&id, patch)
        .await?
        .ok_or_else(|| album_not_found(&id))?;

    Ok(Json(AlbumDto::from(album)))
}

/// DELETE /album/{id} -- tracks drop their albumId, favorites forget it.
pub async fn delete_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid(&id, "albumId")?;

    if state.store.remove_album(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(album_not_found(&id))
    }
}
