use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::ArtistPatch;

use super::types::ArtistDto;
use super::validation::validate_uuid;
use super::{ApiError, AppJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    pub name: Option<String>,
    pub grammy: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtistRequest {
    pub name: Option<String>,
    pub grammy: Option<bool>,
}

fn artist_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Artist with id: {id} not found!"))
}

/// GET /artist
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistDto>>, ApiError> {
    let artists = state.store.list_artists().await?;
    Ok(Json(artists.into_iter().map(ArtistDto::from).collect()))
}

/// GET /artist/{id}
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ArtistDto>, ApiError> {
    validate_uuid(&id, "artistId")?;

    let artist = state
        .store
        .get_artist(&id)
        .await?
        .ok_or_else(|| artist_not_found(&id))?;

    Ok(Json(ArtistDto::from(artist)))
}

/// POST /artist
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateArtistRequest>,
) -> Result<(StatusCode, Json<ArtistDto>), ApiError> {
    let (Some(name), Some(grammy)) = (payload.name.as_deref(), payload.grammy) else {
        return Err(ApiError::validation("name and grammy are required!"));
    };
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty!"));
    }

    let artist = state.store.create_artist(name, grammy).await?;

    Ok((StatusCode::CREATED, Json(ArtistDto::from(artist))))
}

/// PUT /artist/{id}
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateArtistRequest>,
) -> Result<Json<ArtistDto>, ApiError> {
    validate_uuid(&id, "artistId")?;

    let patch = ArtistPatch {
        name: payload.name,
        grammy: payload.grammy,
    };

    let artist = state
        .store
        .update_artist(&id, patch)
        .await?
        .ok_or_else(|| artist_not_found(&id))?;

    Ok(Json(ArtistDto::from(artist)))
}

/// DELETE /artist/{id} -- cascades: albums and tracks keep existing but
/// drop their artistId, and the artist leaves favorites.
pub async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid(&id, "artistId")?;

    if state.store.remove_artist(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(artist_not_found(&id))
    }
}
