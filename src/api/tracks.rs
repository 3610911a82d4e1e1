use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{NewTrack, TrackPatch};

use super::types::{TrackDto, double_option};
use super::validation::{validate_duration, validate_uuid};
use super::{ApiError, AppJson, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackRequest {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrackRequest {
    pub name: Option<String>,
    pub duration: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub artist_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub album_id: Option<Option<String>>,
}

fn track_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Track with id: {id} not found!"))
}

/// GET /track
pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrackDto>>, ApiError> {
    let tracks = state.store.list_tracks().await?;
    Ok(Json(tracks.into_iter().map(TrackDto::from).collect()))
}

/// GET /track/{id}
pub async fn get_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackDto>, ApiError> {
    validate_uuid(&id, "trackId")?;

    let track = state
        .store
        .get_track(&id)
        .await?
        .ok_or_else(|| track_not_found(&id))?;

    Ok(Json(TrackDto::from(track)))
}

/// POST /track
pub async fn create_track(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateTrackRequest>,
) -> Result<(StatusCode, Json<TrackDto>), ApiError> {
    let (Some(name), Some(duration)) = (payload.name.as_deref(), payload.duration) else {
        return Err(ApiError::validation("name and duration are required!"));
    };
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty!"));
    }
    let duration = validate_duration(duration)?;

    if let Some(artist_id) = payload.artist_id.as_deref() {
        validate_uuid(artist_id, "artistId")?;
    }
    if let Some(album_id) = payload.album_id.as_deref() {
        validate_uuid(album_id, "albumId")?;
    }

    let track = state
        .store
        .create_track(NewTrack {
            name: name.to_string(),
            duration,
            artist_id: payload.artist_id,
            album_id: payload.album_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TrackDto::from(track))))
}

/// PUT /track/{id}
pub async fn update_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTrackRequest>,
) -> Result<Json<TrackDto>, ApiError> {
    validate_uuid(&id, "trackId")?;

    let duration = payload.duration.map(validate_duration).transpose()?;
    if let Some(Some(artist_id)) = payload.artist_id.as_ref() {
        validate_uuid(artist_id, "artistId")?;
    }
    if let Some(Some(album_id)) = payload.album_id.as_ref() {
        validate_uuid(album_id, "albumId")?;
    }

    let patch = TrackPatch {
        name: payload.name,
        duration,
        artist_id: payload.artist_id,
        album_id: payload.album_id,
    };

    let track = state
        .store
        .update_track(&id, patch)
        .await?
        .ok_or_else(|| track_not_found(&id))?;

    Ok(Json(TrackDto::from(track)))
}

/// DELETE /track/{id} -- the track also leaves favorites.
pub async fn delete_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid(&id, "trackId")?;

    if state.store.remove_track(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(track_not_found(&id))
    }
}
