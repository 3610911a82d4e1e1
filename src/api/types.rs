use serde::{Deserialize, Deserializer, Serialize};

use crate::db::{self, FavoritesView};
use crate::entities::{albums, artists, tracks};
use crate::services::TokenPair;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub login: String,
    pub version: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<db::User> for UserDto {
    fn from(user: db::User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            version: user.version,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDto {
    pub id: String,
    pub name: String,
    pub grammy: bool,
}

impl From<artists::Model> for ArtistDto {
    fn from(model: artists::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            grammy: model.grammy,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDto {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub artist_id: Option<String>,
}

impl From<albums::Model> for AlbumDto {
    fn from(model: albums::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            year: model.year,
            artist_id: model.artist_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    pub id: String,
    pub name: String,
    pub duration: i32,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}

impl From<tracks::Model> for TrackDto {
    fn from(model: tracks::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            duration: model.duration,
            artist_id: model.artist_id,
            album_id: model.album_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoritesDto {
    pub artists: Vec<ArtistDto>,
    pub albums: Vec<AlbumDto>,
    pub tracks: Vec<TrackDto>,
}

impl From<FavoritesView> for FavoritesDto {
    fn from(view: FavoritesView) -> Self {
        Self {
            artists: view.artists.into_iter().map(ArtistDto::from).collect(),
            albums: view.albums.into_iter().map(AlbumDto::from).collect(),
            tracks: view.tracks.into_iter().map(TrackDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairDto {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairDto {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Deserializer for fields where "absent" and "present but null" differ:
/// absent maps to None, null maps to Some(None).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
