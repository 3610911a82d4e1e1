use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{favorites, tracks};

use super::favorites::FavoriteKind;

#[derive(Debug, Clone, Default)]
pub struct TrackPatch {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub artist_id: Option<Option<String>>,
    pub album_id: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub name: String,
    pub duration: i32,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}

pub struct TrackRepository {
    conn: DatabaseConnection,
}

impl TrackRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<tracks::Model>> {
        tracks::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list tracks")
    }

    pub async fn get(&self, id: &str) -> Result<Option<tracks::Model>> {
        tracks::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query track by ID")
    }

    pub async fn create(&self, track: NewTrack) -> Result<tracks::Model> {
        let model = tracks::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(track.name),
            duration: Set(track.duration),
            artist_id: Set(track.artist_id),
            album_id: Set(track.album_id),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert track")
    }

    pub async fn update(&self, id: &str, patch: TrackPatch) -> Result<Option<tracks::Model>> {
        let Some(track) = tracks::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query track for update")?
        else {
            return Ok(None);
        };

        let mut active: tracks::ActiveModel = track.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(duration) = patch.duration {
            active.duration = Set(duration);
        }
        if let Some(artist_id) = patch.artist_id {
            active.artist_id = Set(artist_id);
        }
        if let Some(album_id) = patch.album_id {
            active.album_id = Set(album_id);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update track")?;

        Ok(Some(updated))
    }

    /// Delete a track and its favorite membership in one transaction.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let id = id.to_string();

        let deleted = self
            .conn
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    if tracks::Entity::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .is_none()
                    {
                        return Ok(false);
                    }

                    favorites::Entity::delete_many()
                        .filter(favorites::Column::Kind.eq(FavoriteKind::Track.as_str()))
                        .filter(favorites::Column::EntityId.eq(&id))
                        .exec(txn)
                        .await?;

                    tracks::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(true)
                })
            })
            .await
            .context("Failed to delete track")?;

        Ok(deleted)
    }
}
