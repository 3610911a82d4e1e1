use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{albums, favorites, tracks};

use super::favorites::FavoriteKind;

/// Explicit per-field merge for album updates. `artist_id` distinguishes
/// "absent" (keep) from "present and null" (clear the reference).
#[derive(Debug, Clone, Default)]
pub struct AlbumPatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub artist_id: Option<Option<String>>,
}

pub struct AlbumRepository {
    conn: DatabaseConnection,
}

impl AlbumRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<albums::Model>> {
        albums::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list albums")
    }

    pub async fn get(&self, id: &str) -> Result<Option<albums::Model>> {
        albums::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query album by ID")
    }

    pub async fn create(
        &self,
        name: &str,
        year: i32,
        artist_id: Option<&str>,
    ) -> Result<albums::Model> {
        let model = albums::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            year: Set(year),
            artist_id: Set(artist_id.map(str::to_string)),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert album")
    }

    pub async fn update(&self, id: &str, patch: AlbumPatch) -> Result<Option<albums::Model>> {
        let Some(album) = albums::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query album for update")?
        else {
            return Ok(None);
        };

        let mut active: albums::ActiveModel = album.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(year) = patch.year {
            active.year = Set(year);
        }
        if let Some(artist_id) = patch.artist_id {
            active.artist_id = Set(artist_id);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update album")?;

        Ok(Some(updated))
    }

    /// Delete an album, nulling `tracks.album_id` and removing its favorite
    /// membership in the same transaction.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let id = id.to_string();

        let deleted = self
            .conn
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    if albums::Entity::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .is_none()
                    {
                        return Ok(false);
                    }

                    tracks::Entity::update_many()
                        .col_expr(tracks::Column::AlbumId, Expr::value(Option::<String>::None))
                        .filter(tracks::Column::AlbumId.eq(&id))
                        .exec(txn)
                        .await?;

                    favorites::Entity::delete_many()
                        .filter(favorites::Column::Kind.eq(FavoriteKind::Album.as_str()))
                        .filter(favorites::Column::EntityId.eq(&id))
                        .exec(txn)
                        .await?;

                    albums::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(true)
                })
            })
            .await
            .context("Failed to delete album")?;

        Ok(deleted)
    }
}
