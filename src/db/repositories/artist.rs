use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{albums, artists, favorites, tracks};

use super::favorites::FavoriteKind;

/// Explicit per-field merge for artist updates.
#[derive(Debug, Clone, Default)]
pub struct ArtistPatch {
    pub name: Option<String>,
    pub grammy: Option<bool>,
}

pub struct ArtistRepository {
    conn: DatabaseConnection,
}

impl ArtistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<artists::Model>> {
        artists::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list artists")
    }

    pub async fn get(&self, id: &str) -> Result<Option<artists::Model>> {
        artists::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query artist by ID")
    }

    pub async fn create(&self, name: &str, grammy: bool) -> Result<artists::Model> {
        let model = artists::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            grammy: Set(grammy),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert artist")
    }

    pub async fn update(&self, id: &str, patch: ArtistPatch) -> Result<Option<artists::Model>> {
        let Some(artist) = artists::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query artist for update")?
        else {
            return Ok(None);
        };

        let mut active: artists::ActiveModel = artist.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(grammy) = patch.grammy {
            active.grammy = Set(grammy);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update artist")?;

        Ok(Some(updated))
    }

    /// Delete an artist and run the cascade in one transaction: null out
    /// every `artist_id` pointing at it and drop its favorite membership.
    /// Returns false when the artist does not exist.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let id = id.to_string();

        let deleted = self
            .conn
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    if artists::Entity::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .is_none()
                    {
                        return Ok(false);
                    }

                    albums::Entity::update_many()
                        .col_expr(albums::Column::ArtistId, Expr::value(Option::<String>::None))
                        .filter(albums::Column::ArtistId.eq(&id))
                        .exec(txn)
                        .await?;

                    tracks::Entity::update_many()
                        .col_expr(tracks::Column::ArtistId, Expr::value(Option::<String>::None))
                        .filter(tracks::Column::ArtistId.eq(&id))
                        .exec(txn)
                        .await?;

                    favorites::Entity::delete_many()
                        .filter(favorites::Column::Kind.eq(FavoriteKind::Artist.as_str()))
                        .filter(favorites::Column::EntityId.eq(&id))
                        .exec(txn)
                        .await?;

                    artists::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(true)
                })
            })
            .await
            .context("Failed to delete artist")?;

        Ok(deleted)
    }
}
