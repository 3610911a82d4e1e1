use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{albums, artists, favorites, tracks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteKind {
    Artist,
    Album,
    Track,
}

impl FavoriteKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }

    /// Capitalized name for acknowledgment messages.
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Track => "Track",
        }
    }

    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Artist => "artists",
            Self::Album => "albums",
            Self::Track => "tracks",
        }
    }

    /// Parameter name used in validation messages ("trackId" etc.).
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Artist => "artistId",
            Self::Album => "albumId",
            Self::Track => "trackId",
        }
    }
}

/// Outcome of a favorites add. Carries the entity name for the
/// acknowledgment message.
#[derive(Debug, Clone)]
pub enum FavoriteAdd {
    Added(String),
    AlreadyPresent(String),
    TargetMissing,
}

/// The hydrated aggregate: full entities, not bare ids.
#[derive(Debug, Clone, Default)]
pub struct FavoritesView {
    pub artists: Vec<artists::Model>,
    pub albums: Vec<albums::Model>,
    pub tracks: Vec<tracks::Model>,
}

pub struct FavoritesRepository {
    conn: DatabaseConnection,
}

impl FavoritesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Resolve every stored id against its entity table. Ids whose entity
    /// no longer exists are dropped by the IN query; the cascade should
    /// make that impossible, but hydration stays defensive.
    pub async fn list(&self) -> Result<FavoritesView> {
        let rows = favorites::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list favorites")?;

        let mut artist_ids = Vec::new();
        let mut album_ids = Vec::new();
        let mut track_ids = Vec::new();
        for row in rows {
            match row.kind.as_str() {
                "artist" => artist_ids.push(row.entity_id),
                "album" => album_ids.push(row.entity_id),
                "track" => track_ids.push(row.entity_id),
                _ => {}
            }
        }

        let artists = artists::Entity::find()
            .filter(artists::Column::Id.is_in(artist_ids))
            .all(&self.conn)
            .await
            .context("Failed to hydrate favorite artists")?;

        let albums = albums::Entity::find()
            .filter(albums::Column::Id.is_in(album_ids))
            .all(&self.conn)
            .await
            .context("Failed to hydrate favorite albums")?;

        let tracks = tracks::Entity::find()
            .filter(tracks::Column::Id.is_in(track_ids))
            .all(&self.conn)
            .await
            .context("Failed to hydrate favorite tracks")?;

        Ok(FavoritesView {
            artists,
            albums,
            tracks,
        })
    }

    /// Add an entity to the aggregate. Caller must hold the aggregate lock
    /// so the exists/insert pair cannot race.
    pub async fn add(&self, kind: FavoriteKind, id: &str) -> Result<FavoriteAdd> {
        let Some(name) = self.target_name(kind, id).await? else {
            return Ok(FavoriteAdd::TargetMissing);
        };

        let existing = favorites::Entity::find()
            .filter(favorites::Column::Kind.eq(kind.as_str()))
            .filter(favorites::Column::EntityId.eq(id))
            .one(&self.conn)
            .await
            .context("Failed to check favorite membership")?;

        if existing.is_some() {
            return Ok(FavoriteAdd::AlreadyPresent(name));
        }

        let model = favorites::ActiveModel {
            kind: Set(kind.as_str().to_string()),
            entity_id: Set(id.to_string()),
            ..Default::default()
        };
        model
            .insert(&self.conn)
            .await
            .context("Failed to insert favorite")?;

        Ok(FavoriteAdd::Added(name))
    }

    /// Remove a membership. Returns false when the id was not a favorite.
    pub async fn remove(&self, kind: FavoriteKind, id: &str) -> Result<bool> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::Kind.eq(kind.as_str()))
            .filter(favorites::Column::EntityId.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to delete favorite")?;

        Ok(result.rows_affected > 0)
    }

    async fn target_name(&self, kind: FavoriteKind, id: &str) -> Result<Option<String>> {
        let name = match kind {
            FavoriteKind::Artist => artists::Entity::find_by_id(id.to_string())
                .one(&self.conn)
                .await
                .context("Failed to look up favorite target artist")?
                .map(|a| a.name),
            FavoriteKind::Album => albums::Entity::find_by_id(id.to_string())
                .one(&self.conn)
                .await
                .context("Failed to look up favorite target album")?
                .map(|a| a.name),
            FavoriteKind::Track => tracks::Entity::find_by_id(id.to_string())
                .one(&self.conn)
                .await
                .context("Failed to look up favorite target track")?
                .map(|t| t.name),
        };

        Ok(name)
    }
}
