use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::entities::{albums, artists, tracks};

pub mod migrator;
pub mod repositories;

pub use repositories::album::AlbumPatch;
pub use repositories::artist::ArtistPatch;
pub use repositories::favorites::{FavoriteAdd, FavoriteKind, FavoritesView};
pub use repositories::track::{NewTrack, TrackPatch};
pub use repositories::user::{AuthUser, User};

/// The storage context. Owned explicitly and injected into the API state,
/// never reached through globals.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    /// Serializes favorites mutations (and the cascades that touch them)
    /// so two racing check-then-insert pairs cannot duplicate a membership.
    favorites_lock: Arc<Mutex<()>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(5)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!("Database connected & migrations applied");

        Ok(Self {
            conn,
            favorites_lock: Arc::new(Mutex::new(())),
        })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn artist_repo(&self) -> repositories::artist::ArtistRepository {
        repositories::artist::ArtistRepository::new(self.conn.clone())
    }

    fn album_repo(&self) -> repositories::album::AlbumRepository {
        repositories::album::AlbumRepository::new(self.conn.clone())
    }

    fn track_repo(&self) -> repositories::track::TrackRepository {
        repositories::track::TrackRepository::new(self.conn.clone())
    }

    fn favorites_repo(&self) -> repositories::favorites::FavoritesRepository {
        repositories::favorites::FavoritesRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get(id).await
    }

    pub async fn get_auth_user_by_id(&self, id: &str) -> Result<Option<AuthUser>> {
        self.user_repo().get_auth_by_id(id).await
    }

    pub async fn get_auth_user_by_login(&self, login: &str) -> Result<Option<AuthUser>> {
        self.user_repo().get_auth_by_login(login).await
    }

    pub async fn create_user(&self, login: &str, password_hash: &str) -> Result<User> {
        self.user_repo().create(login, password_hash).await
    }

    pub async fn update_user_password(&self, id: &str, new_hash: &str) -> Result<Option<User>> {
        self.user_repo().update_password(id, new_hash).await
    }

    pub async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.user_repo().set_refresh_token(id, token).await
    }

    pub async fn remove_user(&self, id: &str) -> Result<bool> {
        self.user_repo().remove(id).await
    }

    // ========== Artists ==========

    pub async fn list_artists(&self) -> Result<Vec<artists::Model>> {
        self.artist_repo().list().await
    }

    pub async fn get_artist(&self, id: &str) -> Result<Option<artists::Model>> {
        self.artist_repo().get(id).await
    }

    pub async fn create_artist(&self, name: &str, grammy: bool) -> Result<artists::Model> {
        self.artist_repo().create(name, grammy).await
    }

    pub async fn update_artist(
        &self,
        id: &str,
        patch: ArtistPatch,
    ) -> Result<Option<artists::Model>> {
        self.artist_repo().update(id, patch).await
    }

    pub async fn remove_artist(&self, id: &str) -> Result<bool> {
        let _guard = self.favorites_lock.lock().await;
        self.artist_repo().remove(id).await
    }

    // ========== Albums ==========

    pub async fn list_albums(&self) -> Result<Vec<albums::Model>> {
        self.album_repo().list().await
    }

    pub async fn get_album(&self, id: &str) -> Result<Option<albums::Model>> {
        self.album_repo().get(id).await
    }

    pub async fn create_album(
        &self,
        name: &str,
        year: i32,
        artist_id: Option<&str>,
    ) -> Result<albums::Model> {
        self.album_repo().create(name, year, artist_id).await
    }

    pub async fn update_album(&self, id: &str, patch: AlbumPatch) -> Result<Option<albums::Model>> {
        self.album_repo().update(id, patch).await
    }

    pub async fn remove_album(&self, id: &str) -> Result<bool> {
        let _guard = self.favorites_lock.lock().await;
        self.album_repo().remove(id).await
    }

    // ========== Tracks ==========

    pub async fn list_tracks(&self) -> Result<Vec<tracks::Model>> {
        self.track_repo().list().await
    }

    pub async fn get_track(&self, id: &str) -> Result<Option<tracks::Model>> {
        self.track_repo().get(id).await
    }

    pub async fn create_track(&self, track: NewTrack) -> Result<tracks::Model> {
        self.track_repo().create(track).await
    }

    pub async fn update_track(&self, id: &str, patch: TrackPatch) -> Result<Option<tracks::Model>> {
        self.track_repo().update(id, patch).await
    }

    pub async fn remove_track(&self, id: &str) -> Result<bool> {
        let _guard = self.favorites_lock.lock().await;
        self.track_repo().remove(id).await
    }

    // ========== Favorites ==========

    pub async fn list_favorites(&self) -> Result<FavoritesView> {
        self.favorites_repo().list().await
    }

    pub async fn add_favorite(&self, kind: FavoriteKind, id: &str) -> Result<FavoriteAdd> {
        let _guard = self.favorites_lock.lock().await;
        self.favorites_repo().add(kind, id).await
    }

    pub async fn remove_favorite(&self, kind: FavoriteKind, id: &str) -> Result<bool> {
        let _guard = self.favorites_lock.lock().await;
        self.favorites_repo().remove(kind, id).await
    }
}
