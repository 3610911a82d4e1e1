use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::users;

/// User data safe to return from the API (no password hash, no refresh token).
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub login: String,
    pub version: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            login: model.login,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// User row with credentials, for auth flows only.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub login: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
}

impl From<users::Model> for AuthUser {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            login: model.login,
            password_hash: model.password_hash,
            refresh_token: model.refresh_token,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_auth_by_id(&self, id: &str) -> Result<Option<AuthUser>> {
        let user = users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(AuthUser::from))
    }

    pub async fn get_auth_by_login(&self, login: &str) -> Result<Option<AuthUser>> {
        let user = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.conn)
            .await
            .context("Failed to query user by login")?;

        Ok(user.map(AuthUser::from))
    }

    /// Insert a new user with an already-hashed password.
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now().timestamp_millis();

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            login: Set(login.to_string()),
            password_hash: Set(password_hash.to_string()),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            refresh_token: Set(None),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(inserted))
    }

    /// Replace the password hash, bumping version and updated_at.
    pub async fn update_password(&self, id: &str, new_hash: &str) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
        else {
            return Ok(None);
        };

        let version = user.version + 1;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash.to_string());
        active.version = Set(version);
        active.updated_at = Set(Utc::now().timestamp_millis());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user password")?;

        Ok(Some(User::from(updated)))
    }

    /// Store (or clear) the active refresh token for a user.
    pub async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        let Some(user) = users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user for token rotation")?
        else {
            anyhow::bail!("User not found: {id}");
        };

        let mut active: users::ActiveModel = user.into();
        active.refresh_token = Set(token.map(str::to_string));
        active
            .update(&self.conn)
            .await
            .context("Failed to persist refresh token")?;

        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = users::Entity::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}
