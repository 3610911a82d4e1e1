use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::Store;

use super::tokens::{TokenPair, TokenService};

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("User with this login already exists")]
    DuplicateLogin,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Composes password hashing with the token service to drive the
/// signup -> login -> refresh lifecycle.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    tokens: TokenService,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    pub async fn signup(&self, login: &str, password: &str) -> Result<(), AuthError> {
        if self.store.get_auth_user_by_login(login).await?.is_some() {
            return Err(AuthError::DuplicateLogin);
        }

        let hash = self.hash_password(password).await?;
        self.store.create_user(login, &hash).await?;

        Ok(())
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.store.get_auth_user_by_login(login).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self
            .tokens
            .issue_pair(&user.id, &user.login)
            .map_err(|_| AuthError::InvalidCredentials)?;

        // Rotation: persisting the new refresh token invalidates the old one.
        self.store
            .set_refresh_token(&user.id, Some(&pair.refresh_token))
            .await?;

        Ok(pair)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let Some(user) = self.store.get_auth_user_by_id(&claims.user_id).await? else {
            return Err(AuthError::InvalidRefreshToken);
        };

        // Exact-match check detects reuse of a rotated-out token.
        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let pair = self
            .tokens
            .issue_pair(&user.id, &user.login)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        self.store
            .set_refresh_token(&user.id, Some(&pair.refresh_token))
            .await?;

        Ok(pair)
    }

    /// Hash a password with the configured Argon2id parameters.
    /// Runs in `spawn_blocking` because Argon2 is CPU-intensive.
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password_sync(&password, &security))
            .await
            .context("Password hashing task panicked")?
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }
}

fn hash_password_sync(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
