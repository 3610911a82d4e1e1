use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::UserDto;
use super::validation::validate_uuid;
use super::{ApiError, AppJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /user
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    validate_uuid(&id, "userId")?;

    let user = state
        .store
        .get_user(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User with id: {id} not found!")))?;

    Ok(Json(UserDto::from(user)))
}

/// POST /user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let (Some(login), Some(password)) = (payload.login.as_deref(), payload.password.as_deref())
    else {
        return Err(ApiError::validation("login and password are required!"));
    };

    if login.is_empty() {
        return Err(ApiError::validation("login must not be empty!"));
    }
    if password.len() < 3 {
        return Err(ApiError::validation(
            "password must be at least 3 characters!",
        ));
    }

    if state.store.get_auth_user_by_login(login).await?.is_some() {
        return Err(ApiError::validation("User with this login already exists"));
    }

    let hash = state.auth.hash_password(password).await?;
    let user = state.store.create_user(login, &hash).await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// PUT /user/{id} -- password change, bumps the user version.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<Json<UserDto>, ApiError> {
    validate_uuid(&id, "userId")?;

    let (Some(old_password), Some(new_password)) = (
        payload.old_password.as_deref(),
        payload.new_password.as_deref(),
    ) else {
        return Err(ApiError::validation(
            "oldPassword and newPassword are required!",
        ));
    };

    let Some(user) = state.store.get_auth_user_by_id(&id).await? else {
        return Err(ApiError::not_found(format!(
            "User with id: {id} not found!"
        )));
    };

    if !state
        .auth
        .verify_password(old_password, &user.password_hash)
        .await?
    {
        return Err(ApiError::forbidden("Old password is wrong!"));
    }

    let hash = state.auth.hash_password(new_password).await?;
    let updated = state
        .store
        .update_user_password(&id, &hash)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User with id: {id} not found!")))?;

    Ok(Json(UserDto::from(updated)))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid(&id, "userId")?;

    if state.store.remove_user(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "User with id: {id} not found!"
        )))
    }
}
