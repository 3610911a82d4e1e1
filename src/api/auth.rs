use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::services::TokenError;

use super::types::{MessageResponse, TokenPairDto};
use super::{ApiError, AppJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, axum::Json<MessageResponse>), ApiError> {
    let (login, password) = require_credentials(&payload)?;

    state.auth.signup(login, password).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(MessageResponse::new("User created successfully")),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<axum::Json<TokenPairDto>, ApiError> {
    let (login, password) = require_credentials(&payload)?;

    let pair = state.auth.login(login, password).await?;

    Ok(axum::Json(TokenPairDto::from(pair)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<axum::Json<TokenPairDto>, ApiError> {
    let Some(refresh_token) = payload.refresh_token.as_deref() else {
        return Err(ApiError::unauthorized("refreshToken is required"));
    };

    let pair = state.auth.refresh(refresh_token).await?;

    Ok(axum::Json(TokenPairDto::from(pair)))
}

fn require_credentials(payload: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
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

    Ok((login, password))
}

/// Gate for every route outside /auth. Verified claims are stored in the
/// request extensions for handlers that want the caller's identity.
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(header_value) = request.headers().get(header::AUTHORIZATION) else {
        return Err(ApiError::unauthorized("Authorization header is missing"));
    };

    let token = header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiError::unauthorized("Invalid authorization scheme. Expected Bearer token")
        })?;

    match state.tokens.verify_access(token.trim()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(TokenError::Expired) => Err(ApiError::unauthorized("Access token has expired")),
        Err(TokenError::Invalid) => Err(ApiError::unauthorized("Invalid access token")),
    }
}
