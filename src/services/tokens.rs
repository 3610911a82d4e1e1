use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub login: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

/// Issues and verifies HS256-signed access/refresh tokens. The two token
/// families use distinct secrets, so a refresh token never passes the
/// access gate and vice versa.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    pub fn issue_pair(&self, user_id: &str, login: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.sign(user_id, login, &self.access_encoding, self.access_ttl_secs)?;
        let refresh_token =
            self.sign(user_id, login, &self.refresh_encoding, self.refresh_ttl_secs)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.access_decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.refresh_decoding)
    }

    fn sign(
        &self,
        user_id: &str,
        login: &str,
        key: &EncodingKey,
        ttl_secs: i64,
    ) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            user_id: user_id.to_string(),
            login: login.to_string(),
            iat,
            exp: iat + ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, key).map_err(|_| TokenError::Invalid)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(access_ttl_secs: i64) -> AuthConfig {
        AuthConfig {
            access_secret: "access-test-secret".to_string(),
            refresh_secret: "refresh-test-secret".to_string(),
            access_ttl_secs,
            refresh_ttl_secs: 60,
        }
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let service = TokenService::new(&config(60));
        let pair = service.issue_pair("user-1", "alice").unwrap();

        let claims = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.exp, claims.iat + 60);

        let claims = service.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(claims.user_id, "user-1");
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let service = TokenService::new(&config(60));
        let pair = service.issue_pair("user-1", "alice").unwrap();

        assert!(matches!(
            service.verify_access(&pair.refresh_token),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            service.verify_refresh(&pair.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(&config(-10));
        let pair = service.issue_pair("user-1", "alice").unwrap();

        assert!(matches!(
            service.verify_access(&pair.access_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new(&config(60));
        assert!(matches!(
            service.verify_access("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }
}
