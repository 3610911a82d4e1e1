use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/harmonarr.db".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for access tokens. Override via `JWT_SECRET_KEY`.
    pub access_secret: String,

    /// HS256 secret for refresh tokens. Override via `JWT_SECRET_REFRESH_KEY`.
    /// Must differ from the access secret so tokens cannot be swapped.
    pub refresh_secret: String,

    /// Access token lifetime in seconds (default: 1 hour).
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds (default: 24 hours).
    pub refresh_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: "change-me-access".to_string(),
            refresh_secret: "change-me-refresh".to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 86400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Self::default_config_path();
        let mut config = if path.exists() {
            info!("Loading config from: {}", path.display());
            Self::load_from_path(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.general.database_path = path;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET_KEY") {
            self.auth.access_secret = secret;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET_REFRESH_KEY") {
            self.auth.refresh_secret = secret;
        }
        if let Ok(ttl) = std::env::var("TOKEN_EXPIRE_TIME_SECS")
            && let Ok(ttl) = ttl.parse()
        {
            self.auth.access_ttl_secs = ttl;
        }
        if let Ok(ttl) = std::env::var("TOKEN_REFRESH_EXPIRE_TIME_SECS")
            && let Ok(ttl) = ttl.parse()
        {
            self.auth.refresh_ttl_secs = ttl;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.access_secret == self.auth.refresh_secret {
            anyhow::bail!("Access and refresh token secrets must differ");
        }

        if self.auth.access_ttl_secs <= 0 || self.auth.refresh_ttl_secs <= 0 {
            anyhow::bail!("Token lifetimes must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.access_ttl_secs, 3600);
        assert_eq!(config.auth.refresh_ttl_secs, 86400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            access_ttl_secs = 120
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.access_ttl_secs, 120);

        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut config = Config::default();
        config.auth.refresh_secret.clone_from(&config.auth.access_secret);
        assert!(config.validate().is_err());
    }
}
