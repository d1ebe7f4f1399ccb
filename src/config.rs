use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

use crate::password::HashParams;

/// Token lifetime used when the config does not set one.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    /// PostgreSQL connection URL; in-memory store when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Admin account created at startup if it does not exist yet
    #[serde(default)]
    pub default_admin: Option<DefaultAdminConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HMAC signing secret shared by issuer and validator
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    #[serde(default)]
    pub hash: HashParams,
}

fn default_token_ttl_secs() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("hash", &self.hash)
            .finish()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("auth.jwt_secret is empty (set it in config or via JWT_SECRET)");
        }
        if self.token_ttl_secs <= 0 {
            bail!(
                "auth.token_ttl_secs must be positive, got {}",
                self.token_ttl_secs
            );
        }
        let ttl = self.token_ttl()?;
        if chrono::Utc::now().checked_add_signed(ttl).is_none() {
            bail!(
                "auth.token_ttl_secs {} puts token expiry past the supported date range",
                self.token_ttl_secs
            );
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        chrono::TimeDelta::try_seconds(self.token_ttl_secs).with_context(|| {
            format!(
                "auth.token_ttl_secs {} is out of range",
                self.token_ttl_secs
            )
        })
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DefaultAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for DefaultAdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply `JWT_SECRET` / `DATABASE_URL`.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.auth.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = var("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = var("DATABASE_URL").filter(|s| !s.is_empty()) {
            self.postgres_url = Some(url);
        }
    }
}
