//! Central module for application-wide configuration settings.
//!
//! Configuration is read once at startup from the process environment (and an
//! optional `.env` file) and then handed to each component explicitly. Nothing
//! below re-reads the environment after `Config::from_env` returns.

use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub bcrypt_cost: u32,
    pub blocking_timeout_seconds: u64,
    pub cookie_secure: bool,
    pub server_port: u16,
}

/// Token lifetimes and signing material handed to the token service.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://identity.db?mode=rwc".to_string());

        let max_connections = parse_var("DB_MAX_CONNECTIONS", "5")?;
        let acquire_timeout_seconds = parse_var("DB_ACQUIRE_TIMEOUT_SECONDS", "3")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let access_token_ttl_seconds = parse_var("ACCESS_TOKEN_TTL_SECONDS", "10800")?;
        let refresh_token_ttl_seconds = parse_var("REFRESH_TOKEN_TTL_SECONDS", "604800")?;
        let bcrypt_cost = parse_var("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?;
        let blocking_timeout_seconds = parse_var("BLOCKING_TIMEOUT_SECONDS", "5")?;
        let cookie_secure = parse_var("COOKIE_SECURE", "true")?;
        let server_port = parse_var("SERVER_PORT", "8080")?;

        let config = Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            bcrypt_cost,
            blocking_timeout_seconds,
            cookie_secure,
            server_port,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would leave tokens unsigned or inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.access_token_ttl_seconds == 0 {
            bail!("ACCESS_TOKEN_TTL_SECONDS must be greater than zero");
        }
        if self.refresh_token_ttl_seconds <= self.access_token_ttl_seconds {
            bail!("REFRESH_TOKEN_TTL_SECONDS must be longer than ACCESS_TOKEN_TTL_SECONDS");
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}");
        }
        Ok(())
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self.jwt_secret.clone(),
            access_ttl: Duration::from_secs(self.access_token_ttl_seconds),
            refresh_ttl: Duration::from_secs(self.refresh_token_ttl_seconds),
        }
    }

    pub fn blocking_timeout(&self) -> Duration {
        Duration::from_secs(self.blocking_timeout_seconds)
    }
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid value"))
}

// Keeps the signing secret out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("blocking_timeout_seconds", &self.blocking_timeout_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .field("server_port", &self.server_port)
            .finish()
    }
}
