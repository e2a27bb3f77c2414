use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing::Level;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,

    // Rate limiting
    pub rate_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: Level,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{key}: cannot parse '{raw}': {e}"))
}

impl Config {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: or_default("DB_MAX_CONNECTIONS", "10")?,
            run_migrations: or_default("RUN_MIGRATIONS", "true")?,

            rate_per_min: or_default("RATE_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: or_default("LOG_LEVEL", "debug")?,
        };

        if config.rate_per_min == 0 {
            bail!("RATE_PER_MIN must be at least 1");
        }
        if config.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(config)
    }
}
