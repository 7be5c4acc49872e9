use std::str::FromStr;

use anyhow::{Context, Result, bail};

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CACHE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend `{other}`, expected `postgres` or `memory`"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .context("DATABASE_URL must be set for the postgres backend")
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Orders held in memory before the buffer is written to the store.
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

/// Reads the configuration from the process environment.
pub fn load() -> Result<AppConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let backend = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?;
    let pool_size = parse_or(&lookup, "DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
    let capacity = parse_or(&lookup, "ORDER_CACHE_SIZE", DEFAULT_CACHE_SIZE)?;

    if capacity == 0 {
        bail!("ORDER_CACHE_SIZE can't be zero");
    }
    if pool_size == 0 {
        bail!("DATABASE_POOL_SIZE can't be zero");
    }

    let config = AppConfig {
        server: ServerConfig {
            addr: lookup("SERVER_ADDR").unwrap_or(DEFAULT_SERVER_ADDR.to_string()),
        },
        backend,
        database: DatabaseConfig {
            url: lookup("DATABASE_URL"),
            pool_size,
        },
        cache: CacheConfig { capacity },
    };

    if config.backend == StorageBackend::Postgres {
        config.database.url()?;
    }

    Ok(config)
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow::anyhow!("Invalid value for {key} ({raw}): {err}")),
        None => Ok(default),
    }
}
