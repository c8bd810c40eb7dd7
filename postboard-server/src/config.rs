//! Process-wide settings, resolved once at startup
//!
//! Values come from environment variables (the CLI loads `.env` first):
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `DEBUG`: `true` (any case) enables debug logging
//! - `CORS_ORIGINS`: comma-separated allowed origins
//! - `BIND_ADDR`: listen address (default: 0.0.0.0:8000)
//! - `STATIC_DIR`: optional front-end bundle directory (default: static)
//! - `DB_MIN_CONNECTIONS` / `DB_MAX_CONNECTIONS`: pool bounds (default: 1 / 10)
//! - `DB_ACQUIRE_TIMEOUT_SECS`, `DB_STATEMENT_TIMEOUT_SECS`, `REQUEST_TIMEOUT_SECS`

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::db::PoolConfig;

/// Prefix every post endpoint is mounted under.
pub const API_PREFIX: &str = "/api/v1";

const DEFAULT_DATABASE_URL: &str = "postgres://postgres:password@db:5432/app";
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:8080"];
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invalid configuration, reported before anything starts.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("DB_MIN_CONNECTIONS ({min}) must not exceed DB_MAX_CONNECTIONS ({max})")]
    PoolBounds { min: u32, max: u32 },

    #[error("DB_MAX_CONNECTIONS must be at least 1")]
    EmptyPool,
}

/// Resolved settings
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub api_prefix: String,
    pub debug: bool,
    pub cors_origins: Vec<String>,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
    pub request_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &"[REDACTED]")
            .field("api_prefix", &self.api_prefix)
            .field("debug", &self.debug)
            .field("cors_origins", &self.cors_origins)
            .field("bind_addr", &self.bind_addr)
            .field("static_dir", &self.static_dir)
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_prefix: API_PREFIX.to_string(),
            debug: false,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            min_connections: pool.min_connections,
            max_connections: pool.max_connections,
            acquire_timeout: pool.acquire_timeout,
            statement_timeout: pool.statement_timeout,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Missing variables fall back to defaults; present but malformed ones
    /// are errors.
    pub fn from_vars<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let debug = lookup("DEBUG")
            .map(|v| parse_debug_flag(&v))
            .unwrap_or(false);
        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(defaults.cors_origins);
        let bind_addr = lookup("BIND_ADDR")
            .map(|v| {
                v.trim().parse::<SocketAddr>().map_err(|e| SettingsError::InvalidValue {
                    key: "BIND_ADDR",
                    value: v.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(defaults.bind_addr);
        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let min_connections =
            parse_number(&lookup, "DB_MIN_CONNECTIONS")?.unwrap_or(defaults.min_connections);
        let max_connections =
            parse_number(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        let acquire_timeout = parse_number(&lookup, "DB_ACQUIRE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);
        let statement_timeout = parse_number(&lookup, "DB_STATEMENT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.statement_timeout);
        let request_timeout = parse_number(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let settings = Self {
            database_url,
            api_prefix: defaults.api_prefix,
            debug,
            cors_origins,
            bind_addr,
            static_dir,
            min_connections,
            max_connections,
            acquire_timeout,
            statement_timeout,
            request_timeout,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_connections == 0 {
            return Err(SettingsError::EmptyPool);
        }
        if self.min_connections > self.max_connections {
            return Err(SettingsError::PoolBounds {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        Ok(())
    }

    /// Pool options derived from these settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            database_url: self.database_url.clone(),
            min_connections: self.min_connections,
            max_connections: self.max_connections,
            acquire_timeout: self.acquire_timeout,
            statement_timeout: self.statement_timeout,
        }
    }
}

/// `DEBUG` is on only for the literal `true`, compared case-insensitively.
fn parse_debug_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| SettingsError::InvalidValue {
                key,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
