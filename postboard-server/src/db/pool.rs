//! Database connection pool management
//!
//! Wraps sqlx `PgPool` with explicit bounds and timeouts. The pool owns the
//! checked-out accounting; a connection handed out by [`DbPool::acquire`] is
//! exclusive to its holder and returns to the pool when the guard drops.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use super::DbError;

/// Default minimum connections kept open.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 5;

/// Pool configuration
#[derive(Clone)]
pub struct PoolConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a caller waits for a free connection before failing
    pub acquire_timeout: Duration,
    /// Server-side limit on a single statement
    pub statement_timeout: Duration,
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &"[REDACTED]")
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            statement_timeout: Duration::from_secs(DEFAULT_STATEMENT_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let options = PgConnectOptions::from_str(&self.database_url)?;
        Ok(options.options([(
            "statement_timeout",
            self.statement_timeout.as_millis().to_string(),
        )]))
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Bounded pool of live PostgreSQL connections.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Open the pool and verify the store answers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the store is unreachable, the URL is
    /// malformed, or credentials are rejected.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pool = DbPool::open(&settings.pool_config()).await?;
    /// ```
    pub async fn open(config: &PoolConfig) -> Result<Self, DbError> {
        debug!(
            min = config.min_connections,
            max = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            statement_timeout_ms = config.statement_timeout.as_millis() as u64,
            "Opening database pool"
        );

        let connect_options = config.connect_options().map_err(DbError::Connection)?;
        let pool = config
            .pool_options()
            .connect_with(connect_options)
            .await
            .map_err(DbError::Connection)?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            pool.close().await;
            return Err(DbError::Connection(e));
        }

        let pool = Self { pool };
        info!(
            min = config.min_connections,
            max = pool.max_connections(),
            open = pool.size(),
            idle = pool.idle(),
            "Database pool opened"
        );
        Ok(pool)
    }

    /// Check out one connection, waiting up to the acquire timeout.
    ///
    /// Dropping the returned guard releases the connection back to the pool.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        self.pool.acquire().await.map_err(DbError::from)
    }

    /// Drain and terminate every connection. Later acquires fail with
    /// [`DbError::PoolClosed`]. Closing twice is harmless.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        info!("Database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Connections currently open, idle or checked out.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn idle(&self) -> usize {
        self.pool.num_idle()
    }

    pub fn max_connections(&self) -> u32 {
        self.pool.options().get_max_connections()
    }

    /// Pool that connects on first use, for tests that never reach the store.
    #[cfg(test)]
    pub(crate) fn lazy(config: &PoolConfig) -> Self {
        let connect_options = config
            .connect_options()
            .expect("test database url must parse");
        Self {
            pool: config.pool_options().connect_lazy_with(connect_options),
        }
    }
}
