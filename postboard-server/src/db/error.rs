//! Database error type

/// Failures from the pool or the store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Store unreachable or credentials rejected while opening the pool
    #[error("failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("connection pool is closed")]
    PoolClosed,

    #[error("timed out waiting for a pooled connection")]
    AcquireTimeout,

    /// Schema DDL failed (malformed statement or missing privileges)
    #[error("failed to ensure schema: {0}")]
    Schema(#[source] sqlx::Error),

    /// Query execution failed; a write may or may not have been applied
    #[error("database error: {0}")]
    Query(#[source] sqlx::Error),
}

impl DbError {
    /// True when the store is unavailable rather than the query itself failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::PoolClosed | Self::AcquireTimeout | Self::Connection(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolClosed => Self::PoolClosed,
            sqlx::Error::PoolTimedOut => Self::AcquireTimeout,
            other => Self::Query(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_classified() {
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::PoolClosed));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::AcquireTimeout
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::Query(_)
        ));
    }

    #[test]
    fn unavailable_covers_pool_state_and_connection() {
        assert!(DbError::PoolClosed.is_unavailable());
        assert!(DbError::AcquireTimeout.is_unavailable());
        assert!(DbError::Connection(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(!DbError::Schema(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!DbError::Query(sqlx::Error::RowNotFound).is_unavailable());
    }
}
