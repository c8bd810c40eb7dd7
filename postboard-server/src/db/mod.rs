//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - One bounded pool (sqlx PgPool), opened once at startup
//! - Each repository call acquires exactly one pooled connection
//! - User text is always bound as a parameter, never interpolated
//! - Schema DDL is embedded in the binary, not read from the working directory

pub mod error;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::{DbPool, PoolConfig};
pub use repos::*;
