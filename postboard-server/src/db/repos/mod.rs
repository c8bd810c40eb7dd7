//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Acquires one pooled connection per call, released on return
//! - Binds user input as parameters
//! - Lets the store assign identity and timestamps (INSERT ... RETURNING)

pub mod posts;

#[cfg(test)]
pub(crate) mod memory;

pub use posts::{PgPostRepo, PostRepository};
