//! postboard-server: a small bulletin board over HTTP
//!
//! Clients submit short text posts and read them back newest-first.
//! Request flow is layered:
//!
//! ```text
//! http (routes, extractors) -> service (business rule) -> db::repos -> db::pool -> PostgreSQL
//! ```
//!
//! [`lifecycle`] owns process startup and shutdown: the pool is opened and the
//! schema ensured before any request is accepted, and closed after the server
//! stops.

pub mod config;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod service;

pub use config::{Settings, SettingsError};
pub use db::{DbError, DbPool, PoolConfig};
pub use http::{build_router, ApiError, AppState, ServerError};
pub use lifecycle::{run, Lifecycle, LifecycleError, LifecycleState};
pub use models::{Post, PostText, ValidationError};
pub use service::{PostService, ServiceError};
