//! HTTP server layer
//!
//! Axum server with:
//! - Configurable CORS (credentials allowed for listed origins)
//! - Request tracing and a request timeout
//! - Optional static front-end bundle with index.html fallback
//! - JSON error responses shaped `{"detail": ...}`

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, serve, AppState, ServerError};
