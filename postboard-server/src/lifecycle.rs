//! Process lifecycle: stopped -> running -> stopped
//!
//! Starting opens the pool and ensures the schema; only then may the server
//! accept traffic. Any failure while starting is fatal and leaves the
//! lifecycle stopped with nothing held open. Stopping closes the pool.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::db::{DbError, DbPool, PgPostRepo, PostRepository};
use crate::http::{self, AppState, ServerError};
use crate::service::PostService;

/// Lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("already running")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
}

/// Owns the pool for as long as the process is serving.
pub struct Lifecycle {
    settings: Settings,
    pool: Option<DbPool>,
}

impl Lifecycle {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pool: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.pool {
            Some(_) => LifecycleState::Running,
            None => LifecycleState::Stopped,
        }
    }

    /// Open the pool and ensure the schema, returning the state handlers share.
    ///
    /// On failure the pool (if it was opened) is closed again and the
    /// lifecycle stays [`LifecycleState::Stopped`].
    pub async fn start(&mut self) -> Result<AppState, LifecycleError> {
        if self.pool.is_some() {
            return Err(LifecycleError::AlreadyRunning);
        }

        let pool = DbPool::open(&self.settings.pool_config()).await?;
        let repo = PgPostRepo::new(pool.clone());
        if let Err(e) = repo.ensure_schema().await {
            pool.close().await;
            return Err(e.into());
        }

        self.pool = Some(pool);
        info!("Lifecycle running");
        Ok(AppState::new(PostService::new(Arc::new(repo))))
    }

    /// Close the pool. Does nothing when already stopped.
    pub async fn stop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Lifecycle stopped");
        }
    }
}

/// Start, serve until a shutdown signal, then stop.
///
/// The pool is closed even when binding or serving fails.
pub async fn run(settings: Settings) -> Result<(), LifecycleError> {
    let mut lifecycle = Lifecycle::new(settings.clone());
    let state = lifecycle.start().await?;

    let result = match http::build_router(state, &settings) {
        Ok(router) => http::serve(router, &settings).await,
        Err(e) => Err(e),
    };

    lifecycle.stop().await;
    result.map_err(LifecycleError::from)
}
