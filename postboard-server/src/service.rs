//! Post service - the business rule between transport and storage
//!
//! The length check here is authoritative: the service can be called without
//! the HTTP layer (the CLI does), so it never relies on request validation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{DbError, PostRepository};
use crate::models::{Post, PostText, ValidationError};

/// Errors from service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Post service
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DbError> {
        let posts = self.repo.list_all().await?;
        info!(count = posts.len(), "Retrieved posts");
        Ok(posts)
    }

    /// Validate and persist a new post.
    ///
    /// Invalid text fails with [`ServiceError::Validation`] before the
    /// repository is touched.
    pub async fn submit_post(&self, text: &str) -> Result<Post, ServiceError> {
        let text = PostText::new(text).inspect_err(|e| {
            warn!(error = %e, "Rejected post");
        })?;

        let post = self.repo.insert(&text).await?;
        info!(id = post.id, "Created post");
        Ok(post)
    }
}
