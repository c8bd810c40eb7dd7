//! In-memory post store for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::PostRepository;
use crate::db::DbError;
use crate::models::{Post, PostText};

/// Records insert calls and can be switched into a failing mode.
#[derive(Default)]
pub(crate) struct MemoryPostRepo {
    posts: Mutex<Vec<Post>>,
    insert_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryPostRepo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like a lost connection.
    pub(crate) fn failing() -> Self {
        let repo = Self::default();
        repo.failing.store(true, Ordering::SeqCst);
        repo
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Query(sqlx::Error::Protocol(
                "connection reset by peer".into(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepo {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.check()
    }

    async fn list_all(&self) -> Result<Vec<Post>, DbError> {
        self.check()?;
        let posts = self.posts.lock().expect("posts lock poisoned");
        Ok(posts.iter().rev().cloned().collect())
    }

    async fn insert(&self, text: &PostText) -> Result<Post, DbError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut posts = self.posts.lock().expect("posts lock poisoned");
        let post = Post {
            id: posts.last().map(|p| p.id + 1).unwrap_or(1),
            text: text.as_str().to_owned(),
            created_at: Utc::now(),
        };
        posts.push(post.clone());
        Ok(post)
    }
}
