//! Post endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::ValidNewPost;
use crate::http::server::AppState;
use crate::models::Post;

/// Create post request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            text: p.text,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// GET /posts - list all posts, newest first
async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state.posts.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// POST /posts - create a post
async fn create_post(
    State(state): State<Arc<AppState>>,
    ValidNewPost(req): ValidNewPost,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.posts.submit_post(&req.text).await?;
    Ok(Json(PostResponse::from(post)))
}

/// Post routes, mounted under the API prefix
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/posts", get(list_posts).post(create_post))
}
