//! Custom Axum extractors

use axum::extract::{FromRequest, Request};
use axum::Json;

use super::error::ApiError;
use super::routes::posts::CreatePostRequest;
use crate::models::MAX_TEXT_LEN;

/// Request-layer check for a new post body.
///
/// Rejects with 422 when the body is not a JSON object with a string `text`,
/// or when `text` is longer than the post limit. The lower bound is left to
/// the service, whose check is authoritative.
pub struct ValidNewPost(pub CreatePostRequest);

impl<S> FromRequest<S> for ValidNewPost
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<CreatePostRequest>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Unprocessable {
                message: rejection.body_text(),
            })?;

        if body.text.chars().count() > MAX_TEXT_LEN {
            return Err(ApiError::Unprocessable {
                message: format!("text: must be at most {} characters", MAX_TEXT_LEN),
            });
        }

        Ok(Self(body))
    }
}
