//! Reply route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use threadline_core::{ReplyId, ReviewId};

use crate::db::ReplyRepository;
use crate::error::{AppError, Result, messages};
use crate::extract::{JsonBody, PathParams};
use crate::middleware::RequireAuth;
use crate::models::Reply;
use crate::state::AppState;

/// Reply create/update body.
#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    pub comment: String,
}

impl ReplyBody {
    fn comment(&self) -> Result<&str> {
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(AppError::Validation(messages::INVALID_COMMENT.to_owned()));
        }
        Ok(comment)
    }
}

/// Reply list response.
#[derive(Debug, Serialize)]
pub struct ReplyList {
    #[serde(rename = "REPLY_LIST")]
    pub replies: Vec<Reply>,
}

/// Replies to a review, oldest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    PathParams(review_id): PathParams<ReviewId>,
) -> Result<Json<ReplyList>> {
    let replies = ReplyRepository::new(state.pool())
        .list_for_review(review_id)
        .await
        .map_err(AppError::or_not_found(messages::REVIEW_NOT_FOUND))?;

    Ok(Json(ReplyList { replies }))
}

/// Reply to a review.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams(review_id): PathParams<ReviewId>,
    JsonBody(body): JsonBody<ReplyBody>,
) -> Result<(StatusCode, Json<Value>)> {
    let reply = ReplyRepository::new(state.pool())
        .create(review_id, user.id, body.comment()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "MESSAGE": messages::SUCCESS, "REPLY_ID": reply.id })),
    ))
}

/// Edit one of the caller's replies.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams((review_id, reply_id)): PathParams<(ReviewId, ReplyId)>,
    JsonBody(body): JsonBody<ReplyBody>,
) -> Result<Json<Value>> {
    ReplyRepository::new(state.pool())
        .update_owned(review_id, reply_id, user.id, body.comment()?)
        .await
        .map_err(AppError::or_not_found(messages::REPLY_NOT_FOUND))?;

    Ok(Json(json!({ "MESSAGE": messages::SUCCESS })))
}

/// Delete one of the caller's replies.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams((review_id, reply_id)): PathParams<(ReviewId, ReplyId)>,
) -> Result<StatusCode> {
    ReplyRepository::new(state.pool())
        .delete_owned(review_id, reply_id, user.id)
        .await
        .map_err(AppError::or_not_found(messages::REPLY_NOT_FOUND))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_is_trimmed_and_required() {
        let body = ReplyBody {
            comment: "  thanks!  ".into(),
        };
        assert_eq!(body.comment().unwrap(), "thanks!");

        let body = ReplyBody {
            comment: "   ".into(),
        };
        assert!(matches!(
            body.comment(),
            Err(AppError::Validation(ref m)) if m == "INVALID_COMMENT"
        ));
    }
}
