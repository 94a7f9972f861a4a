//! Review route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use threadline_core::{ProductId, ReviewId, ReviewScore};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result, messages};
use crate::extract::{JsonBody, PathParams};
use crate::middleware::RequireAuth;
use crate::models::{Review, ReviewInput};
use crate::state::AppState;

/// Review create/update body.
///
/// `score` is required; the rest may be omitted.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub score: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TryFrom<ReviewBody> for ReviewInput {
    type Error = AppError;

    fn try_from(body: ReviewBody) -> Result<Self> {
        Ok(Self {
            score: ReviewScore::new(body.score)?,
            description: body.description,
            image_url: body.image_url,
        })
    }
}

/// Review list response.
#[derive(Debug, Serialize)]
pub struct ReviewList {
    #[serde(rename = "REVIEW_LIST")]
    pub reviews: Vec<Review>,
}

/// Reviews of a product, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    PathParams(product_id): PathParams<ProductId>,
) -> Result<Json<ReviewList>> {
    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_owned()));
    }

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;

    Ok(Json(ReviewList { reviews }))
}

/// Post a review.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams(product_id): PathParams<ProductId>,
    JsonBody(body): JsonBody<ReviewBody>,
) -> Result<(StatusCode, Json<Value>)> {
    let input = ReviewInput::try_from(body)?;

    let review = ReviewRepository::new(state.pool())
        .create(product_id, user.id, &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "MESSAGE": messages::SUCCESS, "REVIEW_ID": review.id })),
    ))
}

/// Edit one of the caller's reviews.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams((product_id, review_id)): PathParams<(ProductId, ReviewId)>,
    JsonBody(body): JsonBody<ReviewBody>,
) -> Result<Json<Value>> {
    let input = ReviewInput::try_from(body)?;

    ReviewRepository::new(state.pool())
        .update_owned(product_id, review_id, user.id, &input)
        .await
        .map_err(AppError::or_not_found(messages::REVIEW_NOT_FOUND))?;

    Ok(Json(json!({ "MESSAGE": messages::SUCCESS })))
}

/// Delete one of the caller's reviews.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParams((product_id, review_id)): PathParams<(ProductId, ReviewId)>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.pool())
        .delete_owned(product_id, review_id, user.id)
        .await
        .map_err(AppError::or_not_found(messages::REVIEW_NOT_FOUND))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        let body = |score| ReviewBody {
            score,
            description: None,
            image_url: None,
        };

        assert_eq!(ReviewInput::try_from(body(0)).unwrap().score.get(), 0);
        assert_eq!(ReviewInput::try_from(body(5)).unwrap().score.get(), 5);

        let err = ReviewInput::try_from(body(6)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "INVALID_SCORE"));
        let err = ReviewInput::try_from(body(-1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "INVALID_SCORE"));
    }

    #[test]
    fn test_body_requires_score() {
        assert!(serde_json::from_str::<ReviewBody>(r#"{"description": "nice"}"#).is_err());

        let body: ReviewBody = serde_json::from_str(r#"{"score": 3}"#).unwrap();
        assert_eq!(body.score, 3);
        assert!(body.description.is_none());
    }
}
