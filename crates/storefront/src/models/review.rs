//! Review and reply types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threadline_core::{ProductId, ReplyId, ReviewId, ReviewScore, UserId};

/// A product review with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub user_name: String,
    pub score: ReviewScore,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated review fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub score: ReviewScore,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A reply to a review with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Reply {
    pub id: ReplyId,
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
