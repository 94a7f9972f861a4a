//! Review and reply repositories.
//!
//! Updates and deletes are scoped to the author: a row owned by someone
//! else is indistinguishable from a missing one.

use sqlx::PgPool;
use tracing::instrument;

use threadline_core::{ProductId, ReplyId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{Reply, Review, ReviewInput};

const REVIEW_COLUMNS: &str = "\
    r.id, r.product_id, r.user_id, u.name AS user_name, r.score, \
    r.description, r.image_url, r.created_at, r.updated_at";

const REPLY_COLUMNS: &str = "\
    r.id, r.review_id, r.user_id, u.name AS user_name, r.comment, \
    r.created_at, r.updated_at";

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} \
             FROM storefront.review r \
             JOIN storefront.user u ON u.id = r.user_id \
             WHERE r.product_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey("review_product_fk")` if the
    /// product does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, input), fields(score = input.score.get()))]
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "WITH r AS ( \
                 INSERT INTO storefront.review (product_id, user_id, score, description, image_url) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING * \
             ) \
             SELECT {REVIEW_COLUMNS} FROM r JOIN storefront.user u ON u.id = r.user_id"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(input.score)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        tracing::info!(review_id = %review.id, "review created");
        Ok(review)
    }

    /// Replace the body of a review the user wrote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review with this id belongs
    /// to `user_id` under `product_id`.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, input))]
    pub async fn update_owned(
        &self,
        product_id: ProductId,
        review_id: ReviewId,
        user_id: UserId,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            "WITH r AS ( \
                 UPDATE storefront.review \
                 SET score = $4, description = $5, image_url = $6, updated_at = now() \
                 WHERE id = $1 AND product_id = $2 AND user_id = $3 \
                 RETURNING * \
             ) \
             SELECT {REVIEW_COLUMNS} FROM r JOIN storefront.user u ON u.id = r.user_id"
        ))
        .bind(review_id)
        .bind(product_id)
        .bind(user_id)
        .bind(input.score)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_write)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a review the user wrote, along with its replies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such review belongs to
    /// `user_id`.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete_owned(
        &self,
        product_id: ProductId,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.review
            WHERE id = $1 AND product_id = $2 AND user_id = $3
            ",
        )
        .bind(review_id)
        .bind(product_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Repository for replies to reviews.
pub struct ReplyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReplyRepository<'a> {
    /// Create a new reply repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replies to one review, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_review(&self, review_id: ReviewId) -> Result<Vec<Reply>, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.review WHERE id = $1)",
        )
        .bind(review_id)
        .fetch_one(self.pool)
        .await?;

        if !exists {
            return Err(RepositoryError::NotFound);
        }

        let replies = sqlx::query_as::<_, Reply>(&format!(
            "SELECT {REPLY_COLUMNS} \
             FROM storefront.reply r \
             JOIN storefront.user u ON u.id = r.user_id \
             WHERE r.review_id = $1 \
             ORDER BY r.id"
        ))
        .bind(review_id)
        .fetch_all(self.pool)
        .await?;

        Ok(replies)
    }

    /// Create a reply.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey("reply_review_fk")` if the review
    /// does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, comment))]
    pub async fn create(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        comment: &str,
    ) -> Result<Reply, RepositoryError> {
        let reply = sqlx::query_as::<_, Reply>(&format!(
            "WITH r AS ( \
                 INSERT INTO storefront.reply (review_id, user_id, comment) \
                 VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT {REPLY_COLUMNS} FROM r JOIN storefront.user u ON u.id = r.user_id"
        ))
        .bind(review_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        tracing::info!(reply_id = %reply.id, "reply created");
        Ok(reply)
    }

    /// Replace the comment of a reply the user wrote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such reply belongs to
    /// `user_id`.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, comment))]
    pub async fn update_owned(
        &self,
        review_id: ReviewId,
        reply_id: ReplyId,
        user_id: UserId,
        comment: &str,
    ) -> Result<Reply, RepositoryError> {
        sqlx::query_as::<_, Reply>(&format!(
            "WITH r AS ( \
                 UPDATE storefront.reply \
                 SET comment = $4, updated_at = now() \
                 WHERE id = $1 AND review_id = $2 AND user_id = $3 \
                 RETURNING * \
             ) \
             SELECT {REPLY_COLUMNS} FROM r JOIN storefront.user u ON u.id = r.user_id"
        ))
        .bind(reply_id)
        .bind(review_id)
        .bind(user_id)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a reply the user wrote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such reply belongs to
    /// `user_id`.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete_owned(
        &self,
        review_id: ReviewId,
        reply_id: ReplyId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.reply WHERE id = $1 AND review_id = $2 AND user_id = $3",
        )
        .bind(reply_id)
        .bind(review_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
