//! Cart repository.
//!
//! A cart line is unique per (user, product, size, color, thumbnail). Adding
//! an existing combination bumps its quantity instead of inserting a row.

use sqlx::PgPool;
use tracing::instrument;

use threadline_core::{CartId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{CartLine, NewCartLine};

/// Cart line columns, in [`CartLine`] field order.
pub(crate) const CART_LINE_SELECT: &str = r"
    SELECT c.id AS cart_id, p.id AS product_id, p.name, p.price, p.discount_rate,
           i.image_url AS thumbnail, s.name AS size, col.name AS color,
           c.quantity AS count
    FROM storefront.cart c
    JOIN storefront.product p ON p.id = c.product_id
    JOIN storefront.size s ON s.id = c.size_id
    JOIN storefront.color col ON col.id = c.color_id
    JOIN storefront.image i ON i.id = c.thumbnail_id
    WHERE c.user_id = $1
";

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every line in the user's cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(&format!("{CART_LINE_SELECT} ORDER BY c.id"))
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(lines)
    }

    /// Add one unit of a product variant.
    ///
    /// Inserts a line with quantity 1, or increments the existing line for
    /// the same variant. Runs as a single statement, so concurrent adds of
    /// the same variant never produce two lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` naming the violated constraint
    /// (`cart_product_fk`, `cart_size_fk`, `cart_color_fk`,
    /// `cart_thumbnail_fk`) if a referenced row does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: UserId, line: NewCartLine) -> Result<CartId, RepositoryError> {
        let cart_id = sqlx::query_scalar::<_, CartId>(
            r"
            INSERT INTO storefront.cart (user_id, product_id, size_id, color_id, thumbnail_id, quantity)
            VALUES ($1, $2, $3, $4, $5, 1)
            ON CONFLICT ON CONSTRAINT cart_line_unique
            DO UPDATE SET quantity = storefront.cart.quantity + 1, updated_at = now()
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(line.product_id)
        .bind(line.size_id)
        .bind(line.color_id)
        .bind(line.thumbnail_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        tracing::info!(%cart_id, "cart line added");
        Ok(cart_id)
    }

    /// Set the quantity of one of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        cart_id: CartId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.cart
            SET quantity = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(cart_id)
        .bind(user_id)
        .bind(quantity.get())
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove one of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, cart_id: CartId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart WHERE id = $1 AND user_id = $2")
            .bind(cart_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
