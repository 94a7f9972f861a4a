//! Checkout reads and the shipping address write.

use sqlx::PgPool;
use tracing::instrument;

use threadline_core::UserId;

use super::RepositoryError;
use super::carts::CART_LINE_SELECT;
use crate::models::{CartLine, CouponView, MembershipView, PaymentSummary};

/// Repository for the payment page.
pub struct CheckoutRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutRepository<'a> {
    /// Create a new checkout repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace the user's shipping address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, address))]
    pub async fn update_address(&self, user_id: UserId, address: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.user SET address = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(address)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Everything the payment page shows: cart lines, every coupon the user
    /// holds, their membership tier (if any) and shipping address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn summary(&self, user_id: UserId) -> Result<PaymentSummary, RepositoryError> {
        let (address,) = sqlx::query_as::<_, (Option<String>,)>(
            "SELECT address FROM storefront.user WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let cart_query = format!("{CART_LINE_SELECT} ORDER BY c.id");
        let carts = sqlx::query_as::<_, CartLine>(&cart_query)
            .bind(user_id)
            .fetch_all(self.pool);

        let coupons = sqlx::query_as::<_, CouponView>(
            r"
            SELECT c.name AS coupon, c.discount_rate AS coupon_discount_rate
            FROM storefront.user_coupon uc
            JOIN storefront.coupon c ON c.id = uc.coupon_id
            WHERE uc.user_id = $1
            ORDER BY uc.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool);

        let membership = sqlx::query_as::<_, MembershipView>(
            r"
            SELECT m.grade, m.discount_rate
            FROM storefront.user u
            JOIN storefront.membership m ON m.id = u.membership_id
            WHERE u.id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool);

        let (carts_list, coupons_list, membership) = tokio::try_join!(carts, coupons, membership)?;

        Ok(PaymentSummary {
            carts_list,
            coupons_list,
            membership,
            address,
        })
    }
}
