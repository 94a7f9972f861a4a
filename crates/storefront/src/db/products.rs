//! Product detail queries.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use threadline_core::ProductId;

use super::RepositoryError;
use crate::models::{ColorImage, ProductDetail, Review, SizeOption};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    code: String,
    description: Option<String>,
    price: Decimal,
    discount_rate: i32,
    review_score_avg: f64,
}

/// Repository for single-product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a product exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.product WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Full detail for one product: attributes, hashtags, sizes,
    /// color/image pairs and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: ProductId) -> Result<ProductDetail, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.code, p.description, p.price, p.discount_rate,
                   COALESCE((SELECT AVG(r.score) FROM storefront.review r
                             WHERE r.product_id = p.id), 0)::FLOAT8 AS review_score_avg
            FROM storefront.product p
            WHERE p.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let hashtags = sqlx::query_scalar::<_, String>(
            r"
            SELECT h.name
            FROM storefront.product_hashtag ph
            JOIN storefront.hashtag h ON h.id = ph.hashtag_id
            WHERE ph.product_id = $1
            ORDER BY h.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool);

        let sizes = sqlx::query_as::<_, SizeOption>(
            r"
            SELECT s.id, s.name
            FROM storefront.product_size ps
            JOIN storefront.size s ON s.id = ps.size_id
            WHERE ps.product_id = $1
            ORDER BY s.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool);

        let color_images = sqlx::query_as::<_, ColorImage>(
            r"
            SELECT c.id AS color_id, c.name AS color_name,
                   i.id AS image_id, i.image_url
            FROM storefront.product_color_image pci
            JOIN storefront.color c ON c.id = pci.color_id
            LEFT JOIN storefront.image i ON i.id = pci.image_id
            WHERE pci.product_id = $1
            ORDER BY pci.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool);

        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT r.id, r.product_id, r.user_id, u.name AS user_name, r.score,
                   r.description, r.image_url, r.created_at, r.updated_at
            FROM storefront.review r
            JOIN storefront.user u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool);

        let (hashtags, sizes, color_images, reviews) =
            tokio::try_join!(hashtags, sizes, color_images, reviews)?;

        Ok(ProductDetail {
            id: row.id,
            name: row.name,
            code: row.code,
            description: row.description,
            price: row.price,
            discount_rate: row.discount_rate,
            review_score_avg: row.review_score_avg,
            hashtags,
            sizes,
            color_images,
            reviews,
        })
    }
}
