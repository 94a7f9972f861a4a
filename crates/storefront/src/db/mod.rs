//! Database operations for the storefront `PostgreSQL` schema.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `menu`, `main_category`, `sub_category` - Catalog hierarchy
//! - `product` - Products, one sub-category each
//! - `size`, `color`, `image`, `hashtag` - Facet values
//! - `product_size`, `product_hashtag`, `product_color_image` - Facet links
//! - `review`, `reply` - Customer reviews and replies
//! - `cart` - Cart lines, unique per (user, product, size, color, thumbnail)
//! - `user`, `membership`, `coupon`, `user_coupon` - Account data (read-mostly)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p threadline-cli -- migrate
//! ```
//!
//! All queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a live database.

pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod products;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use checkout::CheckoutRepository;
pub use products::ProductRepository;
pub use reviews::{ReplyRepository, ReviewRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A write referenced a row that does not exist.
    ///
    /// Carries the name of the violated foreign-key constraint.
    #[error("missing reference: {0}")]
    ForeignKey(String),

    /// Constraint violation (e.g., unique key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify an error returned by an `INSERT`/`UPDATE`.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or_default().to_owned();
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKey(constraint);
            }
            if db_err.is_unique_violation() || db_err.is_check_violation() {
                return Self::Conflict(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
