//! Domain and response models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and are serialized directly into
//! responses; the wrapper types here fix the upper-case envelope keys
//! (`PRODUCT_COUNT`, `PRODUCTS_LIST`, ...) clients expect.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod review;
pub mod user;

pub use cart::{CartLine, NewCartLine};
pub use catalog::{ColorImage, ProductDetail, ProductPage, ProductSummary, SizeOption, SubCategoryGroup};
pub use checkout::{CouponView, MembershipView, PaymentSummary};
pub use review::{Reply, Review, ReviewInput};
pub use user::{CurrentUser, User};
