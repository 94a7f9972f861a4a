//! Catalog response types.

use rust_decimal::Decimal;
use serde::Serialize;

use threadline_core::{ColorId, ImageId, ProductId, SizeId, SubCategoryId};

use super::review::Review;

/// One product in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub discount_rate: i32,
    /// Mean review score; 0 when the product has no reviews.
    pub review_score_avg: f64,
    /// Image of the first colour that has one.
    pub thumbnail: Option<String>,
    /// Number of distinct colours the product is offered in.
    pub color_count: i64,
}

/// One page of a filtered listing plus the size of the whole match set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    #[serde(rename = "PRODUCT_COUNT")]
    pub total: i64,
    #[serde(rename = "PRODUCTS_LIST")]
    pub items: Vec<ProductSummary>,
}

/// A sub-category with a preview of its products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategoryGroup {
    pub id: SubCategoryId,
    pub name: String,
    #[serde(rename = "PRODUCTS_LIST")]
    pub products: Vec<ProductSummary>,
}

/// A size a product is offered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SizeOption {
    pub id: SizeId,
    pub name: String,
}

/// A colour a product is offered in and its thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ColorImage {
    pub color_id: ColorId,
    pub color_name: String,
    pub image_id: Option<ImageId>,
    pub image_url: Option<String>,
}

/// Everything shown on a product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_rate: i32,
    pub review_score_avg: f64,
    pub hashtags: Vec<String>,
    pub sizes: Vec<SizeOption>,
    pub color_images: Vec<ColorImage>,
    pub reviews: Vec<Review>,
}
