//! Cart types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use threadline_core::{CartId, ColorId, ImageId, ProductId, SizeId};

/// A cart line joined with the product and option names it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub discount_rate: i32,
    pub thumbnail: String,
    pub size: String,
    pub color: String,
    pub count: i32,
}

/// The option tuple identifying a cart line for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub size_id: SizeId,
    pub color_id: ColorId,
    #[serde(rename = "image_id")]
    pub thumbnail_id: ImageId,
}
