//! Payment summary types.

use serde::Serialize;

use super::cart::CartLine;

/// A coupon held by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CouponView {
    pub coupon: String,
    pub coupon_discount_rate: i32,
}

/// The user's membership tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MembershipView {
    pub grade: String,
    pub discount_rate: i32,
}

/// Everything the payment page needs in one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub carts_list: Vec<CartLine>,
    pub coupons_list: Vec<CouponView>,
    pub membership: Option<MembershipView>,
    pub address: Option<String>,
}
