//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET    /products                                   - Filtered, paginated listing
//! GET    /products/menu/{menu}                       - Sub-categories of a menu with sample products
//! GET    /products/{product_id}                      - Product detail
//!
//! # Reviews (writes require auth, edits require ownership)
//! GET    /products/{product_id}/reviews              - Review list
//! POST   /products/{product_id}/reviews              - Post review
//! PUT    /products/{product_id}/reviews/{review_id}  - Edit review
//! DELETE /products/{product_id}/reviews/{review_id}  - Delete review
//!
//! # Replies
//! GET    /reviews/{review_id}/replies                - Reply list
//! POST   /reviews/{review_id}/replies                - Post reply
//! PUT    /reviews/{review_id}/replies/{reply_id}     - Edit reply
//! DELETE /reviews/{review_id}/replies/{reply_id}     - Delete reply
//!
//! # Cart (requires auth)
//! GET    /carts                                      - Cart lines
//! POST   /carts                                      - Add one unit of a variant
//! PUT    /carts                                      - Set line quantity
//! DELETE /carts                                      - Remove line
//!
//! # Payment (requires auth)
//! GET    /payment                                    - Payment summary
//! PATCH  /payment                                    - Set shipping address
//! ```

pub mod cart;
pub mod payment;
pub mod products;
pub mod replies;
pub mod reviews;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/menu/{menu}", get(products::by_menu))
        .route("/{product_id}", get(products::show))
        .route(
            "/{product_id}/reviews",
            get(reviews::index).post(reviews::create),
        )
        .route(
            "/{product_id}/reviews/{review_id}",
            axum::routing::put(reviews::update).delete(reviews::destroy),
        )
}

/// Create the reply routes router.
pub fn reply_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{review_id}/replies",
            get(replies::index).post(replies::create),
        )
        .route(
            "/{review_id}/replies/{reply_id}",
            axum::routing::put(replies::update).delete(replies::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(cart::show)
            .post(cart::add)
            .put(cart::update)
            .delete(cart::remove),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/reviews", reply_routes())
        .nest("/carts", cart_routes())
        .route(
            "/payment",
            get(payment::show).patch(payment::update_address),
        )
}
