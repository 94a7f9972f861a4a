//! Cart route handlers.
//!
//! Every cart endpoint acts on the caller's own cart. Line ids from another
//! user's cart are reported as `Cart does not exist`.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use threadline_core::{CartId, Quantity};

use crate::db::CartRepository;
use crate::error::{AppError, Result, messages};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::{CartLine, NewCartLine};
use crate::state::AppState;

/// Quantity change body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartBody {
    pub cart_id: CartId,
    pub count: i64,
}

/// Line removal body.
#[derive(Debug, Deserialize)]
pub struct RemoveCartBody {
    pub cart_id: CartId,
}

/// Cart contents response.
#[derive(Debug, Serialize)]
pub struct CartList {
    #[serde(rename = "CART_LIST")]
    pub lines: Vec<CartLine>,
}

/// The caller's cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartList>> {
    let lines = CartRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(CartList { lines }))
}

/// Add one unit of a product variant to the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(line): JsonBody<NewCartLine>,
) -> Result<(StatusCode, Json<Value>)> {
    let cart_id = CartRepository::new(state.pool()).add(user.id, line).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "MESSAGE": messages::SUCCESS, "CART_ID": cart_id })),
    ))
}

/// Set the quantity of a cart line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<UpdateCartBody>,
) -> Result<Json<Value>> {
    let quantity = Quantity::new(body.count)?;

    CartRepository::new(state.pool())
        .set_quantity(user.id, body.cart_id, quantity)
        .await
        .map_err(AppError::or_not_found(messages::CART_NOT_FOUND))?;

    Ok(Json(json!({ "MESSAGE": messages::SUCCESS })))
}

/// Remove a line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<RemoveCartBody>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .delete(user.id, body.cart_id)
        .await
        .map_err(AppError::or_not_found(messages::CART_NOT_FOUND))?;

    Ok(StatusCode::NO_CONTENT)
}
