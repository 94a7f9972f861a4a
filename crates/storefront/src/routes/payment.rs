//! Payment page handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::CheckoutRepository;
use crate::error::{AppError, Result, messages};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::PaymentSummary;
use crate::state::AppState;

/// Address change body.
///
/// `address` is optional here so that a missing key is reported as
/// `INVALID_ADDRESS` rather than `KEY_ERROR`.
#[derive(Debug, Default, Deserialize)]
pub struct AddressBody {
    #[serde(default)]
    pub address: Option<String>,
}

impl AddressBody {
    fn address(&self) -> Result<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::Validation(messages::INVALID_ADDRESS.to_owned()))
    }
}

/// Cart, coupons, membership and address for the payment page.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PaymentSummary>> {
    let summary = CheckoutRepository::new(state.pool())
        .summary(user.id)
        .await
        .map_err(AppError::or_not_found(messages::USER_NOT_FOUND))?;

    Ok(Json(summary))
}

/// Set the shipping address.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<AddressBody>,
) -> Result<Json<Value>> {
    CheckoutRepository::new(state.pool())
        .update_address(user.id, body.address()?)
        .await
        .map_err(AppError::or_not_found(messages::USER_NOT_FOUND))?;

    Ok(Json(json!({ "MESSAGE": messages::SUCCESS })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_required() {
        let body: AddressBody = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            body.address(),
            Err(AppError::Validation(ref m)) if m == "INVALID_ADDRESS"
        ));

        let body: AddressBody = serde_json::from_str(r#"{"address": "  "}"#).unwrap();
        assert!(body.address().is_err());

        let body: AddressBody =
            serde_json::from_str(r#"{"address": " 12 Harbour St "}"#).unwrap();
        assert_eq!(body.address().unwrap(), "12 Harbour St");
    }
}
