//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body has the shape `{"MESSAGE": "..."}`. Client errors
//! (unknown rows, bad input) are reported as 400 with a stable message code;
//! server errors are reported as 500 with a generic message and the real
//! error goes to the log and to Sentry.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use threadline_core::{OrderError, PageError, QuantityError, ScoreError};

use crate::db::RepositoryError;
use crate::services::IdentityError;

/// Stable message codes returned in `{"MESSAGE": ...}` bodies.
pub mod messages {
    pub const SUCCESS: &str = "SUCCESS";
    pub const KEY_ERROR: &str = "KEY_ERROR";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const INVALID_QUERY: &str = "INVALID_QUERY";
    pub const INVALID_PATH: &str = "INVALID_PATH";
    pub const INVALID_PAGE: &str = "INVALID_PAGE";
    pub const INVALID_ORDER: &str = "INVALID_ORDER";
    pub const INVALID_SCORE: &str = "INVALID_SCORE";
    pub const INVALID_COUNT: &str = "INVALID_COUNT";
    pub const INVALID_ADDRESS: &str = "INVALID_ADDRESS";
    pub const INVALID_COMMENT: &str = "INVALID_COMMENT";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const LOGIN_REQUIRED: &str = "LOGIN_REQUIRED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

    pub const PRODUCT_NOT_FOUND: &str = "Product does not exist";
    pub const SIZE_NOT_FOUND: &str = "Size does not exist";
    pub const COLOR_NOT_FOUND: &str = "Color does not exist";
    pub const IMAGE_NOT_FOUND: &str = "Image does not exist";
    pub const REVIEW_NOT_FOUND: &str = "Review does not exist";
    pub const REPLY_NOT_FOUND: &str = "Reply does not exist";
    pub const CART_NOT_FOUND: &str = "Cart does not exist";
    pub const USER_NOT_FOUND: &str = "User does not exist";
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No valid identity for an endpoint that needs one.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map `RepositoryError::NotFound` to a client-facing message, passing
    /// every other repository error through.
    ///
    /// ```rust,ignore
    /// carts.delete(user.id, cart_id)
    ///     .await
    ///     .map_err(AppError::or_not_found(messages::CART_NOT_FOUND))?;
    /// ```
    pub fn or_not_found(message: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(message.to_owned()),
            other => Self::Database(other),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound
                | RepositoryError::ForeignKey(_)
                | RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> &str {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => messages::NOT_FOUND,
                RepositoryError::ForeignKey(constraint) => missing_reference(constraint),
                RepositoryError::Conflict(_) => messages::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    messages::INTERNAL_ERROR
                }
            },
            Self::NotFound(msg) | Self::Validation(msg) => msg.as_str(),
            Self::Unauthenticated(msg) => msg,
            Self::Internal(_) => messages::INTERNAL_ERROR,
        }
    }
}

/// Client message for a violated foreign-key constraint.
fn missing_reference(constraint: &str) -> &'static str {
    match constraint {
        "cart_product_fk" | "review_product_fk" => messages::PRODUCT_NOT_FOUND,
        "cart_size_fk" => messages::SIZE_NOT_FOUND,
        "cart_color_fk" => messages::COLOR_NOT_FOUND,
        "cart_thumbnail_fk" => messages::IMAGE_NOT_FOUND,
        "reply_review_fk" => messages::REVIEW_NOT_FOUND,
        "cart_user_fk" | "review_user_fk" | "reply_user_fk" => messages::USER_NOT_FOUND,
        _ => messages::NOT_FOUND,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(json!({ "MESSAGE": self.message() }))).into_response()
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        tracing::debug!(error = %err, "invalid page");
        Self::Validation(messages::INVALID_PAGE.to_owned())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        tracing::debug!(error = %err, "invalid order");
        Self::Validation(messages::INVALID_ORDER.to_owned())
    }
}

impl From<ScoreError> for AppError {
    fn from(_: ScoreError) -> Self {
        Self::Validation(messages::INVALID_SCORE.to_owned())
    }
}

impl From<QuantityError> for AppError {
    fn from(_: QuantityError) -> Self {
        Self::Validation(messages::INVALID_COUNT.to_owned())
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingToken => Self::Unauthenticated(messages::LOGIN_REQUIRED),
            IdentityError::InvalidToken(_) | IdentityError::UnknownUser(_) => {
                Self::Unauthenticated(messages::INVALID_TOKEN)
            }
            IdentityError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that does not fit the target type: a missing
            // or ill-typed field.
            JsonRejection::JsonDataError(_) => Self::Validation(messages::KEY_ERROR.to_owned()),
            _ => Self::Validation(messages::INVALID_JSON.to_owned()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(_: QueryRejection) -> Self {
        Self::Validation(messages::INVALID_QUERY.to_owned())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        Self::Validation(messages::INVALID_PATH.to_owned())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
