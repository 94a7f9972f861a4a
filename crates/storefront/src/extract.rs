//! Request extractors with storefront-shaped rejections.
//!
//! axum's stock `Json`, `Query` and `Path` reject with plain-text bodies.
//! These wrappers run the same extraction but reject with [`AppError`], so
//! every failure reaches the client as `{"MESSAGE": ...}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
///
/// A body that parses but lacks a field (or has one of the wrong type) is
/// rejected with `KEY_ERROR`; anything else with `INVALID_JSON`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParams<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Deserialize)]
    struct ScoreBody {
        score: i64,
    }

    async fn handler(JsonBody(body): JsonBody<ScoreBody>) -> String {
        body.score.to_string()
    }

    async fn post_json(raw: &'static str) -> (StatusCode, String) {
        let app = Router::new().route("/", post(handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_well_formed_body_is_extracted() {
        let (status, body) = post_json(r#"{"score": 4}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "4");
    }

    #[tokio::test]
    async fn test_missing_field_is_key_error() {
        let (status, body) = post_json(r#"{"description": "great"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"KEY_ERROR"}"#);
    }

    #[tokio::test]
    async fn test_wrong_type_is_key_error() {
        let (status, body) = post_json(r#"{"score": "five"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"KEY_ERROR"}"#);
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_json() {
        let (status, body) = post_json(r#"{"score": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_JSON"}"#);
    }
}
