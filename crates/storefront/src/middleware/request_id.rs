//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is reused when it looks like an identifier
//! (at most 128 visible ASCII characters); otherwise a UUID v4 is generated.
//! The ID is recorded in the request span, tagged on the Sentry scope and
//! echoed in the response headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn incoming_request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn response_id(incoming: Option<&str>) -> String {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(id) = incoming {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn test_upstream_id_is_echoed() {
        assert_eq!(response_id(Some("cf-8a1b2c")).await, "cf-8a1b2c");
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let id = response_id(None).await;
        assert!(Uuid::parse_str(&id).is_ok(), "{id}");
    }

    #[tokio::test]
    async fn test_unusable_id_is_replaced() {
        let too_long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        let id = response_id(Some(too_long.as_str())).await;
        assert!(Uuid::parse_str(&id).is_ok());

        let id = response_id(Some("has space")).await;
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
