//! Threadline Storefront library.
//!
//! This crate provides the storefront JSON API as a library, allowing the
//! router to be built in tests and by the binary alike.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, Request, Response, StatusCode, header},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the storefront router with its full middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_identity,
        ))
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for the configured browser origins. No origins means no
/// cross-origin access.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{CatalogConfig, StorefrontConfig};
    use crate::middleware::REQUEST_ID_HEADER;

    // The pool never connects: every request below is rejected before it
    // reaches the database.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/threadline_unused".to_owned()),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            jwt_secret: SecretString::from("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%".to_owned()),
            catalog: CatalogConfig::default(),
            cors_origins: vec!["https://shop.example".into()],
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/threadline_unused")
            .unwrap();
        app(AppState::new(config, pool))
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(send(get("/health")).await, (StatusCode::OK, "ok".into()));
    }

    #[tokio::test]
    async fn test_non_numeric_page_is_rejected() {
        let (status, body) = send(get("/products?page=two")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_PAGE"}"#);
    }

    #[tokio::test]
    async fn test_oversized_page_is_rejected() {
        let (status, body) = send(get("/products?page_count=500")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_PAGE"}"#);
    }

    #[tokio::test]
    async fn test_unknown_order_is_rejected() {
        let (status, body) = send(get("/products?order=popularity")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_ORDER"}"#);
    }

    #[tokio::test]
    async fn test_mutation_without_token_is_401() {
        let request = Request::builder()
            .method("POST")
            .uri("/carts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"product_id":1,"size_id":1,"color_id":1,"image_id":1}"#,
            ))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"MESSAGE":"LOGIN_REQUIRED"}"#);
    }

    #[tokio::test]
    async fn test_bad_token_is_401() {
        let request = Request::builder()
            .uri("/payment")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_TOKEN"}"#);
    }

    #[tokio::test]
    async fn test_non_numeric_product_id_is_rejected() {
        let (status, body) = send(get("/products/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"MESSAGE":"INVALID_PATH"}"#);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, "edge-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "edge-123");
    }

    #[tokio::test]
    async fn test_cors_preflight_for_configured_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/carts")
                    .header(header::ORIGIN, "https://shop.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example"
        );
    }
}
