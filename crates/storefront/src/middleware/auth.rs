//! Authentication middleware and extractors.
//!
//! [`resolve_identity`] runs once per request. With no `Authorization`
//! header the request continues anonymously; with a header, the token must
//! verify and name an existing user or the request is rejected with 401.
//! Mutation handlers then take [`RequireAuth`] to demand a user.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use crate::error::{AppError, messages, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::IdentityError;
use crate::state::AppState;

/// Middleware that resolves the acting user from the bearer token.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` if a token is present but invalid,
/// expired or names an unknown user.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map(str::to_owned))
        .transpose()
        .map_err(|_| AppError::Unauthenticated(messages::INVALID_TOKEN))?;

    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        let user = state.identity().resolve(state.pool(), &token).await?;

        Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id);

        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Extractor that requires an authenticated user.
///
/// If no valid token was presented, rejects with 401 `LOGIN_REQUIRED`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or_else(|| IdentityError::MissingToken.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::get,
    };
    use threadline_core::UserId;
    use tower::ServiceExt;

    use super::*;

    async fn protected(RequireAuth(user): RequireAuth) -> String {
        user.name
    }

    fn app(user: Option<CurrentUser>) -> Router {
        let router = Router::new().route("/protected", get(protected));
        match user {
            Some(user) => router.layer(axum::Extension(user)),
            None => router,
        }
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            name: "alice".into(),
        }
    }

    #[tokio::test]
    async fn test_require_auth_rejects_anonymous() {
        let (status, body) = get_body(app(None), "/protected").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"MESSAGE":"LOGIN_REQUIRED"}"#);
    }

    #[tokio::test]
    async fn test_require_auth_passes_user() {
        let (status, body) = get_body(app(Some(alice())), "/protected").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }
}
