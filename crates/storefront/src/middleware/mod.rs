//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Identity (resolve the bearer token into a `CurrentUser`)

pub mod auth;
pub mod request_id;

pub use auth::{RequireAuth, resolve_identity};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
