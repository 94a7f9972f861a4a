//! Business logic services for storefront.
//!
//! # Services
//!
//! - `identity` - Bearer token verification and user resolution

pub mod identity;

pub use identity::{Claims, IdentityError, IdentityResolver};
