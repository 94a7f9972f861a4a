//! Development access tokens.
//!
//! Production tokens are issued by the account service. This command signs
//! one with the same `STOREFRONT_JWT_SECRET` so the API can be exercised
//! locally.

use chrono::Duration;

use threadline_core::UserId;
use threadline_storefront::services::IdentityResolver;

use super::{CliError, secret_env};

/// Print a signed token for `user_id`.
///
/// # Errors
///
/// Returns an error if the secret is missing or the lifetime is not a
/// positive number of minutes.
pub fn issue(user_id: i32, ttl_minutes: i64) -> Result<(), CliError> {
    let ttl = Duration::try_minutes(ttl_minutes)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| {
            CliError::InvalidArgument(format!("ttl-minutes out of range (got {ttl_minutes})"))
        })?;

    let secret = secret_env("STOREFRONT_JWT_SECRET")?;
    let token = IdentityResolver::new(&secret)
        .issue(UserId::new(user_id), ttl)?;

    tracing::info!(user_id, ttl_minutes, "token issued");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
