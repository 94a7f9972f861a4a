//! User domain types.

use serde::{Deserialize, Serialize};

use threadline_core::{MembershipId, UserId};

/// A storefront account row.
///
/// Accounts are created by the account service; the storefront reads them to
/// resolve identities and writes only the shipping address.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown on reviews and replies.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Shipping address, if one has been saved.
    pub address: Option<String>,
    /// Membership tier, if any.
    pub membership_id: Option<MembershipId>,
}

/// The authenticated caller of a request.
///
/// Inserted into request extensions by the identity middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's display name.
    pub name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}
