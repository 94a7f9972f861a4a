//! Newtype IDs for type-safe entity references.
//!
//! Every table in the storefront schema uses an `INTEGER` identity key. The
//! `define_id!` macro wraps those keys so a `SizeId` can never be passed where
//! a `ColorId` is expected.

/// Define a type-safe wrapper around an `i32` primary key.
///
/// The generated type is `Copy`, orders and hashes like the raw key,
/// serializes transparently, and (with the `postgres` feature) binds and
/// decodes as a Postgres `INTEGER`.
///
/// # Example
///
/// ```rust
/// # use threadline_core::define_id;
/// define_id!(WishlistId);
///
/// let id = WishlistId::new(7);
/// assert_eq!(id.as_i32(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Catalog
define_id!(MenuId);
define_id!(MainCategoryId);
define_id!(SubCategoryId);
define_id!(ProductId);
define_id!(SizeId);
define_id!(ColorId);
define_id!(ImageId);
define_id!(HashtagId);

// Community
define_id!(ReviewId);
define_id!(ReplyId);

// Accounts and checkout
define_id!(UserId);
define_id!(CartId);
define_id!(CouponId);
define_id!(MembershipId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_transparently() {
        let id = ProductId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_conversions() {
        let id: CartId = 9.into();
        assert_eq!(i32::from(id), 9);
        assert_eq!(id.to_string(), "9");
    }

    #[test]
    fn test_ordering_follows_raw_key() {
        assert!(ReviewId::new(1) < ReviewId::new(2));
    }
}
