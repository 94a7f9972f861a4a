//! Listing sort order.

use core::fmt;
use core::str::FromStr;

/// Errors that can occur when parsing a [`ProductOrder`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The key is not one of the sortable fields.
    #[error("unknown sort key: {0:?}")]
    Unknown(String),
}

/// A sortable product field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Primary key (insertion order).
    #[default]
    Id,
    /// Listed price.
    Price,
    /// Mean review score, 0 for unreviewed products.
    ScoreAvg,
    /// Product name.
    Name,
}

impl SortKey {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Price => "price",
            Self::ScoreAvg => "score_avg",
            Self::Name => "name",
        }
    }
}

/// Sort key plus direction, written `key` or `-key` for descending.
///
/// ```
/// use threadline_core::{ProductOrder, SortKey};
///
/// let order: ProductOrder = "-price".parse().unwrap();
/// assert_eq!(order.key(), SortKey::Price);
/// assert!(order.is_descending());
///
/// assert!("price; DROP TABLE product".parse::<ProductOrder>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProductOrder {
    key: SortKey,
    descending: bool,
}

impl ProductOrder {
    /// Ascending order on `key`.
    #[must_use]
    pub const fn ascending(key: SortKey) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    /// Descending order on `key`.
    #[must_use]
    pub const fn descending(key: SortKey) -> Self {
        Self {
            key,
            descending: true,
        }
    }

    /// The field being sorted on.
    #[must_use]
    pub const fn key(self) -> SortKey {
        self.key
    }

    /// True for `-key` orders.
    #[must_use]
    pub const fn is_descending(self) -> bool {
        self.descending
    }
}

impl FromStr for ProductOrder {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, name) = s
            .strip_prefix('-')
            .map_or((false, s), |rest| (true, rest));

        let key = match name {
            "id" => SortKey::Id,
            "price" => SortKey::Price,
            "score_avg" => SortKey::ScoreAvg,
            "name" => SortKey::Name,
            _ => return Err(OrderError::Unknown(s.to_owned())),
        };

        Ok(Self { key, descending })
    }
}

impl fmt::Display for ProductOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.key.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_key() {
        for (raw, key, desc) in [
            ("id", SortKey::Id, false),
            ("-id", SortKey::Id, true),
            ("price", SortKey::Price, false),
            ("-price", SortKey::Price, true),
            ("score_avg", SortKey::ScoreAvg, false),
            ("-score_avg", SortKey::ScoreAvg, true),
            ("name", SortKey::Name, false),
            ("-name", SortKey::Name, true),
        ] {
            let order: ProductOrder = raw.parse().unwrap();
            assert_eq!(order.key(), key, "{raw}");
            assert_eq!(order.is_descending(), desc, "{raw}");
            assert_eq!(order.to_string(), raw);
        }
    }

    #[test]
    fn test_rejects_unknown_keys() {
        for raw in ["", "-", "--price", "Price", "description", "price desc"] {
            assert_eq!(
                raw.parse::<ProductOrder>(),
                Err(OrderError::Unknown(raw.to_owned())),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_default_is_id_ascending() {
        let order = ProductOrder::default();
        assert_eq!(order, ProductOrder::ascending(SortKey::Id));
        assert!(!order.is_descending());
    }
}
