//! Cart line quantity.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantity.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// Larger than the column can hold.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// A strictly positive number of units on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] when `value < 1` or it does not fit in an
    /// `INTEGER` column.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge(value))
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_values() {
        assert_eq!(Quantity::new(1).unwrap(), Quantity::ONE);
        assert_eq!(Quantity::new(12).unwrap().get(), 12);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-4), Err(QuantityError::NotPositive(-4)));
    }

    #[test]
    fn test_rejects_overflow() {
        let big = i64::from(i32::MAX) + 1;
        assert_eq!(Quantity::new(big), Err(QuantityError::TooLarge(big)));
    }
}
