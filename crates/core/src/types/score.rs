//! Review score type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`ReviewScore`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// The score is outside `0..=5`.
    #[error("score must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// Rejected value.
        value: i64,
        /// Lowest accepted score.
        min: u8,
        /// Highest accepted score.
        max: u8,
    },
}

/// A review score between 0 and 5 inclusive.
///
/// ```
/// use threadline_core::ReviewScore;
///
/// assert_eq!(ReviewScore::new(4).unwrap().get(), 4);
/// assert!(ReviewScore::new(6).is_err());
/// assert!(ReviewScore::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ReviewScore(u8);

impl ReviewScore {
    /// Lowest accepted score.
    pub const MIN: u8 = 0;
    /// Highest accepted score.
    pub const MAX: u8 = 5;

    /// Validate a raw score.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::OutOfRange`] unless `0 <= value <= 5`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(ScoreError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// The score as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ReviewScore {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReviewScore> for u8 {
    fn from(score: ReviewScore) -> Self {
        score.0
    }
}

impl fmt::Display for ReviewScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Stored as INTEGER.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ReviewScore {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ReviewScore {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ReviewScore {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i32::from(self.0), buf)
    }
}
