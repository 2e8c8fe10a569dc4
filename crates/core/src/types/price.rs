//! Catalog prices.
//!
//! Prices are whole currency units held as a non-negative integer, so cart
//! totals are exact sums with no rounding.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// A non-negative price in whole currency units.
///
/// ```
/// use ecom_cart_core::Price;
///
/// let total: Price = [Price::new(100), Price::new(200)].into_iter().sum();
/// assert_eq!(total, Price::new(300));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A zero price (total of an empty cart).
    pub const ZERO: Self = Self(0);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the amount in whole currency units.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl TryFrom<i64> for Price {
    type Error = core::num::TryFromIntError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        u64::try_from(amount).map(Self)
    }
}

// Stored as BIGINT; negative values are rejected on decode.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let amount = i64::try_from(self.0)?;
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&amount, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Price = Vec::<Price>::new().into_iter().sum();
        assert_eq!(total, Price::ZERO);
    }

    #[test]
    fn test_sum_by_reference() {
        let prices = [Price::new(100), Price::new(200)];
        assert_eq!(prices.iter().sum::<Price>(), Price::new(300));
    }

    #[test]
    fn test_add_saturates() {
        assert_eq!(Price::new(u64::MAX) + Price::new(1), Price::new(u64::MAX));
    }

    #[test]
    fn test_try_from_negative() {
        assert!(Price::try_from(-1_i64).is_err());
        assert_eq!(Price::try_from(42_i64).unwrap(), Price::new(42));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Price::new(100)).unwrap(), "100");
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }
}
