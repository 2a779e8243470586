//! Euro prices backed by decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)` and rendered the French way,
//! e.g. `899.99 €`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input does not fit `NUMERIC(10, 2)`.
    #[error("price must be below {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// Exclusive upper bound of a `NUMERIC(10, 2)` column.
const COLUMN_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// An amount in euros, always held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount, rounding half-up to cents.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Parse a price typed into a form.
    ///
    /// Accepts a comma as decimal separator (`"12,5"`) since that is how
    /// French keyboards enter it.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the input is not a non-negative number that fits
    /// eight integer digits.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let normalized = input.trim().replace(',', ".");
        let amount: Decimal = normalized.parse().map_err(|_| PriceError::NotANumber)?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        // Bound the stored value: rounding can carry into a ninth digit
        let price = Self::new(amount);
        if !price.fits_column() {
            return Err(PriceError::TooLarge { max: COLUMN_LIMIT });
        }

        Ok(price)
    }

    /// Whether the amount can be written to a `NUMERIC(10, 2)` column.
    #[must_use]
    pub fn fits_column(&self) -> bool {
        self.0 < COLUMN_LIMIT
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `"12.50 €"`.
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} €", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Price::new(Decimal::new(125, 1)).display(), "12.50 €");
        assert_eq!(Price::new(Decimal::new(89999, 2)).display(), "899.99 €");
        assert_eq!(Price::ZERO.display(), "0.00 €");
    }

    #[test]
    fn test_new_rounds_to_cents() {
        assert_eq!(Price::new(Decimal::new(19_995, 3)).amount(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_parse_accepts_comma() {
        assert_eq!(Price::parse("12,5").unwrap().display(), "12.50 €");
        assert_eq!(Price::parse(" 7 ").unwrap().display(), "7.00 €");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert!(matches!(
            Price::parse("100000000"),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_parse_bounds_the_rounded_amount() {
        assert!(matches!(
            Price::parse("99999999.995"),
            Err(PriceError::TooLarge { .. })
        ));
        assert_eq!(
            Price::parse("99999999.994").unwrap().amount(),
            Decimal::new(9_999_999_999, 2)
        );
        assert!(Price::parse("99999999.99").unwrap().fits_column());
    }

    #[test]
    fn test_large_line_total_does_not_fit() {
        let unit = Price::parse("899.99").unwrap();
        assert!((unit * 111_112).fits_column());
        assert!(!(unit * 111_113).fits_column());
    }

    #[test]
    fn test_line_totals_sum() {
        let unit = Price::parse("19.99").unwrap();
        let total: Price = [unit * 2, Price::parse("5").unwrap() * 3].into_iter().sum();
        assert_eq!(total.display(), "54.98 €");
    }
}
