//! # Money Module
//!
//! Decimal money handling for catalog prices and derived tax amounts.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    100 / 1.18 = 84.74576271186442  (and the last digit is a guess)     │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal (rust_decimal, 28 significant digits)   │
//! │    Stored prices:  3 fractional digits   → 100.000                     │
//! │    Derived money:  2 fractional digits   → 15.25                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every derived amount goes through [`round_money`], which uses
//! round-half-to-even (bankers rounding): `0.125 → 0.12`, `0.135 → 0.14`.
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::{round_money, Price};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let price = Price::new(Decimal::from_str("99.5").unwrap()).unwrap();
//! assert_eq!(price.to_string(), "99.500");
//!
//! let tax = round_money(Decimal::from_str("0.125").unwrap());
//! assert_eq!(tax.to_string(), "0.12");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Fractional digits stored for a product price.
pub const PRICE_SCALE: u32 = 3;

/// Total digits allowed in a product price (integer + fractional).
pub const PRICE_MAX_DIGITS: u32 = 10;

/// Fractional digits of every derived monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a derived monetary value to [`MONEY_SCALE`] places, half-to-even.
///
/// The result always carries exactly two fractional digits, so `0` renders
/// as `0.00` and `18` as `18.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(MONEY_SCALE);
    rounded
}

// =============================================================================
// Price
// =============================================================================

/// A validated catalog price: non-negative, at most 10 digits, 3 of them
/// fractional.
///
/// ## Where Price is Used
/// ```text
/// Product.price ──┬──► Tax Computation (inclusive / exclusive)
///                 │
///                 └──► ProductView.price ("100.000" in JSON)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Validates `value` and stores it with exactly three fractional digits.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Price;
    /// use rust_decimal::Decimal;
    ///
    /// let price = Price::new(Decimal::new(100, 0)).unwrap();
    /// assert_eq!(price.to_string(), "100.000");
    ///
    /// assert!(Price::new(Decimal::new(-1, 0)).is_err());
    /// assert!(Price::new(Decimal::new(12345, 4)).is_err()); // 1.2345
    /// ```
    pub fn new(value: Decimal) -> ValidationResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::MustBeNonNegative {
                field: "price".to_string(),
            });
        }

        // 100.0000 is fine, 100.0001 is not
        if value.normalize().scale() > PRICE_SCALE {
            return Err(ValidationError::TooPrecise {
                field: "price".to_string(),
                max_scale: PRICE_SCALE,
            });
        }

        let limit = Decimal::from(10_i64.pow(PRICE_MAX_DIGITS - PRICE_SCALE));
        if value >= limit {
            return Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: "0".to_string(),
                max: (limit - Decimal::new(1, PRICE_SCALE)).to_string(),
            });
        }

        let mut stored = value.abs();
        stored.rescale(PRICE_SCALE);
        Ok(Price(stored))
    }

    /// A zero price (free items).
    pub fn zero() -> Self {
        let mut zero = Decimal::ZERO;
        zero.rescale(PRICE_SCALE);
        Price(zero)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_keeps_three_places() {
        assert_eq!(Price::new(dec!(100)).unwrap().to_string(), "100.000");
        assert_eq!(Price::new(dec!(9.5)).unwrap().to_string(), "9.500");
        assert_eq!(Price::new(dec!(1.2340)).unwrap().to_string(), "1.234");
        assert_eq!(Price::zero().to_string(), "0.000");
    }

    #[test]
    fn test_price_rejects_invalid_values() {
        assert!(matches!(
            Price::new(dec!(-0.001)),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
        assert!(matches!(
            Price::new(dec!(1.0005)),
            Err(ValidationError::TooPrecise { .. })
        ));
        assert!(matches!(
            Price::new(dec!(10000000)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(Price::new(dec!(9999999.999)).is_ok());
    }

    #[test]
    fn test_round_money_half_to_even() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
        assert_eq!(round_money(dec!(15.254237)), dec!(15.25));
        assert_eq!(round_money(dec!(-2.675)), dec!(-2.68));
    }

    #[test]
    fn test_round_money_always_two_places() {
        assert_eq!(round_money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round_money(dec!(18.000)).to_string(), "18.00");
    }

    #[test]
    fn test_price_serde_validates() {
        let price: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(price.amount(), dec!(12.500));
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"12.500\"");

        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }
}
