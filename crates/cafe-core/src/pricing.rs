//! # Tax Computation
//!
//! Derives the tax amount carried by (or added to) a product price.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total = Σ percentage over the tax set        (empty set → 0)           │
//! │                                                                         │
//! │  INCLUSIVE (price already contains tax)                                 │
//! │    base = price / (1 + total/100)                                       │
//! │    tax  = price - base                                                  │
//! │    100.000 @ 18% → 100 - 84.7457... = 15.2542... → 15.25                │
//! │                                                                         │
//! │  EXCLUSIVE (tax is added on top)                                        │
//! │    tax  = total × price / 100                                           │
//! │    100.000 @ 18% → 18.00                                                │
//! │                                                                         │
//! │  Result rounded to 2 places, half-to-even                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inclusive prices need `1 + total/100 > 0`. A set summing to -100% or less
//! is rejected with [`CoreError::InvalidTaxConfiguration`]; no amount is
//! produced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{round_money, Price};

/// Whether a price already contains its tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Price + tax shown separately.
    Exclusive,
    /// Price includes tax.
    #[default]
    Inclusive,
}

impl TaxMode {
    /// Maps a product's `is_inclusive` flag to a mode.
    pub const fn from_inclusive(is_inclusive: bool) -> Self {
        if is_inclusive {
            TaxMode::Inclusive
        } else {
            TaxMode::Exclusive
        }
    }
}

/// Computes the tax amount for `price` under `total_percentage`.
///
/// ## Example
/// ```rust
/// use cafe_core::money::Price;
/// use cafe_core::pricing::{compute_tax, TaxMode};
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(100, 0)).unwrap();
/// let rate = Decimal::new(18, 0);
///
/// assert_eq!(compute_tax(price, TaxMode::Inclusive, rate).unwrap().to_string(), "15.25");
/// assert_eq!(compute_tax(price, TaxMode::Exclusive, rate).unwrap().to_string(), "18.00");
/// ```
pub fn compute_tax(price: Price, mode: TaxMode, total_percentage: Decimal) -> CoreResult<Decimal> {
    let amount = price.amount();

    let overflow = || CoreError::invalid_tax(total_percentage, "arithmetic overflow");

    let raw = match mode {
        TaxMode::Inclusive => {
            let divisor = total_percentage
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|rate| Decimal::ONE.checked_add(rate))
                .ok_or_else(overflow)?;

            if divisor <= Decimal::ZERO {
                return Err(CoreError::invalid_tax(
                    total_percentage,
                    "inclusive price needs a total rate above -100%",
                ));
            }

            let base = amount.checked_div(divisor).ok_or_else(overflow)?;
            amount.checked_sub(base).ok_or_else(overflow)?
        }
        TaxMode::Exclusive => total_percentage
            .checked_mul(amount)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?,
    };

    Ok(round_money(raw))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(value: Decimal) -> Price {
        Price::new(value).unwrap()
    }

    #[test]
    fn test_inclusive_backs_out_tax() {
        let tax = compute_tax(price(dec!(100.000)), TaxMode::Inclusive, dec!(18)).unwrap();
        assert_eq!(tax, dec!(15.25));
    }

    #[test]
    fn test_exclusive_adds_tax() {
        let tax = compute_tax(price(dec!(100.000)), TaxMode::Exclusive, dec!(18)).unwrap();
        assert_eq!(tax.to_string(), "18.00");
    }

    #[test]
    fn test_zero_rate_is_zero_tax() {
        for mode in [TaxMode::Inclusive, TaxMode::Exclusive] {
            let tax = compute_tax(price(dec!(250.5)), mode, Decimal::ZERO).unwrap();
            assert_eq!(tax.to_string(), "0.00");
        }
    }

    #[test]
    fn test_minus_hundred_inclusive_is_rejected() {
        let err = compute_tax(price(dec!(100)), TaxMode::Inclusive, dec!(-100)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTaxConfiguration { total_percentage, .. } if total_percentage == dec!(-100)
        ));

        assert!(compute_tax(price(dec!(100)), TaxMode::Inclusive, dec!(-150)).is_err());
    }

    #[test]
    fn test_minus_hundred_exclusive_is_a_full_rebate() {
        let tax = compute_tax(price(dec!(100)), TaxMode::Exclusive, dec!(-100)).unwrap();
        assert_eq!(tax, dec!(-100.00));
    }

    #[test]
    fn test_fractional_rates_round_half_even() {
        // 0.250 × 5% = 0.0125 → 0.01
        let tax = compute_tax(price(dec!(0.250)), TaxMode::Exclusive, dec!(5)).unwrap();
        assert_eq!(tax, dec!(0.01));

        // 10.500 × 5% = 0.525 → 0.52, half-up would give 0.53
        let tax = compute_tax(price(dec!(10.500)), TaxMode::Exclusive, dec!(5)).unwrap();
        assert_eq!(tax, dec!(0.52));
    }

    #[test]
    fn test_inclusive_small_rate() {
        // 59.000 incl. 5%: 59 - 59/1.05 = 59 - 56.190476... = 2.809523... → 2.81
        let tax = compute_tax(price(dec!(59)), TaxMode::Inclusive, dec!(5)).unwrap();
        assert_eq!(tax, dec!(2.81));
    }

    #[test]
    fn test_tax_mode_from_flag() {
        assert_eq!(TaxMode::from_inclusive(true), TaxMode::Inclusive);
        assert_eq!(TaxMode::from_inclusive(false), TaxMode::Exclusive);
        assert_eq!(TaxMode::default(), TaxMode::Inclusive);
    }
}
