//! # Tax
//!
//! Named percentage rates (CGST 9%, SGST 9%, IGST 18%, cess, ...).
//!
//! ## Tax Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A product links to taxes through TWO independent sets:                 │
//! │                                                                         │
//! │    interstate: [IGST 18%]            → sold across state lines          │
//! │    instate:    [CGST 9%, SGST 9%]    → sold within the home state       │
//! │                                                                         │
//! │  The same Tax may sit in either set, both, or neither.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::id::TaxId;
use crate::validation::{validate_name, validate_percentage, ValidationResult};

// =============================================================================
// Tax
// =============================================================================

/// A named tax rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tax {
    pub id: TaxId,
    pub name: String,
    /// Rate in percent: `18` means 18%.
    #[ts(type = "string")]
    pub percentage: Decimal,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Tax {
    /// Validates input and builds an active tax with a fresh id.
    pub fn new(name: &str, percentage: Decimal) -> ValidationResult<Self> {
        let now = Utc::now();
        let tax = Tax {
            id: TaxId::new(),
            name: name.trim().to_string(),
            percentage: percentage.normalize(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tax.validate()?;
        Ok(tax)
    }

    /// Re-checks field rules, used before updates.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_percentage(self.percentage)
    }
}

impl fmt::Display for Tax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.percentage)
    }
}

// =============================================================================
// Tax Class
// =============================================================================

/// Which of a product's two tax sets is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxClass {
    /// Sale to a buyer in another state.
    Interstate,
    /// Sale within the seller's home state.
    Instate,
}

impl TaxClass {
    /// Both classes, in display order.
    pub const ALL: [TaxClass; 2] = [TaxClass::Interstate, TaxClass::Instate];

    /// Stable lowercase name, matching the database column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaxClass::Interstate => "interstate",
            TaxClass::Instate => "instate",
        }
    }
}

impl fmt::Display for TaxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Sums the percentages of a tax set.
///
/// An empty set sums to exactly zero; there is no "no data" state that could
/// leak into later arithmetic. A sum that overflows `Decimal` fails with
/// `InvalidTaxConfiguration`.
///
/// ## Example
/// ```rust
/// use cafe_core::tax::{total_percentage, Tax};
/// use rust_decimal::Decimal;
///
/// let cgst = Tax::new("CGST", Decimal::new(9, 0)).unwrap();
/// let sgst = Tax::new("SGST", Decimal::new(9, 0)).unwrap();
///
/// assert_eq!(total_percentage(&[cgst, sgst]).unwrap(), Decimal::new(18, 0));
/// assert_eq!(total_percentage(&Vec::<Tax>::new()).unwrap(), Decimal::ZERO);
/// ```
pub fn total_percentage<'a, I>(taxes: I) -> CoreResult<Decimal>
where
    I: IntoIterator<Item = &'a Tax>,
{
    taxes.into_iter().try_fold(Decimal::ZERO, |sum, tax| {
        sum.checked_add(tax.percentage)
            .ok_or_else(|| CoreError::invalid_tax(sum, "tax percentages overflow when summed"))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_tax() {
        let tax = Tax::new("IGST", dec!(18.00)).unwrap();
        assert_eq!(tax.percentage, dec!(18));
        assert_eq!(tax.to_string(), "IGST (18%)");
        assert!(tax.is_active);
    }

    #[test]
    fn test_tax_validation() {
        assert!(Tax::new("", dec!(5)).is_err());
        assert!(Tax::new("Cess", dec!(0.0001)).is_err());
    }

    #[test]
    fn test_total_percentage_empty_is_zero() {
        let empty: Vec<Tax> = Vec::new();
        assert_eq!(total_percentage(&empty).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_total_percentage_sums_exactly() {
        let taxes = vec![
            Tax::new("CGST", dec!(2.5)).unwrap(),
            Tax::new("SGST", dec!(2.5)).unwrap(),
            Tax::new("Cess", dec!(0.125)).unwrap(),
        ];
        assert_eq!(total_percentage(&taxes).unwrap(), dec!(5.125));
    }

    #[test]
    fn test_total_percentage_overflow_is_invalid_configuration() {
        let taxes = vec![
            Tax::new("Surcharge A", Decimal::MAX).unwrap(),
            Tax::new("Surcharge B", Decimal::MAX).unwrap(),
        ];
        assert!(matches!(
            total_percentage(&taxes),
            Err(CoreError::InvalidTaxConfiguration { .. })
        ));
    }

    #[test]
    fn test_tax_class_names() {
        assert_eq!(TaxClass::Interstate.as_str(), "interstate");
        assert_eq!(TaxClass::Instate.to_string(), "instate");
        assert_eq!(
            serde_json::to_string(&TaxClass::Instate).unwrap(),
            "\"instate\""
        );
    }
}
