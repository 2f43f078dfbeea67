//! # Validation Module
//!
//! Field validation for catalog input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (Rust, before any query)                         │
//! │  ├── Lengths: name ≤ 254, sku ≤ 28, sku_prefix ≤ 4, hsn ≤ 6            │
//! │  └── Formats: HSN digits, SKU characters, decimal scale                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (name, sku, sku_prefix)                        │
//! │  └── Foreign keys, ON DELETE RESTRICT                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::validation::{validate_hsn, validate_sku_prefix};
//!
//! assert!(validate_hsn("210690").is_ok());
//! assert!(validate_sku_prefix("BEVG").is_ok());
//! assert!(validate_sku_prefix("BEVER").is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::{HSN_MAX_LENGTH, NAME_MAX_LENGTH, PERCENTAGE_SCALE, SKU_MAX_LENGTH, SKU_PREFIX_MAX_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a display name (category, product, tax, unit).
///
/// ## Rules
/// - Must not be blank
/// - At most 254 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name)?;
    max_chars(field, name.trim(), NAME_MAX_LENGTH)
}

/// Validates a product SKU (the part after the category prefix).
///
/// ## Rules
/// - Must not be empty
/// - At most 28 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku)?;
    max_chars("sku", sku, SKU_MAX_LENGTH)?;
    sku_charset("sku", sku)
}

/// Validates a category SKU prefix.
///
/// ## Rules
/// - Must not be empty
/// - At most 4 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_sku_prefix(prefix: &str) -> ValidationResult<()> {
    required("sku_prefix", prefix)?;
    max_chars("sku_prefix", prefix, SKU_PREFIX_MAX_LENGTH)?;
    sku_charset("sku_prefix", prefix)
}

fn sku_charset(field: &str, value: &str) -> ValidationResult<()> {
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }
    Ok(())
}

/// Validates an HSN code.
///
/// ## Rules
/// - Must not be empty
/// - At most 6 characters
/// - ASCII digits only
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_hsn;
///
/// assert!(validate_hsn("0901").is_ok());
/// assert!(validate_hsn("21069099").is_err());
/// assert!(validate_hsn("21A690").is_err());
/// ```
pub fn validate_hsn(hsn: &str) -> ValidationResult<()> {
    required("hsn", hsn)?;
    max_chars("hsn", hsn, HSN_MAX_LENGTH)?;

    if !hsn.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "hsn".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional HSN override.
///
/// `None` and blank strings both mean "no override" and are accepted.
pub fn validate_override_hsn(hsn: Option<&str>) -> ValidationResult<()> {
    match hsn {
        Some(code) if !code.trim().is_empty() => validate_hsn(code),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tax percentage.
///
/// ## Rules
/// - At most 3 decimal places
///
/// Negative percentages are accepted (abatements); whether a whole tax set
/// can be applied to a price is decided by the tax computation.
pub fn validate_percentage(percentage: Decimal) -> ValidationResult<()> {
    if percentage.normalize().scale() > PERCENTAGE_SCALE {
        return Err(ValidationError::TooPrecise {
            field: "percentage".to_string(),
            max_scale: PERCENTAGE_SCALE,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(29)).is_err());
        assert!(validate_sku(&"A".repeat(28)).is_ok());
    }

    #[test]
    fn test_validate_sku_prefix() {
        assert!(validate_sku_prefix("BEV").is_ok());
        assert!(validate_sku_prefix("BEVG").is_ok());
        assert!(matches!(
            validate_sku_prefix("BEVGE"),
            Err(ValidationError::TooLong { max: 4, .. })
        ));
        assert!(validate_sku_prefix("").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Cold Coffee").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"x".repeat(255)).is_err());
    }

    #[test]
    fn test_validate_hsn() {
        assert!(validate_hsn("210690").is_ok());
        assert!(validate_hsn("0901").is_ok());
        assert!(validate_hsn("").is_err());
        assert!(validate_hsn("2106901").is_err());
        assert!(validate_hsn("21-690").is_err());
    }

    #[test]
    fn test_validate_override_hsn() {
        assert!(validate_override_hsn(None).is_ok());
        assert!(validate_override_hsn(Some("")).is_ok());
        assert!(validate_override_hsn(Some("220210")).is_ok());
        assert!(validate_override_hsn(Some("abc")).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(dec!(18)).is_ok());
        assert!(validate_percentage(dec!(2.5)).is_ok());
        assert!(validate_percentage(dec!(-5)).is_ok());
        assert!(validate_percentage(dec!(0.125)).is_ok());
        assert!(validate_percentage(dec!(0.1255)).is_err());
    }
}
