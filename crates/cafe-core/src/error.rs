//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Domain and computation errors                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cafe-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, percentage)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is retried; every error goes back to the caller

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A tax set cannot be applied to a price.
    ///
    /// ## When This Occurs
    /// - Inclusive price whose tax set sums to -100% or less
    ///   (the pre-tax base would need a division by zero or a negative number)
    /// - Arithmetic overflow while summing the set or applying the rate
    ///
    /// ## User Workflow
    /// ```text
    /// Product (inclusive, price 100.000)
    ///      │
    ///      ▼
    /// Interstate taxes: [-60%, -40%] → total -100%
    ///      │
    ///      ▼
    /// InvalidTaxConfiguration { total_percentage: -100, .. }
    ///      │
    ///      ▼
    /// Admin fixes the tax rates, no amount is shown meanwhile
    /// ```
    #[error("Invalid tax configuration (total {total_percentage}%): {reason}")]
    InvalidTaxConfiguration {
        total_percentage: Decimal,
        reason: String,
    },

    /// A derived value was requested with a related entity that does not match.
    ///
    /// ## When This Occurs
    /// - A `ProductDetail` assembled with a category other than the product's
    /// - A tax set containing a tax that is not linked to the product
    #[error("{entity} {id} does not belong to this product")]
    MismatchedReference { entity: String, id: String },

    /// A reference linked to the product was not supplied with it.
    ///
    /// ## When This Occurs
    /// - A `ProductDetail` assembled without the row of a linked tax
    #[error("{entity} {id} is linked to this product but was not loaded")]
    MissingReference { entity: String, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTaxConfiguration error.
    pub fn invalid_tax(total_percentage: Decimal, reason: impl Into<String>) -> Self {
        CoreError::InvalidTaxConfiguration {
            total_percentage,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything touches the database.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Decimal value has more fractional digits than the column allows.
    #[error("{field} allows at most {max_scale} decimal places")]
    TooPrecise { field: String, max_scale: u32 },

    /// Invalid format (e.g., non-digit HSN, SKU with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
