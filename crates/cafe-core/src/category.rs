//! # Category
//!
//! Groups products and supplies their defaults: the SKU prefix every product
//! SKU is shown with, the HSN code products inherit unless they override it,
//! and an optional default unit of measurement.
//!
//! ```text
//! Category "Beverages" (prefix BEV, hsn 220210)
//!    ├── Product sku "COLA330"  → full sku BEVCOLA330, hsn 220210
//!    └── Product sku "TEA"      → full sku BEVTEA,     hsn 090230 (override)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::id::{CategoryId, UnitId};
use crate::validation::{validate_hsn, validate_name, validate_sku_prefix, ValidationResult};

/// A product category.
///
/// `name` and `sku_prefix` are unique across all categories; the database
/// enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Up to 4 characters prepended to every product SKU in this category.
    pub sku_prefix: String,
    /// HSN code inherited by products without an override.
    pub hsn: String,
    pub default_unit_id: Option<UnitId>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Validates input and builds an active category with a fresh id.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::category::Category;
    ///
    /// let category = Category::new("Beverages", "BEV", "220210", None).unwrap();
    /// assert_eq!(category.to_string(), "Beverages");
    ///
    /// assert!(Category::new("Beverages", "BEVERAGE", "220210", None).is_err());
    /// ```
    pub fn new(
        name: &str,
        sku_prefix: &str,
        hsn: &str,
        default_unit_id: Option<UnitId>,
    ) -> ValidationResult<Self> {
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(),
            name: name.trim().to_string(),
            sku_prefix: sku_prefix.trim().to_string(),
            hsn: hsn.trim().to_string(),
            default_unit_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        category.validate()?;
        Ok(category)
    }

    /// Re-checks field rules, used before updates.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_sku_prefix(&self.sku_prefix)?;
        validate_hsn(&self.hsn)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
