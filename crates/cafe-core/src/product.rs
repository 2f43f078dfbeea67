//! # Product
//!
//! The priced, taxable catalog entity and its derived values.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product (stored)                  ProductDetail (read snapshot)        │
//! │  ─────────────────                 ─────────────────────────────        │
//! │  name, sku, price, is_inclusive    product                              │
//! │  category_id ───────────────────►  category                             │
//! │  override_hsn                      interstate_taxes: Vec<Tax>           │
//! │  interstate_tax_ids ────────────►  instate_taxes:    Vec<Tax>           │
//! │  instate_tax_ids ───────────────►                                       │
//! │                                    effective_hsn()   full_sku()         │
//! │                                    total_interstate_tax()               │
//! │                                    total_instate_tax()                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived values are computed on every call from the snapshot; nothing is
//! cached or written back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use ts_rs::TS;

use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use crate::id::{CategoryId, ProductId, TaxId, UnitId};
use crate::money::Price;
use crate::pricing::{compute_tax, TaxMode};
use crate::tax::{total_percentage, Tax, TaxClass};
use crate::validation::{validate_name, validate_override_hsn, validate_sku, ValidationResult};

// =============================================================================
// Product
// =============================================================================

/// A product as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    /// Price with three fractional digits.
    #[ts(type = "string")]
    pub price: Price,
    /// Whether `price` already contains tax.
    pub is_inclusive: bool,
    /// SKU without the category prefix.
    pub sku: String,
    /// HSN code used instead of the category's, when non-empty.
    pub override_hsn: Option<String>,
    pub unit_id: UnitId,
    pub interstate_tax_ids: Vec<TaxId>,
    pub instate_tax_ids: Vec<TaxId>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub price: Price,
    #[serde(default = "default_inclusive")]
    pub is_inclusive: bool,
    pub sku: String,
    #[serde(default)]
    pub override_hsn: Option<String>,
    pub unit_id: UnitId,
    #[serde(default)]
    pub interstate_tax_ids: Vec<TaxId>,
    #[serde(default)]
    pub instate_tax_ids: Vec<TaxId>,
}

fn default_inclusive() -> bool {
    true
}

impl Product {
    /// Validates input and builds an active product with a fresh id.
    ///
    /// Duplicate tax ids within one class collapse to a single link.
    pub fn new(input: NewProduct) -> ValidationResult<Self> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name: input.name.trim().to_string(),
            category_id: input.category_id,
            price: input.price,
            is_inclusive: input.is_inclusive,
            sku: input.sku.trim().to_string(),
            override_hsn: normalize_hsn(input.override_hsn),
            unit_id: input.unit_id,
            interstate_tax_ids: dedup_ids(input.interstate_tax_ids),
            instate_tax_ids: dedup_ids(input.instate_tax_ids),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    /// Re-checks field rules, used before updates.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_sku(&self.sku)?;
        validate_override_hsn(self.override_hsn.as_deref())
    }

    /// HSN code of this product: the override if set and non-empty, else the
    /// category's.
    pub fn effective_hsn(&self, category: &Category) -> String {
        match self.override_hsn.as_deref() {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => category.hsn.clone(),
        }
    }

    /// Category SKU prefix followed by the product's own SKU.
    pub fn full_sku(&self, category: &Category) -> String {
        format!("{}{}", category.sku_prefix, self.sku)
    }

    /// How the price relates to tax.
    #[inline]
    pub fn tax_mode(&self) -> TaxMode {
        TaxMode::from_inclusive(self.is_inclusive)
    }

    /// Tax ids linked for the given class.
    pub fn tax_ids(&self, class: TaxClass) -> &[TaxId] {
        match class {
            TaxClass::Interstate => &self.interstate_tax_ids,
            TaxClass::Instate => &self.instate_tax_ids,
        }
    }

    /// Replaces the tax links of one class.
    pub fn set_tax_ids(&mut self, class: TaxClass, ids: Vec<TaxId>) {
        let ids = dedup_ids(ids);
        match class {
            TaxClass::Interstate => self.interstate_tax_ids = ids,
            TaxClass::Instate => self.instate_tax_ids = ids,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Blank overrides are stored as `None`.
pub fn normalize_hsn(hsn: Option<String>) -> Option<String> {
    hsn.map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
}

fn dedup_ids(ids: Vec<TaxId>) -> Vec<TaxId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// =============================================================================
// Product Detail
// =============================================================================

/// A product together with the category and tax rows it references, read
/// as one consistent snapshot.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    product: Product,
    category: Category,
    interstate_taxes: Vec<Tax>,
    instate_taxes: Vec<Tax>,
}

impl ProductDetail {
    /// Assembles a snapshot, checking that every part belongs to `product`
    /// and that each linked tax id has exactly one row.
    pub fn new(
        product: Product,
        category: Category,
        interstate_taxes: Vec<Tax>,
        instate_taxes: Vec<Tax>,
    ) -> CoreResult<Self> {
        if category.id != product.category_id {
            return Err(CoreError::MismatchedReference {
                entity: "Category".to_string(),
                id: category.id.to_string(),
            });
        }

        for (class, taxes) in [
            (TaxClass::Interstate, &interstate_taxes),
            (TaxClass::Instate, &instate_taxes),
        ] {
            let linked = product.tax_ids(class);
            if let Some(stray) = taxes.iter().find(|tax| !linked.contains(&tax.id)) {
                return Err(CoreError::MismatchedReference {
                    entity: format!("{class} tax"),
                    id: stray.id.to_string(),
                });
            }
            // every linked id needs its row
            if let Some(missing) = linked
                .iter()
                .find(|id| !taxes.iter().any(|tax| &tax.id == *id))
            {
                return Err(CoreError::MissingReference {
                    entity: format!("{class} tax"),
                    id: missing.to_string(),
                });
            }
            if taxes.len() != linked.len() {
                return Err(CoreError::MismatchedReference {
                    entity: format!("{class} tax set"),
                    id: product.id.to_string(),
                });
            }
        }

        Ok(ProductDetail {
            product,
            category,
            interstate_taxes,
            instate_taxes,
        })
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Tax rows of one class.
    pub fn taxes(&self, class: TaxClass) -> &[Tax] {
        match class {
            TaxClass::Interstate => &self.interstate_taxes,
            TaxClass::Instate => &self.instate_taxes,
        }
    }

    /// See [`Product::effective_hsn`].
    pub fn effective_hsn(&self) -> String {
        self.product.effective_hsn(&self.category)
    }

    /// See [`Product::full_sku`].
    pub fn full_sku(&self) -> String {
        self.product.full_sku(&self.category)
    }

    /// Sum of the percentages in one class; zero when the set is empty.
    pub fn total_percentage(&self, class: TaxClass) -> CoreResult<Decimal> {
        total_percentage(self.taxes(class))
    }

    /// Tax amount for one class, rounded to 2 places.
    pub fn total_tax(&self, class: TaxClass) -> CoreResult<Decimal> {
        compute_tax(
            self.product.price,
            self.product.tax_mode(),
            self.total_percentage(class)?,
        )
    }

    /// Tax amount for interstate sales.
    pub fn total_interstate_tax(&self) -> CoreResult<Decimal> {
        self.total_tax(TaxClass::Interstate)
    }

    /// Tax amount for sales within the home state.
    pub fn total_instate_tax(&self) -> CoreResult<Decimal> {
        self.total_tax(TaxClass::Instate)
    }

    /// Builds the read projection served to API clients.
    pub fn to_view(&self) -> CoreResult<ProductView> {
        Ok(ProductView {
            id: self.product.id.clone(),
            name: self.product.name.clone(),
            category_id: self.category.id.clone(),
            category_name: self.category.name.clone(),
            price: self.product.price.amount(),
            is_inclusive: self.product.is_inclusive,
            sku: self.product.sku.clone(),
            full_sku: self.full_sku(),
            hsn: self.effective_hsn(),
            override_hsn: self.product.override_hsn.clone(),
            unit_id: self.product.unit_id.clone(),
            interstate_tax_ids: self.product.interstate_tax_ids.clone(),
            instate_tax_ids: self.product.instate_tax_ids.clone(),
            total_interstate_tax: self.total_interstate_tax()?,
            total_instate_tax: self.total_instate_tax()?,
        })
    }
}

// =============================================================================
// Product View
// =============================================================================

/// Read-only projection of a product with its derived fields.
///
/// ```json
/// {
///   "full_sku": "BEVCOLA330",
///   "hsn": "220210",
///   "price": "100.000",
///   "total_interstate_tax": "15.25",
///   "total_instate_tax": "15.25"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub is_inclusive: bool,
    pub sku: String,
    pub full_sku: String,
    pub hsn: String,
    pub override_hsn: Option<String>,
    pub unit_id: UnitId,
    pub interstate_tax_ids: Vec<TaxId>,
    pub instate_tax_ids: Vec<TaxId>,
    #[ts(type = "string")]
    pub total_interstate_tax: Decimal,
    #[ts(type = "string")]
    pub total_instate_tax: Decimal,
}

// =============================================================================
// Unit Tests
// =============================================================================
