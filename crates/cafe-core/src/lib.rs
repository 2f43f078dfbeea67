//! # cafe-core: Pure Business Logic for the OfficeCafe Catalog
//!
//! Catalog entities (categories, units, taxes, products) and the pricing
//! rules derived from them, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     OfficeCafe Catalog Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 API layer (list / retrieve)                     │   │
//! │  │          serves ProductView JSON with derived tax totals        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cafe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ category  │  │  product  │  │  pricing  │  │   authz   │  │   │
//! │  │   │   unit    │  │  detail   │  │   money   │  │ business  │  │   │
//! │  │   │    tax    │  │   view    │  │ TaxMode   │  │ Decision  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cafe-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`category`], [`unit`], [`tax`], [`product`], [`image`] - Catalog entities
//! - [`pricing`] - Tax computation for inclusive / exclusive prices
//! - [`money`] - Decimal prices and rounding (no floating point!)
//! - [`business`], [`authz`] - Business ownership and access decisions
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cafe_core::money::Price;
//! use cafe_core::pricing::{compute_tax, TaxMode};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::new(100, 0)).unwrap();
//! let tax = compute_tax(price, TaxMode::Inclusive, Decimal::new(18, 0)).unwrap();
//! assert_eq!(tax.to_string(), "15.25");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod business;
pub mod category;
pub mod error;
pub mod id;
pub mod image;
pub mod money;
pub mod pricing;
pub mod product;
pub mod tax;
pub mod unit;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use category::Category;
pub use error::{CoreError, CoreResult, ValidationError};
pub use id::{BusinessId, CategoryId, ProductId, ProductImageId, TaxId, UnitId, UserId};
pub use image::ProductImage;
pub use money::Price;
pub use pricing::TaxMode;
pub use product::{NewProduct, Product, ProductDetail, ProductView};
pub use tax::{Tax, TaxClass};
pub use unit::UnitOfMeasurement;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of entity names (category, product, tax, unit).
pub const NAME_MAX_LENGTH: usize = 254;

/// Maximum length of a product SKU, excluding the category prefix.
pub const SKU_MAX_LENGTH: usize = 28;

/// Maximum length of a category SKU prefix.
pub const SKU_PREFIX_MAX_LENGTH: usize = 4;

/// Maximum length of an HSN code.
pub const HSN_MAX_LENGTH: usize = 6;

/// Decimal places allowed in a tax percentage.
pub const PERCENTAGE_SCALE: u32 = 3;
