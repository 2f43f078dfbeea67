//! # Repository Module
//!
//! Database repository implementations for the catalog.
//!
//! ## Repository Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and their tables                        │
//! │                                                                         │
//! │  db.units()      ──► UnitRepository     ──► units_of_measurement       │
//! │  db.categories() ──► CategoryRepository ──► categories                 │
//! │  db.taxes()      ──► TaxRepository      ──► taxes                      │
//! │  db.products()   ──► ProductRepository  ──► products + product_taxes   │
//! │  db.images()     ──► ProductImageRepository ──► product_images         │
//! │                                                                         │
//! │  Deletes check for references first (inside the same transaction)      │
//! │  and fail with DbError::ReferentialIntegrity; nothing cascades from    │
//! │  reference data into products.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UnitRepository`](unit::UnitRepository) - Units of measurement
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`TaxRepository`](tax::TaxRepository) - Tax rates
//! - [`ProductRepository`](product::ProductRepository) - Products, tax links
//!   and tax totals
//! - [`ProductImageRepository`](image::ProductImageRepository) - Product images

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use crate::error::{DbError, DbResult};

pub mod category;
pub mod image;
pub mod product;
pub mod tax;
pub mod unit;

/// Parses a decimal column stored as TEXT.
pub(crate) fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|_| DbError::InvalidData {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Whether a row with `id` exists in `table`.
///
/// `table` is always one of this crate's own table names, never user input.
pub(crate) async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: &str,
) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(found)
}

/// Like [`row_exists`] but fails with `NotFound` naming `entity`.
pub(crate) async fn require_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &str,
    id: &str,
) -> DbResult<()> {
    if row_exists(conn, table, id).await? {
        Ok(())
    } else {
        Err(DbError::not_found(entity, id))
    }
}

/// Counts rows of `table` where `column` equals `id`.
pub(crate) async fn count_references(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    id: &str,
) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1");
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(count)
}
