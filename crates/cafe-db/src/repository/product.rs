//! # Product Repository
//!
//! Database operations for products and their tax links.
//!
//! ## Key Operations
//! - CRUD with both tax sets written in the same transaction
//! - Replacing one tax set (`set_tax_rates`)
//! - Snapshot reads for tax totals (`get_detail`, `tax_totals`, `view`)
//!
//! ## Snapshot Reads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How tax_totals() Reads                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    SELECT ... FROM products WHERE id = ?        → Product              │
//! │    SELECT ... FROM categories WHERE id = ?      → Category             │
//! │    SELECT ... product_taxes ⋈ taxes (interstate) → [IGST 18%]          │
//! │    SELECT ... product_taxes ⋈ taxes (instate)    → [CGST 9%, SGST 9%]  │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductDetail (cafe-core) ── compute_tax() ──► TaxTotals              │
//! │                                                                         │
//! │  A concurrent rate change lands either before or after the whole read; │
//! │  the two totals never mix old and new percentages.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use cafe_core::money::Price;
use cafe_core::{
    CategoryId, Product, ProductDetail, ProductId, ProductView, TaxClass, TaxId, UnitId,
};

use super::category::fetch_category;
use super::parse_decimal;
use super::{count_references, require_row};
use super::tax::fetch_tax_set;
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, name, category_id, price, is_inclusive, sku, override_hsn, \
                               unit_id, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category_id: CategoryId,
    price: String,
    is_inclusive: bool,
    sku: String,
    override_hsn: Option<String>,
    unit_id: UnitId,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(
        self,
        interstate_tax_ids: Vec<TaxId>,
        instate_tax_ids: Vec<TaxId>,
    ) -> DbResult<Product> {
        let price = Price::new(parse_decimal("price", &self.price)?)?;
        Ok(Product {
            id: self.id,
            name: self.name,
            category_id: self.category_id,
            price,
            is_inclusive: self.is_inclusive,
            sku: self.sku,
            override_hsn: self.override_hsn,
            unit_id: self.unit_id,
            interstate_tax_ids,
            instate_tax_ids,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Derived tax amounts for one product, both classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTotals {
    pub interstate: Decimal,
    pub instate: Decimal,
}

impl TaxTotals {
    /// Amount for one class.
    pub fn get(&self, class: TaxClass) -> Decimal {
        match class {
            TaxClass::Interstate => self.interstate,
            TaxClass::Instate => self.instate,
        }
    }
}

// =============================================================================
// Connection-level helpers (shared by reads and writes in one transaction)
// =============================================================================

async fn fetch_tax_ids(
    conn: &mut SqliteConnection,
    product_id: &ProductId,
    class: TaxClass,
) -> DbResult<Vec<TaxId>> {
    let ids = sqlx::query_scalar::<_, TaxId>(
        r#"
        SELECT tax_id FROM product_taxes
        WHERE product_id = ?1 AND tax_class = ?2
        ORDER BY position
        "#,
    )
    .bind(product_id)
    .bind(class)
    .fetch_all(conn)
    .await?;

    Ok(ids)
}

async fn hydrate(conn: &mut SqliteConnection, row: ProductRow) -> DbResult<Product> {
    let interstate = fetch_tax_ids(conn, &row.id, TaxClass::Interstate).await?;
    let instate = fetch_tax_ids(conn, &row.id, TaxClass::Instate).await?;
    row.into_product(interstate, instate)
}

async fn fetch_product(conn: &mut SqliteConnection, id: &ProductId) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Some(hydrate(conn, row).await?)),
        None => Ok(None),
    }
}

/// Checks that the category, unit and every linked tax exist.
async fn check_references(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    require_row(conn, "categories", "Category", product.category_id.as_str()).await?;
    require_row(conn, "units_of_measurement", "UnitOfMeasurement", product.unit_id.as_str())
        .await?;

    for class in TaxClass::ALL {
        for tax_id in product.tax_ids(class) {
            require_row(conn, "taxes", "Tax", tax_id.as_str()).await?;
        }
    }
    Ok(())
}

/// Replaces the links of one class with `tax_ids`, keeping their order.
async fn write_tax_links(
    conn: &mut SqliteConnection,
    product_id: &ProductId,
    class: TaxClass,
    tax_ids: &[TaxId],
) -> DbResult<()> {
    sqlx::query("DELETE FROM product_taxes WHERE product_id = ?1 AND tax_class = ?2")
        .bind(product_id)
        .bind(class)
        .execute(&mut *conn)
        .await?;

    for (position, tax_id) in tax_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO product_taxes (product_id, tax_id, tax_class, position)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product_id)
        .bind(tax_id)
        .bind(class)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn unique_error(err: sqlx::Error, product: &Product) -> DbError {
    DbError::from(err).with_unique_values(&[
        ("name", product.name.as_str()),
        ("sku", product.sku.as_str()),
    ])
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Create with both tax sets in one go
/// let product = Product::new(NewProduct { .. })?;
/// repo.insert(&product).await?;
///
/// // Derived tax amounts from one consistent read
/// let totals = repo.tax_totals(&product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product together with its interstate and instate tax
    /// links.
    ///
    /// Either the product and all its links are written, or nothing is.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::NotFound)` - Category, unit or a linked tax doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Name or SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, name = %product.name, "Inserting product");
        product.validate()?;

        let mut tx = self.pool.begin().await?;

        check_references(&mut tx, product).await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id, price, is_inclusive, sku,
                override_hsn, unit_id, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price.to_string())
        .bind(product.is_inclusive)
        .bind(&product.sku)
        .bind(&product.override_hsn)
        .bind(&product.unit_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_error(e, product))?;

        for class in TaxClass::ALL {
            write_tax_links(&mut tx, &product.id, class, product.tax_ids(class)).await?;
        }

        tx.commit().await?;
        Ok(product.clone())
    }

    /// Gets a product by its ID, with both tax id sets.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &ProductId) -> DbResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;
        let product = fetch_product(&mut tx, id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Gets a product by its SKU (without category prefix).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku.trim())
            .fetch_optional(&mut *tx)
            .await?;

        let product = match row {
            Some(row) => Some(hydrate(&mut tx, row).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(&mut *tx)
            .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(hydrate(&mut tx, row).await?);
        }

        tx.commit().await?;
        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Updates an existing product, replacing both tax sets.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product, category, unit or a tax doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Name or SKU taken
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");
        product.validate()?;

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "products", "Product", product.id.as_str()).await?;
        check_references(&mut tx, product).await?;

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                price = ?4,
                is_inclusive = ?5,
                sku = ?6,
                override_hsn = ?7,
                unit_id = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price.to_string())
        .bind(product.is_inclusive)
        .bind(&product.sku)
        .bind(&product.override_hsn)
        .bind(&product.unit_id)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_error(e, product))?;

        for class in TaxClass::ALL {
            write_tax_links(&mut tx, &product.id, class, product.tax_ids(class)).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replaces the tax set of one class. Duplicate ids collapse to one link.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Move a product from 18% to 12% IGST
    /// repo.set_tax_rates(&product.id, TaxClass::Interstate, &[igst_12.id]).await?;
    /// ```
    pub async fn set_tax_rates(
        &self,
        id: &ProductId,
        class: TaxClass,
        tax_ids: &[TaxId],
    ) -> DbResult<()> {
        debug!(id = %id, class = %class, count = tax_ids.len(), "Setting tax rates");

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.as_str()))?;
        product.set_tax_ids(class, tax_ids.to_vec());

        for tax_id in product.tax_ids(class) {
            require_row(&mut tx, "taxes", "Tax", tax_id.as_str()).await?;
        }

        write_tax_links(&mut tx, id, class, product.tax_ids(class)).await?;

        sqlx::query("UPDATE products SET updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Billing history keeps referring to the product; only listings hide it.
    pub async fn deactivate(&self, id: &ProductId) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.as_str()));
        }

        Ok(())
    }

    /// Permanently deletes a product. Its tax links go with it; the taxes
    /// themselves stay.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ReferentialIntegrity)` - The product still has images
    pub async fn delete(&self, id: &ProductId) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "products", "Product", id.as_str()).await?;

        let images = count_references(&mut tx, "product_images", "product_id", id.as_str()).await?;
        if images > 0 {
            warn!(id = %id, images, "Refusing to delete product with images");
            return Err(DbError::still_referenced(
                "Product",
                id.as_str(),
                format!("{images} image(s)"),
            ));
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Counts all products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Reads a product, its category and both tax sets in one transaction.
    ///
    /// ## Returns
    /// * `Ok(ProductDetail)` - Consistent snapshot
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn get_detail(&self, id: &ProductId) -> DbResult<ProductDetail> {
        debug!(id = %id, "Loading product detail");

        let mut tx = self.pool.begin().await?;

        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.as_str()))?;
        let category = fetch_category(&mut tx, &product.category_id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", product.category_id.as_str()))?;
        let interstate = fetch_tax_set(&mut tx, id, TaxClass::Interstate).await?;
        let instate = fetch_tax_set(&mut tx, id, TaxClass::Instate).await?;

        tx.commit().await?;

        Ok(ProductDetail::new(product, category, interstate, instate)?)
    }

    /// Computes the interstate and instate tax amounts of a product.
    ///
    /// ## Returns
    /// * `Ok(TaxTotals)` - Both amounts, rounded to 2 places
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::Core(InvalidTaxConfiguration))` - Rates make the
    ///   inclusive formula undefined; no partial totals are returned
    pub async fn tax_totals(&self, id: &ProductId) -> DbResult<TaxTotals> {
        let detail = self.get_detail(id).await?;

        let totals = detail
            .total_interstate_tax()
            .and_then(|interstate| {
                Ok(TaxTotals {
                    interstate,
                    instate: detail.total_instate_tax()?,
                })
            })
            .map_err(|e| {
                warn!(id = %id, error = %e, "Tax computation failed");
                e
            })?;

        debug!(
            id = %id,
            interstate = %totals.interstate,
            instate = %totals.instate,
            "Computed tax totals"
        );
        Ok(totals)
    }

    /// Builds the API read projection for a product.
    pub async fn view(&self, id: &ProductId) -> DbResult<ProductView> {
        let detail = self.get_detail(id).await?;
        Ok(detail.to_view()?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cafe_core::{Category, CoreError, NewProduct, ProductImage, Tax, UnitOfMeasurement};
    use rust_decimal_macros::dec;

    struct Fixture {
        db: Database,
        category: Category,
        unit: UnitOfMeasurement,
        igst: Tax,
        cgst: Tax,
        sgst: Tax,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let unit = db.units().insert(&UnitOfMeasurement::new("Cup", "cup").unwrap()).await.unwrap();
        let category = db
            .categories()
            .insert(&Category::new("Beverages", "BEV", "220210", Some(unit.id.clone())).unwrap())
            .await
            .unwrap();
        let igst = db.taxes().insert(&Tax::new("IGST", dec!(18)).unwrap()).await.unwrap();
        let cgst = db.taxes().insert(&Tax::new("CGST", dec!(9)).unwrap()).await.unwrap();
        let sgst = db.taxes().insert(&Tax::new("SGST", dec!(9)).unwrap()).await.unwrap();

        Fixture {
            db,
            category,
            unit,
            igst,
            cgst,
            sgst,
        }
    }

    impl Fixture {
        fn new_product(&self, name: &str, sku: &str, inclusive: bool) -> Product {
            Product::new(NewProduct {
                name: name.to_string(),
                category_id: self.category.id.clone(),
                price: Price::new(dec!(100)).unwrap(),
                is_inclusive: inclusive,
                sku: sku.to_string(),
                override_hsn: None,
                unit_id: self.unit.id.clone(),
                interstate_tax_ids: vec![self.igst.id.clone()],
                instate_tax_ids: vec![self.cgst.id.clone(), self.sgst.id.clone()],
            })
            .unwrap()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();

        let stored = fx.db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.price.to_string(), "100.000");
        assert_eq!(stored.interstate_tax_ids, vec![fx.igst.id.clone()]);
        assert_eq!(stored.instate_tax_ids, vec![fx.cgst.id.clone(), fx.sgst.id.clone()]);
        assert!(stored.is_inclusive);

        let by_sku = fx.db.products().get_by_sku("CHAI").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);
        assert_eq!(fx.db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_inclusive_totals() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();

        let totals = fx.db.products().tax_totals(&product.id).await.unwrap();
        assert_eq!(totals.interstate.to_string(), "15.25");
        assert_eq!(totals.instate.to_string(), "15.25");
    }

    #[tokio::test]
    async fn test_exclusive_totals() {
        let fx = fixture().await;
        let product = fx.new_product("Cold Coffee", "CCOF", false);
        fx.db.products().insert(&product).await.unwrap();

        let totals = fx.db.products().tax_totals(&product.id).await.unwrap();
        assert_eq!(totals.interstate.to_string(), "18.00");
        assert_eq!(totals.get(TaxClass::Instate).to_string(), "18.00");
    }

    #[tokio::test]
    async fn test_empty_tax_set_is_zero() {
        let fx = fixture().await;
        let mut product = fx.new_product("Water", "WATR", true);
        product.set_tax_ids(TaxClass::Interstate, Vec::new());
        fx.db.products().insert(&product).await.unwrap();

        let totals = fx.db.products().tax_totals(&product.id).await.unwrap();
        assert_eq!(totals.interstate.to_string(), "0.00");
        assert_eq!(totals.instate.to_string(), "15.25");
    }

    #[tokio::test]
    async fn test_minus_hundred_percent_inclusive_fails() {
        let fx = fixture().await;
        let rebate = fx.db.taxes().insert(&Tax::new("Rebate", dec!(-100)).unwrap()).await.unwrap();

        let mut product = fx.new_product("Free Sample", "FREE", true);
        product.set_tax_ids(TaxClass::Interstate, vec![rebate.id.clone()]);
        fx.db.products().insert(&product).await.unwrap();

        let err = fx.db.products().tax_totals(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidTaxConfiguration { .. })));

        let err = fx.db.products().view(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidTaxConfiguration { .. })));
    }

    #[tokio::test]
    async fn test_tax_rate_change_is_reflected() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", false);
        fx.db.products().insert(&product).await.unwrap();
        assert_eq!(
            fx.db.products().tax_totals(&product.id).await.unwrap().interstate,
            dec!(18.00)
        );

        let mut igst = fx.igst.clone();
        igst.percentage = dec!(12);
        fx.db.taxes().update(&igst).await.unwrap();

        let totals = fx.db.products().tax_totals(&product.id).await.unwrap();
        assert_eq!(totals.interstate.to_string(), "12.00");
        assert_eq!(totals.instate.to_string(), "18.00");
    }

    #[tokio::test]
    async fn test_delete_linked_tax_rejected() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();

        let err = fx.db.taxes().delete(&fx.sgst.id).await.unwrap_err();
        assert!(matches!(
            &err,
            DbError::ReferentialIntegrity { entity, referenced_by, .. }
                if entity == "Tax" && referenced_by == "1 product(s)"
        ));
        assert!(fx.db.taxes().get_by_id(&fx.sgst.id).await.unwrap().is_some());

        fx.db
            .products()
            .set_tax_rates(&product.id, TaxClass::Instate, &[fx.cgst.id.clone()])
            .await
            .unwrap();
        fx.db.taxes().delete(&fx.sgst.id).await.unwrap();

        let totals = fx.db.products().tax_totals(&product.id).await.unwrap();
        assert_eq!(totals.instate.to_string(), "8.26");
    }

    #[tokio::test]
    async fn test_set_tax_rates_dedups_and_checks() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", false);
        fx.db.products().insert(&product).await.unwrap();

        fx.db
            .products()
            .set_tax_rates(
                &product.id,
                TaxClass::Interstate,
                &[fx.cgst.id.clone(), fx.cgst.id.clone(), fx.sgst.id.clone()],
            )
            .await
            .unwrap();
        let stored = fx.db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.interstate_tax_ids, vec![fx.cgst.id.clone(), fx.sgst.id.clone()]);

        let err = fx
            .db
            .products()
            .set_tax_rates(&product.id, TaxClass::Interstate, &[TaxId::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "Tax"));

        // Failed call leaves the previous links
        let stored = fx.db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.interstate_tax_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_sku_and_name() {
        let fx = fixture().await;
        fx.db.products().insert(&fx.new_product("Masala Chai", "CHAI", true)).await.unwrap();

        let err = fx
            .db
            .products()
            .insert(&fx.new_product("Ginger Chai", "CHAI", true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, value } if field == "sku" && value == "CHAI"));

        let err = fx
            .db
            .products()
            .insert(&fx.new_product("Masala Chai", "MCHA", true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "name"));

        assert_eq!(fx.db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_with_unknown_references() {
        let fx = fixture().await;

        let mut product = fx.new_product("Masala Chai", "CHAI", true);
        product.category_id = CategoryId::new();
        let err = fx.db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "Category"));

        let mut product = fx.new_product("Masala Chai", "CHAI", true);
        product.set_tax_ids(TaxClass::Instate, vec![TaxId::new()]);
        let err = fx.db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "Tax"));

        assert_eq!(fx.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let fx = fixture().await;
        let id = ProductId::new();

        assert!(fx.db.products().get_by_id(&id).await.unwrap().is_none());
        assert!(matches!(
            fx.db.products().get_detail(&id).await.unwrap_err(),
            DbError::NotFound { entity, .. } if entity == "Product"
        ));
        assert!(matches!(
            fx.db.products().tax_totals(&id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(fx.db.products().delete(&id).await.unwrap_err(), DbError::NotFound { .. }));
        assert!(matches!(
            fx.db.products().deactivate(&id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_view_derived_fields() {
        let fx = fixture().await;
        let mut product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();

        let view = fx.db.products().view(&product.id).await.unwrap();
        assert_eq!(view.full_sku, "BEVCHAI");
        assert_eq!(view.hsn, "220210");
        assert_eq!(view.category_name, "Beverages");
        assert_eq!(view.total_interstate_tax.to_string(), "15.25");

        product.override_hsn = Some("0902".to_string());
        fx.db.products().update(&product).await.unwrap();
        let view = fx.db.products().view(&product.id).await.unwrap();
        assert_eq!(view.hsn, "0902");
    }

    #[tokio::test]
    async fn test_update_replaces_tax_sets() {
        let fx = fixture().await;
        let mut product = fx.new_product("Masala Chai", "CHAI", false);
        fx.db.products().insert(&product).await.unwrap();

        product.price = Price::new(dec!(50)).unwrap();
        product.set_tax_ids(TaxClass::Instate, Vec::new());
        fx.db.products().update(&product).await.unwrap();

        let detail = fx.db.products().get_detail(&product.id).await.unwrap();
        assert!(detail.taxes(TaxClass::Instate).is_empty());
        assert_eq!(detail.taxes(TaxClass::Interstate).len(), 1);
        assert_eq!(detail.total_interstate_tax().unwrap().to_string(), "9.00");
    }

    #[tokio::test]
    async fn test_deactivate_and_list() {
        let fx = fixture().await;
        let chai = fx.new_product("Masala Chai", "CHAI", true);
        let coffee = fx.new_product("Filter Coffee", "FCOF", true);
        fx.db.products().insert(&chai).await.unwrap();
        fx.db.products().insert(&coffee).await.unwrap();

        let names: Vec<String> = fx
            .db
            .products()
            .list_active(10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Filter Coffee", "Masala Chai"]);

        fx.db.products().deactivate(&coffee.id).await.unwrap();
        let active = fx.db.products().list_active(10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].instate_tax_ids.len(), 2);
        assert_eq!(fx.db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_product_releases_references() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();

        let err = fx.db.categories().delete(&fx.category.id).await.unwrap_err();
        assert!(matches!(err, DbError::ReferentialIntegrity { .. }));

        fx.db.products().delete(&product.id).await.unwrap();
        fx.db.taxes().delete(&fx.igst.id).await.unwrap();
        fx.db.categories().delete(&fx.category.id).await.unwrap();
        fx.db.units().delete(&fx.unit.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rejected_while_images_exist() {
        let fx = fixture().await;
        let product = fx.new_product("Masala Chai", "CHAI", true);
        fx.db.products().insert(&product).await.unwrap();
        let front = ProductImage::new(product.id.clone(), "Front", "products/chai/front.jpg").unwrap();
        fx.db.images().insert(&front).await.unwrap();

        let err = fx.db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::ReferentialIntegrity { ref entity, ref referenced_by, .. }
                if entity == "Product" && referenced_by == "1 image(s)"
        ));
        assert!(fx.db.products().get_by_id(&product.id).await.unwrap().is_some());

        fx.db.images().delete(&front.id).await.unwrap();
        fx.db.products().delete(&product.id).await.unwrap();
        assert!(fx.db.products().get_by_id(&product.id).await.unwrap().is_none());

        let err = fx.db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
