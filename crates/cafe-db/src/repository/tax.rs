//! # Tax Repository
//!
//! Database operations for tax rates.
//!
//! ## Rate Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Products store links to taxes, never copies of their percentages.     │
//! │                                                                         │
//! │  UPDATE taxes SET percentage = '12' WHERE name = 'IGST'                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Next tax_totals() on every linked product uses 12%.                   │
//! │                                                                         │
//! │  Deleting a linked tax is refused (ReferentialIntegrity).              │
//! │  Deactivating it keeps the links and the history intact.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use cafe_core::{ProductId, Tax, TaxClass, TaxId};

use super::{parse_decimal, require_row};
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct TaxRow {
    id: TaxId,
    name: String,
    percentage: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaxRow {
    fn into_tax(self) -> DbResult<Tax> {
        Ok(Tax {
            percentage: parse_decimal("percentage", &self.percentage)?,
            id: self.id,
            name: self.name,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Loads the taxes linked to a product for one class, in link order.
pub(crate) async fn fetch_tax_set(
    conn: &mut SqliteConnection,
    product_id: &ProductId,
    class: TaxClass,
) -> DbResult<Vec<Tax>> {
    let rows = sqlx::query_as::<_, TaxRow>(
        r#"
        SELECT t.id, t.name, t.percentage, t.is_active, t.created_at, t.updated_at
        FROM product_taxes pt
        INNER JOIN taxes t ON t.id = pt.tax_id
        WHERE pt.product_id = ?1 AND pt.tax_class = ?2
        ORDER BY pt.position
        "#,
    )
    .bind(product_id)
    .bind(class)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(TaxRow::into_tax).collect()
}

/// Repository for tax database operations.
#[derive(Debug, Clone)]
pub struct TaxRepository {
    pool: SqlitePool,
}

impl TaxRepository {
    /// Creates a new TaxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxRepository { pool }
    }

    /// Inserts a new tax.
    ///
    /// ## Returns
    /// * `Ok(Tax)` - Inserted tax
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, tax: &Tax) -> DbResult<Tax> {
        debug!(name = %tax.name, percentage = %tax.percentage, "Inserting tax");
        tax.validate()?;

        sqlx::query(
            r#"
            INSERT INTO taxes (id, name, percentage, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&tax.id)
        .bind(&tax.name)
        .bind(tax.percentage.normalize().to_string())
        .bind(tax.is_active)
        .bind(tax.created_at)
        .bind(tax.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_unique_values(&[("name", tax.name.as_str())]))?;

        Ok(tax.clone())
    }

    /// Gets a tax by its ID.
    pub async fn get_by_id(&self, id: &TaxId) -> DbResult<Option<Tax>> {
        let row = sqlx::query_as::<_, TaxRow>(
            r#"
            SELECT id, name, percentage, is_active, created_at, updated_at
            FROM taxes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaxRow::into_tax).transpose()
    }

    /// Lists active taxes sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Tax>> {
        let rows = sqlx::query_as::<_, TaxRow>(
            r#"
            SELECT id, name, percentage, is_active, created_at, updated_at
            FROM taxes
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaxRow::into_tax).collect()
    }

    /// Updates name, percentage and active flag.
    ///
    /// Every later tax computation on linked products sees the new rate.
    pub async fn update(&self, tax: &Tax) -> DbResult<()> {
        debug!(id = %tax.id, percentage = %tax.percentage, "Updating tax");
        tax.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE taxes SET
                name = ?2,
                percentage = ?3,
                is_active = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&tax.id)
        .bind(&tax.name)
        .bind(tax.percentage.normalize().to_string())
        .bind(tax.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_unique_values(&[("name", tax.name.as_str())]))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax", tax.id.as_str()));
        }

        Ok(())
    }

    /// Soft-deletes a tax by setting is_active = false.
    ///
    /// Existing product links are kept and still count towards totals.
    pub async fn deactivate(&self, id: &TaxId) -> DbResult<()> {
        debug!(id = %id, "Deactivating tax");

        let result = sqlx::query("UPDATE taxes SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax", id.as_str()));
        }

        Ok(())
    }

    /// Permanently deletes a tax no product links to.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Tax doesn't exist
    /// * `Err(DbError::ReferentialIntegrity)` - Some product's interstate or
    ///   instate set still contains it
    pub async fn delete(&self, id: &TaxId) -> DbResult<()> {
        debug!(id = %id, "Deleting tax");

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "taxes", "Tax", id.as_str()).await?;

        let products: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT product_id) FROM product_taxes WHERE tax_id = ?1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if products > 0 {
            warn!(id = %id, products, "Refusing to delete tax linked to products");
            return Err(DbError::still_referenced(
                "Tax",
                id.as_str(),
                format!("{products} product(s)"),
            ));
        }

        sqlx::query("DELETE FROM taxes WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_precision() {
        let db = test_db().await;
        let cess = Tax::new("Cess", dec!(1.125)).unwrap();
        db.taxes().insert(&cess).await.unwrap();

        let stored = db.taxes().get_by_id(&cess.id).await.unwrap().unwrap();
        assert_eq!(stored.percentage, dec!(1.125));
        assert_eq!(stored.name, "Cess");
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = test_db().await;
        db.taxes().insert(&Tax::new("IGST", dec!(18)).unwrap()).await.unwrap();

        let err = db.taxes().insert(&Tax::new("IGST", dec!(12)).unwrap()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, value } if field == "name" && value == "IGST"));
    }

    #[tokio::test]
    async fn test_update_deactivate_list() {
        let db = test_db().await;
        let mut igst = Tax::new("IGST", dec!(18)).unwrap();
        let cgst = Tax::new("CGST", dec!(9)).unwrap();
        db.taxes().insert(&igst).await.unwrap();
        db.taxes().insert(&cgst).await.unwrap();

        igst.percentage = dec!(12);
        db.taxes().update(&igst).await.unwrap();
        assert_eq!(
            db.taxes().get_by_id(&igst.id).await.unwrap().unwrap().percentage,
            dec!(12)
        );

        db.taxes().deactivate(&cgst.id).await.unwrap();
        let active: Vec<String> = db.taxes().list_active().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(active, vec!["IGST"]);
    }

    #[tokio::test]
    async fn test_unknown_tax() {
        let db = test_db().await;
        let ghost = Tax::new("Ghost", dec!(5)).unwrap();

        assert!(db.taxes().get_by_id(&ghost.id).await.unwrap().is_none());
        assert!(matches!(db.taxes().update(&ghost).await.unwrap_err(), DbError::NotFound { .. }));
        assert!(matches!(db.taxes().delete(&ghost.id).await.unwrap_err(), DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unlinked() {
        let db = test_db().await;
        let tax = Tax::new("Luxury", dec!(28)).unwrap();
        db.taxes().insert(&tax).await.unwrap();

        db.taxes().delete(&tax.id).await.unwrap();
        assert!(db.taxes().get_by_id(&tax.id).await.unwrap().is_none());
    }
}
