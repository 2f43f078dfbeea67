//! # Unit Repository
//!
//! Database operations for units of measurement.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use cafe_core::{UnitId, UnitOfMeasurement};

use super::{count_references, require_row};
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct UnitRow {
    id: UnitId,
    name: String,
    symbol: String,
}

impl From<UnitRow> for UnitOfMeasurement {
    fn from(row: UnitRow) -> Self {
        UnitOfMeasurement {
            id: row.id,
            name: row.name,
            symbol: row.symbol,
        }
    }
}

/// Repository for units of measurement.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    pool: SqlitePool,
}

impl UnitRepository {
    /// Creates a new UnitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UnitRepository { pool }
    }

    /// Inserts a new unit.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, unit: &UnitOfMeasurement) -> DbResult<UnitOfMeasurement> {
        debug!(name = %unit.name, "Inserting unit");
        unit.validate()?;

        sqlx::query("INSERT INTO units_of_measurement (id, name, symbol) VALUES (?1, ?2, ?3)")
            .bind(&unit.id)
            .bind(&unit.name)
            .bind(&unit.symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_unique_values(&[("name", unit.name.as_str())]))?;

        Ok(unit.clone())
    }

    /// Gets a unit by its ID.
    pub async fn get_by_id(&self, id: &UnitId) -> DbResult<Option<UnitOfMeasurement>> {
        let row = sqlx::query_as::<_, UnitRow>(
            "SELECT id, name, symbol FROM units_of_measurement WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UnitOfMeasurement::from))
    }

    /// Lists all units ordered by name.
    pub async fn list(&self) -> DbResult<Vec<UnitOfMeasurement>> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT id, name, symbol FROM units_of_measurement ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UnitOfMeasurement::from).collect())
    }

    /// Renames a unit or changes its symbol.
    pub async fn update(&self, unit: &UnitOfMeasurement) -> DbResult<()> {
        debug!(id = %unit.id, "Updating unit");
        unit.validate()?;

        let result =
            sqlx::query("UPDATE units_of_measurement SET name = ?2, symbol = ?3 WHERE id = ?1")
                .bind(&unit.id)
                .bind(&unit.name)
                .bind(&unit.symbol)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::from(e).with_unique_values(&[("name", unit.name.as_str())]))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("UnitOfMeasurement", unit.id.as_str()));
        }

        Ok(())
    }

    /// Deletes a unit.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Unit doesn't exist
    /// * `Err(DbError::ReferentialIntegrity)` - A category uses it as default
    ///   unit, or a product is sold in it
    pub async fn delete(&self, id: &UnitId) -> DbResult<()> {
        debug!(id = %id, "Deleting unit");

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "units_of_measurement", "UnitOfMeasurement", id.as_str()).await?;

        let categories =
            count_references(&mut tx, "categories", "default_unit_id", id.as_str()).await?;
        let products = count_references(&mut tx, "products", "unit_id", id.as_str()).await?;

        if categories > 0 || products > 0 {
            let mut holders = Vec::new();
            if categories > 0 {
                holders.push(format!("{categories} category(ies)"));
            }
            if products > 0 {
                holders.push(format!("{products} product(s)"));
            }
            let referenced_by = holders.join(" and ");
            warn!(id = %id, referenced_by = %referenced_by, "Refusing to delete unit in use");
            return Err(DbError::still_referenced(
                "UnitOfMeasurement",
                id.as_str(),
                referenced_by,
            ));
        }

        sqlx::query("DELETE FROM units_of_measurement WHERE id = ?1")
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
    use cafe_core::money::Price;
    use cafe_core::{Category, NewProduct, Product};
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_db().await;
        let kg = db.units().insert(&UnitOfMeasurement::new("Kilogram", "kg").unwrap()).await.unwrap();
        db.units().insert(&UnitOfMeasurement::new("Cup", "cup").unwrap()).await.unwrap();

        let names: Vec<String> = db.units().list().await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Cup", "Kilogram"]);

        let fetched = db.units().get_by_id(&kg.id).await.unwrap().unwrap();
        assert_eq!(fetched, kg);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = test_db().await;
        db.units().insert(&UnitOfMeasurement::new("Piece", "pc").unwrap()).await.unwrap();

        let err = db
            .units()
            .insert(&UnitOfMeasurement::new("Piece", "pcs").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, value } if field == "name" && value == "Piece"));
    }

    #[tokio::test]
    async fn test_delete_rejected_while_category_default() {
        let db = test_db().await;
        let cup = db.units().insert(&UnitOfMeasurement::new("Cup", "cup").unwrap()).await.unwrap();
        let category = Category::new("Beverages", "BEV", "2202", Some(cup.id.clone())).unwrap();
        db.categories().insert(&category).await.unwrap();

        let err = db.units().delete(&cup.id).await.unwrap_err();
        assert!(matches!(err, DbError::ReferentialIntegrity { .. }));
        assert!(db.units().get_by_id(&cup.id).await.unwrap().is_some());

        db.categories().delete(&category.id).await.unwrap();
        db.units().delete(&cup.id).await.unwrap();
        assert!(db.units().get_by_id(&cup.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_rejected_while_product_sold_in_it() {
        let db = test_db().await;
        let plate = db.units().insert(&UnitOfMeasurement::new("Plate", "plt").unwrap()).await.unwrap();
        let category = Category::new("Snacks", "SNK", "2106", None).unwrap();
        db.categories().insert(&category).await.unwrap();
        let samosa = Product::new(NewProduct {
            name: "Samosa".to_string(),
            category_id: category.id.clone(),
            price: Price::new(dec!(25.500)).unwrap(),
            is_inclusive: false,
            sku: "SAMOSA".to_string(),
            override_hsn: None,
            unit_id: plate.id.clone(),
            interstate_tax_ids: Vec::new(),
            instate_tax_ids: Vec::new(),
        })
        .unwrap();
        db.products().insert(&samosa).await.unwrap();

        let err = db.units().delete(&plate.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::ReferentialIntegrity { ref referenced_by, .. } if referenced_by == "1 product(s)"
        ));
        assert!(db.units().get_by_id(&plate.id).await.unwrap().is_some());

        db.products().delete(&samosa.id).await.unwrap();
        db.units().delete(&plate.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let db = test_db().await;
        let err = db.units().delete(&UnitId::new()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
