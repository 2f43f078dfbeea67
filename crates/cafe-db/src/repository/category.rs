//! # Category Repository
//!
//! Database operations for product categories.
//!
//! Name and SKU prefix are unique across all categories, including inactive
//! ones; the `UNIQUE` constraints report clashes as
//! [`DbError::UniqueViolation`].

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use cafe_core::{Category, CategoryId, UnitId};

use super::{count_references, require_row};
use crate::error::{DbError, DbResult};

const CATEGORY_COLUMNS: &str =
    "id, name, sku_prefix, hsn, default_unit_id, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    sku_prefix: String,
    hsn: String,
    default_unit_id: Option<UnitId>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            sku_prefix: row.sku_prefix,
            hsn: row.hsn,
            default_unit_id: row.default_unit_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Loads one category on an existing connection or transaction.
pub(crate) async fn fetch_category(
    conn: &mut SqliteConnection,
    id: &CategoryId,
) -> DbResult<Option<Category>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
    let row = sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(Category::from))
}

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CategoryRepository::new(pool);
///
/// let beverages = Category::new("Beverages", "BEV", "2202", None)?;
/// repo.insert(&beverages).await?;
///
/// let found = repo.get_by_name("Beverages").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted category
    /// * `Err(DbError::NotFound)` - Default unit doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Name or SKU prefix already exists
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(name = %category.name, sku_prefix = %category.sku_prefix, "Inserting category");
        category.validate()?;

        let mut tx = self.pool.begin().await?;

        if let Some(unit_id) = &category.default_unit_id {
            require_row(&mut tx, "units_of_measurement", "UnitOfMeasurement", unit_id.as_str())
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, sku_prefix, hsn, default_unit_id,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.sku_prefix)
        .bind(&category.hsn)
        .bind(&category.default_unit_id)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_error(e, category))?;

        tx.commit().await?;
        Ok(category.clone())
    }

    /// Gets a category by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Category not found
    pub async fn get_by_id(&self, id: &CategoryId) -> DbResult<Option<Category>> {
        let mut conn = self.pool.acquire().await?;
        fetch_category(&mut conn, id).await
    }

    /// Gets a category by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    /// Lists active categories sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed active categories");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Updates an existing category.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Category or its default unit doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Name or SKU prefix taken
    pub async fn update(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, "Updating category");
        category.validate()?;

        let mut tx = self.pool.begin().await?;

        if let Some(unit_id) = &category.default_unit_id {
            require_row(&mut tx, "units_of_measurement", "UnitOfMeasurement", unit_id.as_str())
                .await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                sku_prefix = ?3,
                hsn = ?4,
                default_unit_id = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.sku_prefix)
        .bind(&category.hsn)
        .bind(&category.default_unit_id)
        .bind(category.is_active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_error(e, category))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", category.id.as_str()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-deletes a category by setting is_active = false.
    ///
    /// Products keep pointing at it; only listings hide it.
    pub async fn deactivate(&self, id: &CategoryId) -> DbResult<()> {
        debug!(id = %id, "Deactivating category");

        let result =
            sqlx::query("UPDATE categories SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id.as_str()));
        }

        Ok(())
    }

    /// Permanently deletes a category that no product uses.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    /// * `Err(DbError::ReferentialIntegrity)` - Products still belong to it
    pub async fn delete(&self, id: &CategoryId) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "categories", "Category", id.as_str()).await?;

        let products = count_references(&mut tx, "products", "category_id", id.as_str()).await?;
        if products > 0 {
            warn!(id = %id, products, "Refusing to delete category with products");
            return Err(DbError::still_referenced(
                "Category",
                id.as_str(),
                format!("{products} product(s)"),
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn unique_error(err: sqlx::Error, category: &Category) -> DbError {
    DbError::from(err).with_unique_values(&[
        ("name", category.name.as_str()),
        ("sku_prefix", category.sku_prefix.as_str()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let category = Category::new("Beverages", "BEV", "2202", None).unwrap();
        db.categories().insert(&category).await.unwrap();

        let by_id = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Beverages");
        assert_eq!(by_id.sku_prefix, "BEV");
        assert_eq!(by_id.hsn, "2202");
        assert!(by_id.is_active);

        let by_name = db.categories().get_by_name("Beverages").await.unwrap().unwrap();
        assert_eq!(by_name.id, category.id);

        assert!(db.categories().get_by_name("Snacks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_and_prefix() {
        let db = test_db().await;
        db.categories()
            .insert(&Category::new("Beverages", "BEV", "2202", None).unwrap())
            .await
            .unwrap();

        let err = db
            .categories()
            .insert(&Category::new("Beverages", "DRK", "2202", None).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "name"));

        let err = db
            .categories()
            .insert(&Category::new("Drinks", "BEV", "2202", None).unwrap())
            .await
            .unwrap_err();
        assert!(
            matches!(err, DbError::UniqueViolation { field, value } if field == "sku_prefix" && value == "BEV")
        );
    }

    #[tokio::test]
    async fn test_unknown_default_unit() {
        let db = test_db().await;
        let category = Category::new("Beverages", "BEV", "2202", Some(UnitId::new())).unwrap();

        let err = db.categories().insert(&category).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "UnitOfMeasurement"));
    }

    #[tokio::test]
    async fn test_update_and_deactivate() {
        let db = test_db().await;
        let mut category = Category::new("Beverages", "BEV", "2202", None).unwrap();
        db.categories().insert(&category).await.unwrap();

        category.hsn = "220210".to_string();
        db.categories().update(&category).await.unwrap();
        let stored = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(stored.hsn, "220210");

        db.categories().deactivate(&category.id).await.unwrap();
        assert!(db.categories().list_active(10).await.unwrap().is_empty());
        assert!(!db.categories().get_by_id(&category.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_unknown() {
        let db = test_db().await;
        let category = Category::new("Ghost", "GST", "2202", None).unwrap();

        let err = db.categories().update(&category).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "Category"));
        assert!(matches!(
            db.categories().deactivate(&category.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_unused() {
        let db = test_db().await;
        let category = Category::new("Snacks", "SNK", "1905", None).unwrap();
        db.categories().insert(&category).await.unwrap();

        db.categories().delete(&category.id).await.unwrap();
        assert!(db.categories().get_by_id(&category.id).await.unwrap().is_none());

        let err = db.categories().delete(&category.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
