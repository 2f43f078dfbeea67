//! # Product Image Repository
//!
//! Stored image paths attached to products. Removing the images is the only
//! way to make a product deletable again.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use cafe_core::{ProductId, ProductImage, ProductImageId};

use super::require_row;
use crate::error::{DbError, DbResult};

const IMAGE_COLUMNS: &str = "id, product_id, name, image, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: ProductImageId,
    product_id: ProductId,
    name: String,
    image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        ProductImage {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product images.
#[derive(Debug, Clone)]
pub struct ProductImageRepository {
    pool: SqlitePool,
}

impl ProductImageRepository {
    /// Creates a new ProductImageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductImageRepository { pool }
    }

    /// Attaches an image to its product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn insert(&self, image: &ProductImage) -> DbResult<ProductImage> {
        debug!(product_id = %image.product_id, name = %image.name, "Inserting product image");
        image.validate()?;

        let mut tx = self.pool.begin().await?;

        require_row(&mut tx, "products", "Product", image.product_id.as_str()).await?;

        sqlx::query(
            r#"
            INSERT INTO product_images (id, product_id, name, image, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&image.id)
        .bind(&image.product_id)
        .bind(&image.name)
        .bind(&image.image)
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(image.clone())
    }

    /// Gets an image by its ID.
    pub async fn get_by_id(&self, id: &ProductImageId) -> DbResult<Option<ProductImage>> {
        let sql = format!("SELECT {IMAGE_COLUMNS} FROM product_images WHERE id = ?1");
        let row = sqlx::query_as::<_, ProductImageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ProductImage::from))
    }

    /// Lists the images of one product, oldest first.
    pub async fn list_for_product(&self, product_id: &ProductId) -> DbResult<Vec<ProductImage>> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = ?1 \
             ORDER BY created_at, name"
        );
        let rows = sqlx::query_as::<_, ProductImageRow>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    /// Deletes an image record.
    pub async fn delete(&self, id: &ProductImageId) -> DbResult<()> {
        debug!(id = %id, "Deleting product image");

        let result = sqlx::query("DELETE FROM product_images WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductImage", id.as_str()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cafe_core::money::Price;
    use cafe_core::{Category, NewProduct, Product, UnitOfMeasurement};
    use rust_decimal_macros::dec;

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let unit = db.units().insert(&UnitOfMeasurement::new("Cup", "cup").unwrap()).await.unwrap();
        let category = db
            .categories()
            .insert(&Category::new("Hot Beverages", "HOT", "0902", None).unwrap())
            .await
            .unwrap();
        let product = Product::new(NewProduct {
            name: "Masala Chai".to_string(),
            category_id: category.id,
            price: Price::new(dec!(30)).unwrap(),
            is_inclusive: true,
            sku: "CHAI".to_string(),
            override_hsn: None,
            unit_id: unit.id,
            interstate_tax_ids: Vec::new(),
            instate_tax_ids: Vec::new(),
        })
        .unwrap();
        let product = db.products().insert(&product).await.unwrap();
        (db, product)
    }

    #[tokio::test]
    async fn test_insert_list_and_delete() {
        let (db, product) = setup().await;
        let front = ProductImage::new(product.id.clone(), "Front", "products/chai/front.jpg").unwrap();
        db.images().insert(&front).await.unwrap();

        let stored = db.images().get_by_id(&front.id).await.unwrap().unwrap();
        assert_eq!(stored.image, "products/chai/front.jpg");
        assert_eq!(db.images().list_for_product(&product.id).await.unwrap().len(), 1);

        db.images().delete(&front.id).await.unwrap();
        assert!(db.images().list_for_product(&product.id).await.unwrap().is_empty());

        let err = db.images().delete(&front.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_insert_for_unknown_product() {
        let (db, _) = setup().await;
        let orphan = ProductImage::new(ProductId::new(), "Front", "x.jpg").unwrap();

        let err = db.images().insert(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity, .. } if entity == "Product"));
    }
}
