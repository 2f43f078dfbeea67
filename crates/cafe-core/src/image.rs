//! Pictures attached to a product.
//!
//! Only the stored upload path is kept here; the file itself lives in
//! whatever media storage the API layer uses. A product cannot be deleted
//! while it still has images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::id::{ProductId, ProductImageId};
use crate::validation::ValidationResult;

/// Maximum length of an image caption.
pub const IMAGE_NAME_MAX_LENGTH: usize = 154;

/// Maximum length of a stored image path.
pub const IMAGE_PATH_MAX_LENGTH: usize = 100;

/// An image of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    /// Caption shown with the picture.
    pub name: String,
    /// Upload path relative to the media root, e.g. `products/chai/front.jpg`.
    pub image: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductImage {
    /// Validates input and builds an image record with a fresh id.
    pub fn new(product_id: ProductId, name: &str, image: &str) -> ValidationResult<Self> {
        let now = Utc::now();
        let picture = ProductImage {
            id: ProductImageId::new(),
            product_id,
            name: name.trim().to_string(),
            image: image.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        picture.validate()?;
        Ok(picture)
    }

    /// Re-checks field rules.
    pub fn validate(&self) -> ValidationResult<()> {
        for (field, value, max) in [
            ("name", &self.name, IMAGE_NAME_MAX_LENGTH),
            ("image", &self.image, IMAGE_PATH_MAX_LENGTH),
        ] {
            if value.is_empty() {
                return Err(ValidationError::Required {
                    field: field.to_string(),
                });
            }
            if value.chars().count() > max {
                return Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ProductImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
