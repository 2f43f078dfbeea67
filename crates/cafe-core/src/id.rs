//! # Typed Identifiers
//!
//! Every catalog entity is keyed by a UUID v4 stored as text. Each entity gets
//! its own newtype so a `TaxId` can never be passed where a `CategoryId` is
//! expected.
//!
//! ```text
//! Product ──category_id──► Category ──default_unit_id──► UnitOfMeasurement
//!    │
//!    ├──unit_id──────────► UnitOfMeasurement
//!    ├──interstate[]─────► Tax
//!    └──instate[]────────► Tax
//!
//! ProductImage ──product_id──► Product
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Category`](crate::category::Category).
    CategoryId
);
entity_id!(
    /// Identifier of a [`Product`](crate::product::Product).
    ProductId
);
entity_id!(
    /// Identifier of a [`ProductImage`](crate::image::ProductImage).
    ProductImageId
);
entity_id!(
    /// Identifier of a [`Tax`](crate::tax::Tax).
    TaxId
);
entity_id!(
    /// Identifier of a [`UnitOfMeasurement`](crate::unit::UnitOfMeasurement).
    UnitId
);
entity_id!(
    /// Identifier of a [`Business`](crate::business::Business).
    BusinessId
);
entity_id!(
    /// Identifier of an authenticated user (owner, manager, auditor).
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique_uuids() {
        let a = TaxId::new();
        let b = TaxId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CategoryId::from("cat-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cat-1\"");
        assert_eq!(id.to_string(), "cat-1");
    }
}
