//! Units of measurement (kg, piece, litre) that products are sold in.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::id::UnitId;
use crate::validation::{validate_name, ValidationResult};

/// Maximum length of a unit symbol ("kg", "pc", "ltr").
pub const UNIT_SYMBOL_MAX_LENGTH: usize = 16;

/// A unit of measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitOfMeasurement {
    pub id: UnitId,
    /// Unique display name, e.g. "Kilogram".
    pub name: String,
    /// Short symbol printed next to quantities, e.g. "kg".
    pub symbol: String,
}

impl UnitOfMeasurement {
    /// Validates input and builds a unit with a fresh id.
    pub fn new(name: &str, symbol: &str) -> ValidationResult<Self> {
        let unit = UnitOfMeasurement {
            id: UnitId::new(),
            name: name.trim().to_string(),
            symbol: symbol.trim().to_string(),
        };
        unit.validate()?;
        Ok(unit)
    }

    /// Re-checks field rules, used before updates.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        if self.symbol.is_empty() {
            return Err(ValidationError::Required {
                field: "symbol".to_string(),
            });
        }
        if self.symbol.chars().count() > UNIT_SYMBOL_MAX_LENGTH {
            return Err(ValidationError::TooLong {
                field: "symbol".to_string(),
                max: UNIT_SYMBOL_MAX_LENGTH,
            });
        }
        Ok(())
    }
}

impl fmt::Display for UnitOfMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
