//! Businesses owning outlets, and the documents filed for them.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::id::{BusinessId, UserId};
use crate::validation::{validate_name, ValidationResult};

/// Length of a PAN number.
pub const PAN_LENGTH: usize = 10;

/// Length of a GST identification number.
pub const GST_LENGTH: usize = 15;

/// Legal form of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Proprietorship,
    Partnership,
    LimitedLiabilityPartnership,
    #[default]
    PrivateLimited,
    PublicLimited,
}

impl BusinessType {
    /// Suffix appended to the business name in its legal name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            BusinessType::Proprietorship => "Proprietorship",
            BusinessType::Partnership => "Partnership",
            BusinessType::LimitedLiabilityPartnership => "LLP",
            BusinessType::PrivateLimited => "Private Limited",
            BusinessType::PublicLimited => "Limited",
        }
    }
}

/// The legal entity that owns outlets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub business_type: BusinessType,
    pub owners: Vec<UserId>,
    pub managers: Vec<UserId>,
    pub gst: Option<String>,
    pub pan: String,
    /// Home state, used to tell instate sales from interstate ones.
    pub home_state: String,
    pub fssai: Option<String>,
    pub is_active: bool,
}

impl Business {
    /// Validates input and builds an active business with no owners yet.
    pub fn new(
        name: &str,
        business_type: BusinessType,
        pan: &str,
        home_state: &str,
    ) -> ValidationResult<Self> {
        let business = Business {
            id: BusinessId::new(),
            name: name.trim().to_string(),
            business_type,
            owners: Vec::new(),
            managers: Vec::new(),
            gst: None,
            pan: pan.trim().to_uppercase(),
            home_state: home_state.trim().to_string(),
            fssai: None,
            is_active: true,
        };
        business.validate()?;
        Ok(business)
    }

    /// Checks name, PAN and GST formats.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_name("home_state", &self.home_state)?;
        validate_pan(&self.pan)?;
        if let Some(gst) = self.gst.as_deref() {
            validate_gst(gst)?;
        }
        Ok(())
    }

    /// Name followed by the legal form, e.g. "Acme Foods Private Limited".
    pub fn legal_name(&self) -> String {
        format!("{} {}", self.name, self.business_type.display_name())
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owners.contains(user)
    }

    pub fn is_managed_by(&self, user: &UserId) -> bool {
        self.managers.contains(user)
    }
}

impl fmt::Display for Business {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legal_name())
    }
}

/// PAN: five letters, four digits, one letter (`ABCDE1234F`).
pub fn validate_pan(pan: &str) -> ValidationResult<()> {
    let chars: Vec<char> = pan.chars().collect();
    let well_formed = chars.len() == PAN_LENGTH
        && chars[..5].iter().all(|c| c.is_ascii_uppercase())
        && chars[5..9].iter().all(|c| c.is_ascii_digit())
        && chars[9].is_ascii_uppercase();

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "pan".to_string(),
            reason: "expected 5 letters, 4 digits and a letter".to_string(),
        });
    }
    Ok(())
}

/// GSTIN: 15 uppercase alphanumerics starting with a 2-digit state code.
pub fn validate_gst(gst: &str) -> ValidationResult<()> {
    let well_formed = gst.len() == GST_LENGTH
        && gst.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        && gst.chars().take(2).all(|c| c.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "gst".to_string(),
            reason: "expected 15 characters starting with a state code".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Business Document
// =============================================================================

/// Kind of registration document on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Pan,
    Gst,
    Fssai,
    IncorporationCertificate,
}

/// Verification state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// A document filed for a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessDocument {
    pub business_id: BusinessId,
    pub doc_type: DocumentType,
    pub value: Option<String>,
    pub status: DocumentStatus,
}

impl BusinessDocument {
    /// A pending document for `business`.
    pub fn new(business: &Business, doc_type: DocumentType, value: Option<String>) -> Self {
        BusinessDocument {
            business_id: business.id.clone(),
            doc_type,
            value,
            status: DocumentStatus::Pending,
        }
    }
}
