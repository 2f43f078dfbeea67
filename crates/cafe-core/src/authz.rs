//! # Authorization
//!
//! Explicit `(subject, resource) → decision` checks.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Access::Own     owners of the business, or a superuser                 │
//! │  Access::Manage  anyone with Own access, or a manager                   │
//! │                                                                         │
//! │  Business ◄──── delegates ──── Owned<BusinessDocument>                  │
//! │  (a document's Own and Manage both need Manage on its business)         │
//! │                                                                         │
//! │  Anonymous subjects are denied everything.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure policy: no I/O, no panics.

use thiserror::Error;

use crate::business::{Business, BusinessDocument};
use crate::id::UserId;

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    user_id: Option<UserId>,
    is_superuser: bool,
}

impl Subject {
    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Subject {
            user_id: None,
            is_superuser: false,
        }
    }

    /// An authenticated regular user.
    pub fn user(user_id: UserId) -> Self {
        Subject {
            user_id: Some(user_id),
            is_superuser: false,
        }
    }

    /// An authenticated superuser.
    pub fn superuser(user_id: UserId) -> Self {
        Subject {
            user_id: Some(user_id),
            is_superuser: true,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

/// Level of access being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Ownership-level actions (transfer, delete, add owners).
    Own,
    /// Day-to-day management.
    Manage,
}

/// Why a request was denied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {access:?} access denied")]
    Forbidden { access: Access },

    #[error("resource does not belong to the given parent")]
    ParentMismatch,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AuthzError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts to a `Result` for `?` at the call site.
    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(err) => Err(err),
        }
    }
}

/// Implemented per resource type.
pub trait Authorize {
    fn authorize(&self, subject: &Subject, access: Access) -> Decision;
}

impl Authorize for Business {
    fn authorize(&self, subject: &Subject, access: Access) -> Decision {
        let Some(user) = subject.user_id() else {
            return Decision::Deny(AuthzError::Unauthenticated);
        };

        let owns = subject.is_superuser() || self.is_owned_by(user);
        let allowed = match access {
            Access::Own => owns,
            Access::Manage => owns || self.is_managed_by(user),
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(AuthzError::Forbidden { access })
        }
    }
}

/// A resource paired with the business it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Owned<'a, T> {
    pub resource: &'a T,
    pub owner: &'a Business,
}

impl<'a, T> Owned<'a, T> {
    pub fn new(resource: &'a T, owner: &'a Business) -> Self {
        Owned { resource, owner }
    }
}

impl Authorize for Owned<'_, BusinessDocument> {
    fn authorize(&self, subject: &Subject, access: Access) -> Decision {
        if self.resource.business_id != self.owner.id {
            return Decision::Deny(AuthzError::ParentMismatch);
        }
        // document ownership is manage-level on the business
        match self.owner.authorize(subject, Access::Manage) {
            Decision::Allow => Decision::Allow,
            Decision::Deny(AuthzError::Forbidden { .. }) => {
                Decision::Deny(AuthzError::Forbidden { access })
            }
            denied => denied,
        }
    }
}
