//! Marketplace error types.

use thiserror::Error;

use crate::services::lifecycle::TransitionError;
use crate::services::policy::Denial;
use crate::store::StoreError;

/// Errors from printer and order operations.
///
/// When several apply, the caller sees them in this order: not-found, then
/// forbidden, then validation or transition errors.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Input rejected before touching any record.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    /// The caller lacks the role this operation needs.
    #[error("forbidden: {0}")]
    Forbidden(#[from] Denial),

    /// The requested order state change is not a legal edge.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Storage failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl MarketplaceError {
    pub(crate) const fn printer_not_found() -> Self {
        Self::NotFound { kind: "printer" }
    }

    pub(crate) const fn order_not_found() -> Self {
        Self::NotFound { kind: "order" }
    }
}
