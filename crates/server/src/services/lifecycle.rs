//! Order state machines.
//!
//! ```text
//! status:          pending ──> approved ──> completed
//!                     └──────> rejected
//!
//! payment_status:  pending ──> paid
//!                     └──────> failed
//! ```
//!
//! The two machines are independent. An order can be marked paid while its
//! status is still `pending`, or even after it was `rejected`; nothing here
//! couples payment to approval.

use thiserror::Error;

use printshare_core::{OrderStatus, PaymentStatus};

use crate::models::{Order, OrderPatch};

/// An edge that is not in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid status transition from {from} to {to}")]
    Status { from: OrderStatus, to: OrderStatus },

    #[error("invalid payment status transition from {from} to {to}")]
    Payment {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

/// Whether `from -> to` is a legal status edge. Self-loops are not.
#[must_use]
pub const fn status_edge(from: OrderStatus, to: OrderStatus) -> bool {
    matches!(
        (from, to),
        (OrderStatus::Pending, OrderStatus::Approved | OrderStatus::Rejected)
            | (OrderStatus::Approved, OrderStatus::Completed)
    )
}

/// Whether `from -> to` is a legal payment edge. Self-loops are not.
#[must_use]
pub const fn payment_edge(from: PaymentStatus, to: PaymentStatus) -> bool {
    matches!(
        (from, to),
        (PaymentStatus::Pending, PaymentStatus::Paid | PaymentStatus::Failed)
    )
}

/// Validate every requested edge without touching the order.
///
/// # Errors
///
/// Returns the first illegal edge, status before payment.
pub fn check(order: &Order, patch: &OrderPatch) -> Result<(), TransitionError> {
    if let Some(to) = patch.status.filter(|&to| !status_edge(order.status, to)) {
        return Err(TransitionError::Status {
            from: order.status,
            to,
        });
    }
    if let Some(to) = patch
        .payment_status
        .filter(|&to| !payment_edge(order.payment_status, to))
    {
        return Err(TransitionError::Payment {
            from: order.payment_status,
            to,
        });
    }
    Ok(())
}

/// Move the order along the requested edges.
///
/// Both edges are checked before either is applied, so on error the order
/// is unchanged. Timestamps are the store's business.
///
/// # Errors
///
/// See [`check`].
pub fn apply(order: &mut Order, patch: OrderPatch) -> Result<(), TransitionError> {
    check(order, &patch)?;
    if let Some(status) = patch.status {
        order.status = status;
    }
    if let Some(payment_status) = patch.payment_status {
        order.payment_status = payment_status;
    }
    Ok(())
}
