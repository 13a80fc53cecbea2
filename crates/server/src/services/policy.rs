//! Access decisions for printers and orders.
//!
//! Every function here is pure: it looks only at the caller and the records
//! handed in, and never at the store. Callers look up the resource first
//! (so a missing record is reported as not-found before any decision) and
//! resolve the printer owner of an order into [`OrderRoles`].

use thiserror::Error;

use printshare_core::UserId;

use crate::models::{Order, OrderPatch, Printer};

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("only the printer's owner may modify it")]
    NotPrinterOwner,

    #[error("only the customer or the printer owner may access this order")]
    NotOrderParticipant,

    #[error("only the printer owner may change an order's status")]
    StatusRequiresPrinterOwner,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert into a `Result` so callers can use `?`.
    ///
    /// # Errors
    ///
    /// Returns the denial reason when the decision is `Deny`.
    pub const fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

/// Who stands in which relation to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRoles {
    pub customer: UserId,
    /// Owner of the ordered printer, or `None` if the printer is gone.
    pub printer_owner: Option<UserId>,
}

impl OrderRoles {
    /// Combine an order with its resolved printer owner.
    #[must_use]
    pub const fn resolve(order: &Order, printer_owner: Option<UserId>) -> Self {
        Self {
            customer: order.customer_id,
            printer_owner,
        }
    }

    #[must_use]
    pub fn is_customer(&self, caller: UserId) -> bool {
        self.customer == caller
    }

    #[must_use]
    pub fn is_printer_owner(&self, caller: UserId) -> bool {
        self.printer_owner == Some(caller)
    }

    #[must_use]
    pub fn is_participant(&self, caller: UserId) -> bool {
        self.is_customer(caller) || self.is_printer_owner(caller)
    }
}

/// Update or delete a printer: owner only.
#[must_use]
pub fn printer_mutation(caller: UserId, printer: &Printer) -> Decision {
    if printer.owner_id == caller {
        Decision::Allow
    } else {
        Decision::Deny(Denial::NotPrinterOwner)
    }
}

/// Printers are public.
#[must_use]
pub const fn printer_read(_printer: &Printer) -> Decision {
    Decision::Allow
}

/// Read an order: its customer or the owner of its printer.
#[must_use]
pub fn order_read(caller: UserId, roles: &OrderRoles) -> Decision {
    if roles.is_participant(caller) {
        Decision::Allow
    } else {
        Decision::Deny(Denial::NotOrderParticipant)
    }
}

/// Change an order's `status` and/or `paymentStatus`.
///
/// Payment status may be set by either participant; status only by the
/// printer owner. A request that touches `status` without that role is
/// refused as a whole, even if its payment part alone would be allowed.
#[must_use]
pub fn order_update(caller: UserId, roles: &OrderRoles, patch: &OrderPatch) -> Decision {
    if !roles.is_participant(caller) {
        return Decision::Deny(Denial::NotOrderParticipant);
    }
    if patch.status.is_some() && !roles.is_printer_owner(caller) {
        return Decision::Deny(Denial::StatusRequiresPrinterOwner);
    }
    Decision::Allow
}

#[cfg(test)]
mod tests {
    use printshare_core::{OrderStatus, PaymentStatus};
    use uuid::Uuid;

    use super::*;

    fn user(n: u128) -> UserId {
        UserId::new(Uuid::from_u128(n))
    }

    const CUSTOMER: u128 = 1;
    const OWNER: u128 = 2;
    const STRANGER: u128 = 3;

    fn roles() -> OrderRoles {
        OrderRoles {
            customer: user(CUSTOMER),
            printer_owner: Some(user(OWNER)),
        }
    }

    fn status_patch() -> OrderPatch {
        OrderPatch {
            status: Some(OrderStatus::Approved),
            payment_status: None,
        }
    }

    fn payment_patch() -> OrderPatch {
        OrderPatch {
            status: None,
            payment_status: Some(PaymentStatus::Paid),
        }
    }

    #[test]
    fn test_order_read() {
        assert!(order_read(user(CUSTOMER), &roles()).is_allowed());
        assert!(order_read(user(OWNER), &roles()).is_allowed());
        assert_eq!(
            order_read(user(STRANGER), &roles()),
            Decision::Deny(Denial::NotOrderParticipant)
        );
    }

    #[test]
    fn test_status_change_owner_only() {
        assert!(order_update(user(OWNER), &roles(), &status_patch()).is_allowed());
        assert_eq!(
            order_update(user(CUSTOMER), &roles(), &status_patch()),
            Decision::Deny(Denial::StatusRequiresPrinterOwner)
        );
    }

    #[test]
    fn test_payment_change_either_participant() {
        assert!(order_update(user(OWNER), &roles(), &payment_patch()).is_allowed());
        assert!(order_update(user(CUSTOMER), &roles(), &payment_patch()).is_allowed());
        assert_eq!(
            order_update(user(STRANGER), &roles(), &payment_patch()),
            Decision::Deny(Denial::NotOrderParticipant)
        );
    }

    #[test]
    fn test_mixed_request_from_customer_is_refused_whole() {
        let both = OrderPatch {
            status: Some(OrderStatus::Approved),
            payment_status: Some(PaymentStatus::Paid),
        };
        assert_eq!(
            order_update(user(CUSTOMER), &roles(), &both).into_result(),
            Err(Denial::StatusRequiresPrinterOwner)
        );
    }

    #[test]
    fn test_deleted_printer_leaves_only_customer() {
        let orphaned = OrderRoles {
            customer: user(CUSTOMER),
            printer_owner: None,
        };
        assert!(order_read(user(CUSTOMER), &orphaned).is_allowed());
        assert!(!order_read(user(OWNER), &orphaned).is_allowed());
        assert!(!order_update(user(CUSTOMER), &orphaned, &status_patch()).is_allowed());
    }

    #[test]
    fn test_customer_who_owns_the_printer_holds_both_roles() {
        let own_printer = OrderRoles {
            customer: user(OWNER),
            printer_owner: Some(user(OWNER)),
        };
        assert!(order_update(user(OWNER), &own_printer, &status_patch()).is_allowed());
    }
}
