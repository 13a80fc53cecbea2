//! Printer and order operations.
//!
//! Every operation takes the caller's user ID as already authenticated by
//! the HTTP layer. Lookups happen first, then the policy check, then input
//! validation, then the store mutation. Order and printer mutations run their
//! checks inside the store's per-record critical section.

mod error;

pub use error::MarketplaceError;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use printshare_core::{IdGenerator, OrderId, PrinterId, UserId};

use crate::models::{
    NewOrder, NewPrinter, Order, OrderPatch, OrderScope, Printer, PrinterPatch, Specifications,
    SpecificationsPatch,
};
use crate::services::{lifecycle, policy};
use crate::services::policy::OrderRoles;
use crate::store::ResourceStore;

/// Printer and order operations over a shared [`ResourceStore`].
#[derive(Clone)]
pub struct Marketplace {
    store: Arc<ResourceStore>,
    ids: Arc<dyn IdGenerator>,
}

impl Marketplace {
    #[must_use]
    pub fn new(store: Arc<ResourceStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    // =========================================================================
    // Printers
    // =========================================================================

    /// All printers, or only those accepting orders.
    #[must_use]
    pub fn list_printers(&self, available_only: bool) -> Vec<Printer> {
        if available_only {
            self.store.printers().available_only()
        } else {
            self.store.printers().all()
        }
    }

    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the printer doesn't exist.
    pub fn get_printer(&self, id: PrinterId) -> Result<Printer, MarketplaceError> {
        let printer = self
            .store
            .printers()
            .get_by_id(id)
            .ok_or_else(MarketplaceError::printer_not_found)?;
        policy::printer_read(&printer).into_result()?;
        Ok(printer)
    }

    /// List a new printer owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::Validation` if a required text field is blank.
    pub fn create_printer(
        &self,
        caller: UserId,
        listing: NewPrinter,
    ) -> Result<Printer, MarketplaceError> {
        validate_listing(&listing)?;

        let printer = Printer::from_listing(
            PrinterId::generate(self.ids.as_ref()),
            caller,
            listing,
            Utc::now(),
        );
        let printer = self.store.printers().add(printer)?;

        info!(printer_id = %printer.id, owner_id = %caller, "printer listed");
        Ok(printer)
    }

    /// Merge the given fields into a printer.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the printer doesn't exist.
    /// Returns `MarketplaceError::Forbidden` if `caller` is not the owner.
    /// Returns `MarketplaceError::Validation` if the patch blanks a required
    /// field. An empty patch only refreshes `updated_at`.
    pub fn update_printer(
        &self,
        caller: UserId,
        id: PrinterId,
        patch: PrinterPatch,
    ) -> Result<Printer, MarketplaceError> {
        let invalid = validate_printer_patch(&patch).err();

        let updated = self.store.printers().update(id, patch, |current| {
            if let policy::Decision::Deny(denial) = policy::printer_mutation(caller, current) {
                debug!(printer_id = %id, caller = %caller, %denial, "printer update denied");
                return Err(MarketplaceError::Forbidden(denial));
            }
            invalid.map_or(Ok(()), Err)
        })?;

        let printer = updated.ok_or_else(MarketplaceError::printer_not_found)?;
        info!(printer_id = %id, "printer updated");
        Ok(printer)
    }

    /// Check that the printer exists and `caller` may change it, without
    /// changing anything.
    ///
    /// Lets the HTTP layer answer 404/403 before it looks at a request body.
    /// [`Self::update_printer`] and [`Self::delete_printer`] check again
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the printer doesn't exist.
    /// Returns `MarketplaceError::Forbidden` if `caller` is not the owner.
    pub fn authorize_printer_mutation(
        &self,
        caller: UserId,
        id: PrinterId,
    ) -> Result<Printer, MarketplaceError> {
        let printer = self
            .store
            .printers()
            .get_by_id(id)
            .ok_or_else(MarketplaceError::printer_not_found)?;

        if let policy::Decision::Deny(denial) = policy::printer_mutation(caller, &printer) {
            debug!(printer_id = %id, caller = %caller, %denial, "printer mutation denied");
            return Err(denial.into());
        }
        Ok(printer)
    }

    /// Remove a printer. Orders that reference it are kept.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the printer doesn't exist.
    /// Returns `MarketplaceError::Forbidden` if `caller` is not the owner.
    pub fn delete_printer(&self, caller: UserId, id: PrinterId) -> Result<(), MarketplaceError> {
        self.authorize_printer_mutation(caller, id)?;

        if !self.store.printers().remove(id) {
            return Err(MarketplaceError::printer_not_found());
        }

        info!(printer_id = %id, "printer deleted");
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders visible to `caller` from the given side.
    #[must_use]
    pub fn list_orders(&self, caller: UserId, scope: OrderScope) -> Vec<Order> {
        match scope {
            OrderScope::Customer => self.store.orders().by_customer(caller),
            OrderScope::Owner => self.store.orders_for_printer_owner(caller),
            OrderScope::All => self.store.orders_involving(caller),
        }
    }

    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the order doesn't exist.
    /// Returns `MarketplaceError::Forbidden` if `caller` is neither the
    /// customer nor the printer owner.
    pub fn get_order(&self, caller: UserId, id: OrderId) -> Result<Order, MarketplaceError> {
        let order = self
            .store
            .orders()
            .get_by_id(id)
            .ok_or_else(MarketplaceError::order_not_found)?;

        let roles = self.roles_for(&order);
        if let policy::Decision::Deny(denial) = policy::order_read(caller, &roles) {
            debug!(order_id = %id, caller = %caller, %denial, "order read denied");
            return Err(denial.into());
        }

        Ok(order)
    }

    /// Place an order against an existing printer.
    ///
    /// The order records the printer's current name. Availability is not
    /// checked; the owner decides by approving or rejecting.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::Validation` if the model file is blank.
    /// Returns `MarketplaceError::NotFound` if the printer doesn't exist.
    pub fn create_order(&self, caller: UserId, request: NewOrder) -> Result<Order, MarketplaceError> {
        validate_order_request(&request)?;

        let printer = self
            .store
            .printers()
            .get_by_id(request.printer_id)
            .ok_or_else(MarketplaceError::printer_not_found)?;

        let order = Order::place(
            OrderId::generate(self.ids.as_ref()),
            caller,
            printer.name,
            request,
            Utc::now(),
        );
        let order = self.store.orders().add(order)?;

        info!(order_id = %order.id, printer_id = %order.printer_id, customer_id = %caller, "order placed");
        Ok(order)
    }

    /// Change an order's status and/or payment status.
    ///
    /// An empty patch from a participant changes nothing but `updated_at`.
    ///
    /// Authorization and both transitions are checked under the order's
    /// lock; nothing is written unless all pass.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the order doesn't exist.
    /// Returns `MarketplaceError::Forbidden` if the caller lacks the role.
    /// Returns `MarketplaceError::InvalidTransition` for an illegal edge.
    pub fn update_order(
        &self,
        caller: UserId,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, MarketplaceError> {
        let updated = self.store.orders().update_with(id, |order| {
            let roles = self.roles_for(order);
            if let policy::Decision::Deny(denial) = policy::order_update(caller, &roles, &patch) {
                debug!(order_id = %id, caller = %caller, %denial, "order update denied");
                return Err(MarketplaceError::Forbidden(denial));
            }
            lifecycle::apply(order, patch)?;
            Ok(())
        })?;

        let order = updated.ok_or_else(MarketplaceError::order_not_found)?;
        info!(
            order_id = %id,
            status = %order.status,
            payment_status = %order.payment_status,
            "order updated"
        );
        Ok(order)
    }

    fn roles_for(&self, order: &Order) -> OrderRoles {
        OrderRoles::resolve(order, self.store.printer_owner_of(order.printer_id))
    }
}

fn require_text(field: &str, value: &str) -> Result<(), MarketplaceError> {
    if value.trim().is_empty() {
        return Err(MarketplaceError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_specifications(specs: &Specifications) -> Result<(), MarketplaceError> {
    require_text("specifications.buildVolume", &specs.build_volume)?;
    require_text("specifications.layerHeight", &specs.layer_height)?;
    require_text("specifications.technology", &specs.technology)
}

fn validate_listing(listing: &NewPrinter) -> Result<(), MarketplaceError> {
    require_text("name", &listing.name)?;
    require_text("description", &listing.description)?;
    require_text("location", &listing.location)?;
    validate_specifications(&listing.specifications)
}

fn validate_printer_patch(patch: &PrinterPatch) -> Result<(), MarketplaceError> {
    let provided = [
        ("name", patch.name.as_deref()),
        ("description", patch.description.as_deref()),
        ("location", patch.location.as_deref()),
    ];
    for (field, value) in provided {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    if let Some(specs) = &patch.specifications {
        validate_specifications_patch(specs)?;
    }
    Ok(())
}

fn validate_specifications_patch(patch: &SpecificationsPatch) -> Result<(), MarketplaceError> {
    let provided = [
        ("specifications.buildVolume", patch.build_volume.as_deref()),
        ("specifications.layerHeight", patch.layer_height.as_deref()),
        ("specifications.technology", patch.technology.as_deref()),
    ];
    for (field, value) in provided {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    Ok(())
}

fn validate_order_request(request: &NewOrder) -> Result<(), MarketplaceError> {
    require_text("modelFileUrl", &request.model_file_url)?;
    require_text("modelFileName", &request.model_file_name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use printshare_core::{OrderStatus, PaymentStatus, Price, PrinterStatus, SequentialIds};

    use super::*;
    use crate::models::printer::tests::sample_listing;
    use crate::services::policy::Denial;

    struct Fixture {
        market: Marketplace,
        owner: UserId,
        customer: UserId,
        stranger: UserId,
    }

    fn fixture() -> Fixture {
        let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIds::new());
        let owner = UserId::generate(ids.as_ref());
        let customer = UserId::generate(ids.as_ref());
        let stranger = UserId::generate(ids.as_ref());
        Fixture {
            market: Marketplace::new(Arc::new(ResourceStore::new()), ids),
            owner,
            customer,
            stranger,
        }
    }

    fn order_request(printer_id: PrinterId) -> NewOrder {
        NewOrder {
            printer_id,
            model_file_url: "/models/phone-stand.stl".to_string(),
            model_file_name: "phone-stand.stl".to_string(),
            total_price: Price::from_units(45).unwrap(),
        }
    }

    fn status(to: OrderStatus) -> OrderPatch {
        OrderPatch {
            status: Some(to),
            payment_status: None,
        }
    }

    fn payment(to: PaymentStatus) -> OrderPatch {
        OrderPatch {
            status: None,
            payment_status: Some(to),
        }
    }

    /// An owner's printer with one pending order from the customer.
    fn placed(f: &Fixture) -> (Printer, Order) {
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();
        let order = f
            .market
            .create_order(f.customer, order_request(printer.id))
            .unwrap();
        (printer, order)
    }

    #[test]
    fn test_create_printer_assigns_owner_and_id() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        assert_eq!(printer.owner_id, f.owner);
        assert_eq!(printer.created_at, printer.updated_at);
        assert_eq!(f.market.get_printer(printer.id).unwrap(), printer);
    }

    #[test]
    fn test_create_printer_rejects_blank_name() {
        let f = fixture();
        let mut listing = sample_listing();
        listing.name = "   ".to_string();

        assert!(matches!(
            f.market.create_printer(f.owner, listing),
            Err(MarketplaceError::Validation(_))
        ));
        assert!(f.market.store().printers().is_empty());
    }

    #[test]
    fn test_list_printers_available_only() {
        let f = fixture();
        let open = f.market.create_printer(f.owner, sample_listing()).unwrap();
        let mut listing = sample_listing();
        listing.status = PrinterStatus::Unavailable;
        f.market.create_printer(f.owner, listing).unwrap();

        assert_eq!(f.market.list_printers(false).len(), 2);
        let available = f.market.list_printers(true);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, open.id);
    }

    #[test]
    fn test_non_owner_cannot_update_printer() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        let err = f
            .market
            .update_printer(
                f.stranger,
                printer.id,
                PrinterPatch {
                    name: Some("Mine now".to_string()),
                    ..PrinterPatch::default()
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            MarketplaceError::Forbidden(Denial::NotPrinterOwner)
        ));
        assert_eq!(f.market.get_printer(printer.id).unwrap(), printer);
    }

    #[test]
    fn test_owner_partial_update_touches_only_given_field() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        let updated = f
            .market
            .update_printer(
                f.owner,
                printer.id,
                PrinterPatch {
                    price_per_hour: Some(Price::from_units(10).unwrap()),
                    ..PrinterPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.price_per_hour, Price::from_units(10).unwrap());
        assert_eq!(updated.name, printer.name);
        assert_eq!(updated.specifications, printer.specifications);
        assert_eq!(updated.location, printer.location);
        assert!(updated.updated_at > printer.updated_at);
    }

    #[test]
    fn test_printer_update_error_order() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();
        let blank = || PrinterPatch {
            name: Some(String::new()),
            ..PrinterPatch::default()
        };

        let missing = PrinterId::new(uuid::Uuid::from_u128(999));
        assert!(matches!(
            f.market.update_printer(f.stranger, missing, blank()),
            Err(MarketplaceError::NotFound { kind: "printer" })
        ));
        assert!(matches!(
            f.market.update_printer(f.stranger, printer.id, blank()),
            Err(MarketplaceError::Forbidden(_))
        ));
        assert!(matches!(
            f.market.update_printer(f.owner, printer.id, blank()),
            Err(MarketplaceError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_printer_patch_only_stamps() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        assert!(matches!(
            f.market
                .update_printer(f.stranger, printer.id, PrinterPatch::default()),
            Err(MarketplaceError::Forbidden(_))
        ));
        let touched = f
            .market
            .update_printer(f.owner, printer.id, PrinterPatch::default())
            .unwrap();
        assert!(touched.updated_at > printer.updated_at);
        assert_eq!(
            Printer {
                updated_at: printer.updated_at,
                ..touched
            },
            printer
        );
    }

    #[test]
    fn test_authorize_printer_mutation() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        let missing = PrinterId::new(uuid::Uuid::from_u128(999));
        assert!(matches!(
            f.market.authorize_printer_mutation(f.owner, missing),
            Err(MarketplaceError::NotFound { kind: "printer" })
        ));
        assert!(matches!(
            f.market.authorize_printer_mutation(f.stranger, printer.id),
            Err(MarketplaceError::Forbidden(Denial::NotPrinterOwner))
        ));
        assert_eq!(
            f.market
                .authorize_printer_mutation(f.owner, printer.id)
                .unwrap(),
            printer
        );
    }

    #[test]
    fn test_delete_printer() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();

        assert!(matches!(
            f.market.delete_printer(f.stranger, printer.id),
            Err(MarketplaceError::Forbidden(_))
        ));
        f.market.delete_printer(f.owner, printer.id).unwrap();
        assert!(matches!(
            f.market.get_printer(printer.id),
            Err(MarketplaceError::NotFound { .. })
        ));
        assert!(matches!(
            f.market.delete_printer(f.owner, printer.id),
            Err(MarketplaceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_order_snapshots_printer_name() {
        let f = fixture();
        let (printer, order) = placed(&f);

        assert_eq!(order.printer_name, "Ender 3 Pro");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);

        f.market
            .update_printer(
                f.owner,
                printer.id,
                PrinterPatch {
                    name: Some("Ender 3 V2".to_string()),
                    ..PrinterPatch::default()
                },
            )
            .unwrap();
        assert_eq!(
            f.market.get_order(f.customer, order.id).unwrap().printer_name,
            "Ender 3 Pro"
        );
    }

    #[test]
    fn test_order_for_missing_printer() {
        let f = fixture();
        let missing = PrinterId::new(uuid::Uuid::from_u128(999));
        assert!(matches!(
            f.market.create_order(f.customer, order_request(missing)),
            Err(MarketplaceError::NotFound { kind: "printer" })
        ));
    }

    #[test]
    fn test_order_for_unavailable_printer_is_accepted() {
        let f = fixture();
        let mut listing = sample_listing();
        listing.status = PrinterStatus::Unavailable;
        let printer = f.market.create_printer(f.owner, listing).unwrap();

        assert!(f
            .market
            .create_order(f.customer, order_request(printer.id))
            .is_ok());
    }

    #[test]
    fn test_get_order_visibility() {
        let f = fixture();
        let (_, order) = placed(&f);

        assert!(f.market.get_order(f.customer, order.id).is_ok());
        assert!(f.market.get_order(f.owner, order.id).is_ok());
        assert!(matches!(
            f.market.get_order(f.stranger, order.id),
            Err(MarketplaceError::Forbidden(Denial::NotOrderParticipant))
        ));
    }

    #[test]
    fn test_customer_cannot_set_status_but_owner_can() {
        let f = fixture();
        let (_, order) = placed(&f);

        assert!(matches!(
            f.market
                .update_order(f.customer, order.id, status(OrderStatus::Approved)),
            Err(MarketplaceError::Forbidden(Denial::StatusRequiresPrinterOwner))
        ));

        let approved = f
            .market
            .update_order(f.owner, order.id, status(OrderStatus::Approved))
            .unwrap();
        assert_eq!(approved.status, OrderStatus::Approved);
        assert!(approved.updated_at > order.updated_at);

        assert!(matches!(
            f.market
                .update_order(f.owner, order.id, status(OrderStatus::Pending)),
            Err(MarketplaceError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_pending_to_completed_is_invalid() {
        let f = fixture();
        let (_, order) = placed(&f);

        assert!(matches!(
            f.market
                .update_order(f.owner, order.id, status(OrderStatus::Completed)),
            Err(MarketplaceError::InvalidTransition(_))
        ));
        assert_eq!(
            f.market.get_order(f.owner, order.id).unwrap().updated_at,
            order.updated_at
        );
    }

    #[test]
    fn test_either_participant_can_set_payment() {
        let f = fixture();
        let (_, first) = placed(&f);
        let (_, second) = placed(&f);

        let paid = f
            .market
            .update_order(f.customer, first.id, payment(PaymentStatus::Paid))
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let failed = f
            .market
            .update_order(f.owner, second.id, payment(PaymentStatus::Failed))
            .unwrap();
        assert_eq!(failed.payment_status, PaymentStatus::Failed);

        assert!(matches!(
            f.market
                .update_order(f.stranger, first.id, payment(PaymentStatus::Failed)),
            Err(MarketplaceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_empty_order_patch() {
        let f = fixture();
        let (_, order) = placed(&f);

        assert!(matches!(
            f.market
                .update_order(f.stranger, order.id, OrderPatch::default()),
            Err(MarketplaceError::Forbidden(_))
        ));
        for who in [f.customer, f.owner] {
            let before = f.market.get_order(who, order.id).unwrap();
            let touched = f
                .market
                .update_order(who, order.id, OrderPatch::default())
                .unwrap();
            assert!(touched.updated_at > before.updated_at);
            assert_eq!(touched.status, OrderStatus::Pending);
            assert_eq!(touched.payment_status, PaymentStatus::Pending);
        }
    }

    #[test]
    fn test_deleted_printer_revokes_owner_access() {
        let f = fixture();
        let (printer, order) = placed(&f);
        f.market.delete_printer(f.owner, printer.id).unwrap();

        assert!(f.market.get_order(f.customer, order.id).is_ok());
        assert!(matches!(
            f.market.get_order(f.owner, order.id),
            Err(MarketplaceError::Forbidden(_))
        ));
        assert!(f.market.list_orders(f.owner, OrderScope::Owner).is_empty());
    }

    #[test]
    fn test_list_orders_by_scope() {
        let f = fixture();
        let (_, incoming) = placed(&f);

        // The owner also orders from a printer the customer lists.
        let customers_printer = f
            .market
            .create_printer(f.customer, sample_listing())
            .unwrap();
        let outgoing = f
            .market
            .create_order(f.owner, order_request(customers_printer.id))
            .unwrap();

        let ids = |scope| -> Vec<OrderId> {
            f.market
                .list_orders(f.owner, scope)
                .into_iter()
                .map(|o| o.id)
                .collect()
        };
        assert_eq!(ids(OrderScope::Customer), vec![outgoing.id]);
        assert_eq!(ids(OrderScope::Owner), vec![incoming.id]);
        assert_eq!(ids(OrderScope::All), vec![incoming.id, outgoing.id]);
        assert!(f.market.list_orders(f.stranger, OrderScope::All).is_empty());
    }

    #[test]
    fn test_self_order_listed_once() {
        let f = fixture();
        let printer = f.market.create_printer(f.owner, sample_listing()).unwrap();
        f.market
            .create_order(f.owner, order_request(printer.id))
            .unwrap();

        assert_eq!(f.market.list_orders(f.owner, OrderScope::All).len(), 1);
    }
}
