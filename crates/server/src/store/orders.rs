//! Order storage.

use chrono::{DateTime, Utc};

use printshare_core::{OrderId, UserId};

use super::{Collection, Record, StoreError};
use crate::models::Order;

impl Record for Order {
    type Id = OrderId;
    const KIND: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// All placed orders.
#[derive(Default)]
pub struct OrderStore {
    orders: Collection<Order>,
}

impl OrderStore {
    /// Store a newly placed order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID is already in use.
    pub fn add(&self, order: Order) -> Result<Order, StoreError> {
        self.orders.insert(order)
    }

    #[must_use]
    pub fn get_by_id(&self, id: OrderId) -> Option<Order> {
        self.orders.get(id)
    }

    /// Orders matching `predicate`, in placement order.
    pub fn list(&self, predicate: impl FnMut(&Order) -> bool) -> Vec<Order> {
        self.orders.list(predicate)
    }

    /// Orders placed by `customer_id`.
    #[must_use]
    pub fn by_customer(&self, customer_id: UserId) -> Vec<Order> {
        self.orders.list(|o| o.customer_id == customer_id)
    }

    /// Mutate an order under its entry lock.
    ///
    /// `change` validates and edits a draft; an `Err` discards the draft.
    /// Returns `Ok(None)` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `change`.
    pub fn update_with<E>(
        &self,
        id: OrderId,
        change: impl FnOnce(&mut Order) -> Result<(), E>,
    ) -> Result<Option<Order>, E> {
        self.orders.update(id, change)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&self) {
        self.orders.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::convert::Infallible;

    use printshare_core::{IdGenerator, OrderStatus, Price, PrinterId, SequentialIds};

    use super::*;
    use crate::models::NewOrder;
    use crate::models::printer::tests::sample_listing;
    use crate::models::Printer;
    use crate::store::ResourceStore;

    fn place(store: &OrderStore, ids: &SequentialIds, customer: UserId, printer: PrinterId) -> Order {
        let order = Order::place(
            OrderId::generate(ids),
            customer,
            "Ender 3 Pro".to_string(),
            NewOrder {
                printer_id: printer,
                model_file_url: "/models/bracket.stl".to_string(),
                model_file_name: "bracket.stl".to_string(),
                total_price: Price::from_units(45).unwrap(),
            },
            Utc::now(),
        );
        store.add(order).unwrap()
    }

    #[test]
    fn test_by_customer() {
        let store = OrderStore::default();
        let ids = SequentialIds::new();
        let alice = UserId::new(ids.next_uuid());
        let bob = UserId::new(ids.next_uuid());
        let printer = PrinterId::generate(&ids);

        let first = place(&store, &ids, alice, printer);
        place(&store, &ids, bob, printer);
        let second = place(&store, &ids, alice, printer);

        let mine: Vec<OrderId> = store.by_customer(alice).into_iter().map(|o| o.id).collect();
        assert_eq!(mine, vec![first.id, second.id]);
    }

    #[test]
    fn test_update_with_commits_change() {
        let store = OrderStore::default();
        let ids = SequentialIds::new();
        let order = place(&store, &ids, UserId::new(ids.next_uuid()), PrinterId::generate(&ids));

        let updated = store
            .update_with(order.id, |o| {
                o.status = OrderStatus::Approved;
                Ok::<_, Infallible>(())
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Approved);
        assert!(updated.updated_at > order.updated_at);
        assert_eq!(store.get_by_id(order.id).unwrap(), updated);
    }

    #[test]
    fn test_orders_for_printer_owner_joins_through_printers() {
        let resources = ResourceStore::new();
        let ids = SequentialIds::new();
        let owner = UserId::new(ids.next_uuid());
        let other_owner = UserId::new(ids.next_uuid());
        let customer = UserId::new(ids.next_uuid());

        let mine = resources
            .printers()
            .add(Printer::from_listing(
                PrinterId::generate(&ids),
                owner,
                sample_listing(),
                Utc::now(),
            ))
            .unwrap();
        let theirs = resources
            .printers()
            .add(Printer::from_listing(
                PrinterId::generate(&ids),
                other_owner,
                sample_listing(),
                Utc::now(),
            ))
            .unwrap();

        let on_mine = place(resources.orders(), &ids, customer, mine.id);
        place(resources.orders(), &ids, customer, theirs.id);

        let incoming: Vec<OrderId> = resources
            .orders_for_printer_owner(owner)
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(incoming, vec![on_mine.id]);
        assert_eq!(resources.printer_owner_of(mine.id), Some(owner));

        resources.printers().remove(mine.id);
        assert!(resources.orders_for_printer_owner(owner).is_empty());
        assert_eq!(resources.printer_owner_of(mine.id), None);
    }
}
