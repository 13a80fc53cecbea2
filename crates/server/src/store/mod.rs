//! In-memory resource storage.
//!
//! # Collections
//!
//! - [`PrinterStore`] - printers, indexed by `PrinterId`
//! - [`OrderStore`] - orders, indexed by `OrderId`
//!
//! Both are thin typed wrappers over [`Collection`], a sharded concurrent map.
//! Mutations of one record hold that record's exclusive entry guard from
//! validation to commit, so concurrent updates of the same ID are serialized
//! while readers and writers of other IDs proceed.
//!
//! Nothing here checks permissions or field contents. The store only owns ID
//! uniqueness and `updated_at` bookkeeping.

pub mod orders;
pub mod printers;

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use printshare_core::{PrinterId, UserId};

pub use orders::OrderStore;
pub use printers::PrinterStore;

use crate::models::Order;

/// Errors raised by the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same ID already exists.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// A record that can live in a [`Collection`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Primary key type.
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;

    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    /// This record's primary key.
    fn id(&self) -> Self::Id;

    /// When the record was last modified.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Set the modification timestamp.
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

struct Slot<T> {
    /// Insertion sequence number, used to keep listings in insertion order.
    seq: u64,
    record: T,
}

/// A concurrent, insertion-ordered map of records keyed by ID.
pub struct Collection<T: Record> {
    records: DashMap<T::Id, Slot<T>>,
    next_seq: AtomicU64,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its pre-assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID is already taken.
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        match self.records.entry(record.id()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            ))),
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot {
                    seq,
                    record: record.clone(),
                });
                Ok(record)
            }
        }
    }

    /// Get a copy of the record with the given ID.
    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<T> {
        self.records.get(&id).map(|slot| slot.record.clone())
    }

    /// All records matching `predicate`, in insertion order.
    pub fn list(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        let mut hits: Vec<(u64, T)> = self
            .records
            .iter()
            .filter(|slot| predicate(&slot.record))
            .map(|slot| (slot.seq, slot.record.clone()))
            .collect();
        hits.sort_unstable_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, record)| record).collect()
    }

    /// Apply `change` to the record with the given ID.
    ///
    /// The change runs against a draft copy while the record's entry is
    /// exclusively locked. If it returns `Err`, the stored record is left
    /// untouched. On success the draft replaces the record and `updated_at`
    /// is stamped with a time strictly after the previous stamp.
    ///
    /// Returns `Ok(None)` if no record has this ID.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `change`.
    pub fn update<E>(
        &self,
        id: T::Id,
        change: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<Option<T>, E> {
        let Some(mut slot) = self.records.get_mut(&id) else {
            return Ok(None);
        };

        let mut draft = slot.record.clone();
        change(&mut draft)?;
        draft.set_updated_at(next_stamp(slot.record.updated_at()));
        slot.record = draft.clone();

        Ok(Some(draft))
    }

    /// Remove the record with the given ID. Returns `true` if it existed.
    pub fn remove(&self, id: T::Id) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.clear();
    }
}

/// Current time, nudged forward if the clock has not moved past `previous`.
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

/// The marketplace's resource storage: printers and orders.
///
/// Constructed once by the process entry point and shared through
/// `AppState`; there is no global instance.
#[derive(Default)]
pub struct ResourceStore {
    printers: PrinterStore,
    orders: OrderStore,
}

impl ResourceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Printer collection.
    #[must_use]
    pub const fn printers(&self) -> &PrinterStore {
        &self.printers
    }

    /// Order collection.
    #[must_use]
    pub const fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Owner of the given printer, if the printer still exists.
    #[must_use]
    pub fn printer_owner_of(&self, printer_id: PrinterId) -> Option<UserId> {
        self.printers.get_by_id(printer_id).map(|p| p.owner_id)
    }

    /// Orders placed against any printer owned by `owner_id`.
    ///
    /// Orders whose printer has since been deleted are not included.
    #[must_use]
    pub fn orders_for_printer_owner(&self, owner_id: UserId) -> Vec<Order> {
        let owned: HashSet<PrinterId> = self
            .printers
            .by_owner(owner_id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        if owned.is_empty() {
            return Vec::new();
        }
        self.orders.list(|o| owned.contains(&o.printer_id))
    }

    /// Orders `user_id` placed or received, each listed once.
    #[must_use]
    pub fn orders_involving(&self, user_id: UserId) -> Vec<Order> {
        let owned: HashSet<PrinterId> = self
            .printers
            .by_owner(user_id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        self.orders
            .list(|o| o.customer_id == user_id || owned.contains(&o.printer_id))
    }

    /// Drop every printer and order.
    pub fn clear(&self) {
        self.orders.clear();
        self.printers.clear();
    }
}
