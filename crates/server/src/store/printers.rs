//! Printer storage.

use chrono::{DateTime, Utc};

use printshare_core::{PrinterId, UserId};

use super::{Collection, Record, StoreError};
use crate::models::{Printer, PrinterPatch};

impl Record for Printer {
    type Id = PrinterId;
    const KIND: &'static str = "printer";

    fn id(&self) -> PrinterId {
        self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// All listed printers.
#[derive(Default)]
pub struct PrinterStore {
    printers: Collection<Printer>,
}

impl PrinterStore {
    /// Store a newly built printer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID is already in use.
    pub fn add(&self, printer: Printer) -> Result<Printer, StoreError> {
        self.printers.insert(printer)
    }

    #[must_use]
    pub fn get_by_id(&self, id: PrinterId) -> Option<Printer> {
        self.printers.get(id)
    }

    /// Every printer, in listing order.
    #[must_use]
    pub fn all(&self) -> Vec<Printer> {
        self.printers.list(|_| true)
    }

    /// Printers currently accepting orders.
    #[must_use]
    pub fn available_only(&self) -> Vec<Printer> {
        self.printers.list(Printer::is_available)
    }

    /// Printers listed by `owner_id`.
    #[must_use]
    pub fn by_owner(&self, owner_id: UserId) -> Vec<Printer> {
        self.printers.list(|p| p.owner_id == owner_id)
    }

    /// Merge `patch` into the stored printer.
    ///
    /// `check` sees the current record under the entry lock and may veto the
    /// change, in which case nothing is written. Returns `Ok(None)` if the
    /// printer does not exist.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `check`.
    pub fn update<E>(
        &self,
        id: PrinterId,
        patch: PrinterPatch,
        check: impl FnOnce(&Printer) -> Result<(), E>,
    ) -> Result<Option<Printer>, E> {
        self.printers.update(id, |printer| {
            check(printer)?;
            patch.apply(printer);
            Ok(())
        })
    }

    /// Delete a printer. Returns `true` if it existed.
    pub fn remove(&self, id: PrinterId) -> bool {
        self.printers.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.printers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    pub fn clear(&self) {
        self.printers.clear();
    }
}
