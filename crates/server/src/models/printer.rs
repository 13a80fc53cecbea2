//! Printer domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printshare_core::{Price, PrinterId, PrinterStatus, UserId};

/// A rentable printer listed by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub id: PrinterId,
    /// The listing user. Never changes after creation.
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub specifications: Specifications,
    pub price_per_hour: Price,
    pub location: String,
    /// Image references in display order.
    pub images: Vec<String>,
    pub status: PrinterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hardware capabilities of a printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    /// e.g. `220x220x250mm`
    pub build_volume: String,
    /// e.g. `0.1-0.3mm`
    pub layer_height: String,
    /// Supported filament/resin names, deduplicated.
    #[serde(default)]
    pub materials: BTreeSet<String>,
    /// e.g. `FDM`, `SLA`
    pub technology: String,
}

/// Fields supplied when listing a new printer.
///
/// The owner, ID and timestamps are assigned by the marketplace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrinter {
    pub name: String,
    pub description: String,
    pub specifications: Specifications,
    pub price_per_hour: Price,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: PrinterStatus,
}

/// A partial printer update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub specifications: Option<SpecificationsPatch>,
    pub price_per_hour: Option<Price>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<PrinterStatus>,
}

/// A partial update of [`Specifications`], merged field by field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationsPatch {
    pub build_volume: Option<String>,
    pub layer_height: Option<String>,
    pub materials: Option<BTreeSet<String>>,
    pub technology: Option<String>,
}

impl Printer {
    /// Build a printer record from its listing fields.
    #[must_use]
    pub fn from_listing(
        id: PrinterId,
        owner_id: UserId,
        listing: NewPrinter,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: listing.name,
            description: listing.description,
            specifications: listing.specifications,
            price_per_hour: listing.price_per_hour,
            location: listing.location,
            images: listing.images,
            status: listing.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the printer currently accepts orders.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == PrinterStatus::Available
    }
}

impl PrinterPatch {
    /// Merge the provided fields into `printer`.
    ///
    /// Ownership, ID and timestamps are not patchable; the store stamps
    /// `updated_at` itself.
    pub fn apply(self, printer: &mut Printer) {
        if let Some(name) = self.name {
            printer.name = name;
        }
        if let Some(description) = self.description {
            printer.description = description;
        }
        if let Some(specifications) = self.specifications {
            specifications.apply(&mut printer.specifications);
        }
        if let Some(price) = self.price_per_hour {
            printer.price_per_hour = price;
        }
        if let Some(location) = self.location {
            printer.location = location;
        }
        if let Some(images) = self.images {
            printer.images = images;
        }
        if let Some(status) = self.status {
            printer.status = status;
        }
    }
}

impl SpecificationsPatch {
    fn apply(self, specs: &mut Specifications) {
        if let Some(build_volume) = self.build_volume {
            specs.build_volume = build_volume;
        }
        if let Some(layer_height) = self.layer_height {
            specs.layer_height = layer_height;
        }
        if let Some(materials) = self.materials {
            specs.materials = materials;
        }
        if let Some(technology) = self.technology {
            specs.technology = technology;
        }
    }
}
