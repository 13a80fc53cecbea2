//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are never derived from wall-clock time. Entities receive their ID from
//! an [`IdGenerator`] injected at construction time, so two creations in the
//! same instant cannot collide.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_uuid()`, `generate()`
/// - `Display`, `FromStr`, `From<Uuid>` and `Into<Uuid>` implementations
///
/// # Example
///
/// ```rust
/// # use printshare_core::{define_id, SequentialIds};
/// define_id!(InvoiceId);
/// define_id!(ShipmentId);
///
/// let ids = SequentialIds::new();
/// let invoice_id = InvoiceId::generate(&ids);
/// let shipment_id = ShipmentId::generate(&ids);
/// assert_ne!(invoice_id.as_uuid(), shipment_id.as_uuid());
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = shipment_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new ID from a UUID value.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Draw a fresh ID from the given generator.
            #[must_use]
            pub fn generate<G: $crate::IdGenerator + ?Sized>(ids: &G) -> Self {
                Self(ids.next_uuid())
            }

            /// Get the underlying UUID value.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(PrinterId);
define_id!(OrderId);

/// Source of fresh, unique identifiers.
///
/// Stores never mint IDs themselves; the service that creates an entity asks
/// its injected generator instead.
pub trait IdGenerator: Send + Sync {
    /// Return a UUID that this generator has never returned before.
    fn next_uuid(&self) -> Uuid;
}

/// Random v4 UUIDs. The production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Monotonic counter rendered as a UUID (`00000000-...-000000000001`, ...).
///
/// Deterministic, which makes it convenient in tests and seed data.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Create a generator whose first ID is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_uuid(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(n))
    }
}
