//! Domain models for the marketplace.
//!
//! - [`user`] - Registered accounts and their public identity
//! - [`printer`] - Rentable printers and partial updates to them
//! - [`order`] - Print orders and status changes
//! - [`session`] - Identity carried in the cookie session

pub mod order;
pub mod printer;
pub mod session;
pub mod user;

pub use order::{NewOrder, Order, OrderPatch, OrderScope};
pub use printer::{NewPrinter, Printer, PrinterPatch, Specifications, SpecificationsPatch};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserIdentity};
