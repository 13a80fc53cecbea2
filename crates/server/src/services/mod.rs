//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Credential storage, registration and password login
//! - `marketplace` - Printer and order operations
//! - `policy` - Pure access decisions over caller and resource
//! - `lifecycle` - Order status and payment state machines

pub mod auth;
pub mod lifecycle;
pub mod marketplace;
pub mod policy;

pub use auth::{AuthError, AuthService, CredentialStore, HashCost};
pub use marketplace::{Marketplace, MarketplaceError};
