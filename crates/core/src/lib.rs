//! PrintShare Core - Shared types library.
//!
//! This crate provides common types used across all PrintShare components:
//! - `server` - Marketplace service and JSON API
//! - `integration-tests` - End-to-end tests against the server router
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
