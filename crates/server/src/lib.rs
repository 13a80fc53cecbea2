//! PrintShare marketplace library.
//!
//! Holds the credential store, the printer and order stores, the access
//! policies and order lifecycle, and the JSON API over them. The binary in
//! `main.rs` only wires configuration, logging and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
