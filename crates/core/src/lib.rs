//! ecom-cart Core - Shared domain types.
//!
//! This crate provides the types used across all ecom-cart components:
//! - `server` - JSON HTTP API (signup, catalog, cart, addresses, checkout)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, validated emails/phones, prices, and the
//!   product / cart / address / order documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
