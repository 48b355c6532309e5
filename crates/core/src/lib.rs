//! Atelier Core - Shared types library.
//!
//! This crate provides the domain types used across all Atelier components:
//! - `storefront` - Catalog, cart, checkout, translation and admin services
//! - `cli` - Command-line surface over the storefront services
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, languages and the
//!   catalog/order enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
