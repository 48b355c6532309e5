//! Atelier storefront library.
//!
//! The storefront core for a boutique of cultural goods: a persistent
//! key-value store shim, the backend facade over it, the translation
//! pipeline, cart math, the checkout wizard, the curator chat and the admin
//! gate. [`state::AppState`] wires them together once per process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod backend;
pub mod cart;
pub mod checkout;
pub mod claude;
pub mod config;
pub mod curator;
pub mod error;
pub mod ids;
pub mod models;
pub mod state;
pub mod store;
pub mod testing;
pub mod translation;
