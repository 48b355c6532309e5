//! CLI command implementations.

pub mod admin;
pub mod ask;
pub mod catalog;
pub mod checkout;
pub mod translate;

