//! Seed catalog loaded on first run.

use crate::models::Product;

const PRODUCTS_JSON: &str = include_str!("../../fixtures/products.json");

/// The bundled fixture catalog.
///
/// # Errors
///
/// Returns an error if the bundled JSON does not match the product schema.
pub fn seed_catalog() -> Result<Vec<Product>, serde_json::Error> {
    serde_json::from_str(PRODUCTS_JSON)
}
