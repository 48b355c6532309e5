//! Domain models for the storefront.
//!
//! These are the records persisted by the backend facade and passed between
//! the cart, checkout and admin services.

pub mod order;
pub mod product;

pub use order::{CartItem, Order, OrderTotals, ShippingDetails};
pub use product::{Product, ProductDraft, ProductPatch};
