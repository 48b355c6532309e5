//! Backend facade over the persistent store.
//!
//! # Architecture
//!
//! - [`Backend`] is the interface contract every consumer depends on
//!   (checkout, admin, CLI). Consumers receive an `Arc<dyn Backend>`; there is
//!   no global instance.
//! - [`LocalBackend`] implements it over a [`KeyValueStore`](crate::store::KeyValueStore)
//!   with an in-memory mirror, persisting the whole record after each
//!   mutation.
//! - Every operation sleeps for a simulated network round-trip
//!   (see [`Latency`]).
//!
//! # Ordering
//!
//! Product and order listings are newest first: inserts prepend. The
//! subscriber list keeps insertion order.

mod fixtures;
mod latency;
mod local;

pub use fixtures::seed_catalog;
pub use latency::{Latency, pause};
pub use local::LocalBackend;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use atelier_core::{CurrencyCode, Price, ProductId};

use crate::models::{Order, Product, ProductDraft, ProductPatch};
use crate::store::StoreError;

/// Placeholder admin PIN. Not a security boundary.
pub const ADMIN_PIN: &str = "1234";

/// Errors returned by backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Persisting or loading a record failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The request was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored record could not be decoded.
    #[error("data corruption in {key}: {message}")]
    DataCorruption { key: String, message: String },
}

/// The storefront's backend operations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The full catalog, newest first. Callers get their own copy.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Add a product with a freshly assigned id; it appears first in listings.
    async fn add_product(&self, draft: ProductDraft) -> Result<Product, BackendError>;

    /// Merge `patch` into an existing product.
    ///
    /// Fails with [`BackendError::ProductNotFound`] if `id` is absent.
    async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, BackendError>;

    /// Remove a product. Removing an absent id is a no-op.
    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError>;

    /// Append an order to the history. Never rejects on business rules and
    /// never deduplicates.
    async fn create_order(&self, order: Order) -> Result<Order, BackendError>;

    /// Order history, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, BackendError>;

    /// Delete every order. Irreversible.
    async fn clear_orders(&self) -> Result<(), BackendError>;

    /// Add a newsletter subscriber. Returns `false` if the exact string was
    /// already subscribed.
    async fn add_subscriber(&self, email: &str) -> Result<bool, BackendError>;

    /// Subscribers in insertion order.
    async fn list_subscribers(&self) -> Result<Vec<String>, BackendError>;

    /// Compare `pin` with [`ADMIN_PIN`] after an artificial delay.
    async fn verify_admin_pin(&self, pin: &str) -> bool;
}

/// Dashboard figures derived from the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_count: usize,
    pub units_sold: u32,
    pub revenue: Price,
    pub average_order_value: Price,
    pub subscriber_count: usize,
}

impl OrderSummary {
    /// Summarize `orders` and the subscriber count.
    #[must_use]
    pub fn compute(orders: &[Order], subscriber_count: usize) -> Self {
        let currency = orders
            .first()
            .map_or(CurrencyCode::default(), |o| o.totals.total.currency_code);
        let revenue: Decimal = orders.iter().map(|o| o.totals.total.amount).sum();
        let average = if orders.is_empty() {
            Decimal::ZERO
        } else {
            (revenue / Decimal::from(orders.len() as u64)).round_dp(2)
        };

        Self {
            order_count: orders.len(),
            units_sold: orders.iter().map(Order::unit_count).sum(),
            revenue: Price::new(revenue, currency),
            average_order_value: Price::new(average, currency),
            subscriber_count,
        }
    }
}

/// Dashboard summary computed through any backend.
///
/// # Errors
///
/// Returns an error if the orders or subscribers cannot be listed.
pub async fn order_summary(backend: &dyn Backend) -> Result<OrderSummary, BackendError> {
    let orders = backend.list_orders().await?;
    let subscribers = backend.list_subscribers().await?;
    Ok(OrderSummary::compute(&orders, subscribers.len()))
}
