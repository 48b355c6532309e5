//! Order records and the values snapshotted into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{CardNetwork, LanguageCode, OrderId, OrderStatus, PaymentMethod, Price};

use super::Product;

/// A product plus a quantity (always >= 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Computed order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub duties: Price,
    pub total: Price,
}

/// Shipping and contact details collected in the first checkout step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// A placed order.
///
/// `items` is a by-value snapshot of the cart at checkout time; later edits
/// to the catalog or the live cart never reach it. Everything except
/// `status` is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_network: Option<CardNetwork>,
    pub language: LanguageCode,
    pub status: OrderStatus,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
