//! Order pricing.
//!
//! Shipping and duties are flat per order, independent of weight and
//! destination.

use rust_decimal::Decimal;

use atelier_core::{CurrencyCode, Price};

use crate::models::{CartItem, OrderTotals};

/// Flat shipping charge per order.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(2500, 0, 0, false, 2);

/// Flat import duties per order.
pub const DUTIES_FLAT: Decimal = Decimal::from_parts(1250, 0, 0, false, 2);

impl OrderTotals {
    /// `total = Σ(unit price × quantity) + shipping + duties`.
    ///
    /// Amounts are in the currency of the first line (EUR for an empty list).
    #[must_use]
    pub fn for_items(items: &[CartItem]) -> Self {
        let currency = items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.product.price.currency_code);

        let subtotal = items
            .iter()
            .map(CartItem::line_total)
            .fold(Price::zero(currency), |acc, line| acc + line);
        let shipping = Price::new(SHIPPING_FLAT, currency);
        let duties = Price::new(DUTIES_FLAT, currency);

        Self {
            subtotal,
            shipping,
            duties,
            total: subtotal + shipping + duties,
        }
    }
}
