//! Session cart.
//!
//! Lives only as long as the session; never persisted.

use serde::{Deserialize, Serialize};

use atelier_core::{Price, ProductId};

use crate::models::{CartItem, OrderTotals, Product};

/// An ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of `product`. Repeat adds bump the existing line.
    ///
    /// Returns the line's new quantity.
    pub fn add(&mut self, product: Product) -> u32 {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.items.push(CartItem {
            product,
            quantity: 1,
        });
        1
    }

    /// Remove a line outright. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.product.id != id);
        self.items.len() != before
    }

    pub fn increment(&mut self, id: &ProductId) -> Option<u32> {
        let line = self.line_mut(id)?;
        line.quantity = line.quantity.saturating_add(1);
        Some(line.quantity)
    }

    /// Decrease a line by one unit. Quantity floors at 1; removal needs an
    /// explicit [`Cart::remove`].
    pub fn decrement(&mut self, id: &ProductId) -> Option<u32> {
        let line = self.line_mut(id)?;
        line.quantity = line.quantity.saturating_sub(1).max(1);
        Some(line.quantity)
    }

    /// Set a line's quantity. Zero is ignored.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) -> Option<u32> {
        let line = self.line_mut(id)?;
        if quantity > 0 {
            line.quantity = quantity;
        }
        Some(line.quantity)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| &line.product.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        OrderTotals::for_items(&self.items).subtotal
    }

    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::for_items(&self.items)
    }

    /// Deep copy of the lines, for embedding in an order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|line| &line.product.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::{Category, CurrencyCode};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Price::from_cents(cents, CurrencyCode::EUR),
            category: Category::Art,
            description: String::new(),
            history: String::new(),
            image: String::new(),
            in_stock: true,
        }
    }

    #[test]
    fn test_repeat_add_is_one_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product("a", 1000)), 1);
        assert_eq!(cart.add(product("a", 1000)), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(product("a", 1000));
        assert_eq!(cart.decrement(&ProductId::new("a")), Some(1));
        assert_eq!(cart.decrement(&ProductId::new("a")), Some(1));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_is_ignored() {
        let mut cart = Cart::new();
        cart.add(product("a", 1000));
        assert_eq!(cart.set_quantity(&ProductId::new("a"), 4), Some(4));
        assert_eq!(cart.set_quantity(&ProductId::new("a"), 0), Some(4));
        assert_eq!(cart.set_quantity(&ProductId::new("zzz"), 2), None);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(product("a", 1000));
        cart.add(product("b", 500));
        assert!(cart.remove(&ProductId::new("a")));
        assert!(!cart.remove(&ProductId::new("a")));
        assert_eq!(cart.items()[0].product.id.as_str(), "b");
    }

    #[test]
    fn test_single_hundred_euro_item() {
        let mut cart = Cart::new();
        cart.add(product("a", 10_000));

        let totals = cart.totals();
        assert_eq!(totals.subtotal.amount, Decimal::new(10_000, 2));
        assert_eq!(totals.total.amount, Decimal::new(13_750, 2));
        assert_eq!(totals.total.to_string(), "€137.50");
    }

    #[test]
    fn test_total_formula_holds_after_edits() {
        let mut cart = Cart::new();
        cart.add(product("a", 1999));
        cart.add(product("b", 4550));
        cart.add(product("a", 1999));
        cart.increment(&ProductId::new("b"));
        cart.set_quantity(&ProductId::new("a"), 5);
        cart.decrement(&ProductId::new("b"));
        cart.add(product("c", 1));
        cart.remove(&ProductId::new("c"));

        let expected_subtotal: Decimal = cart
            .items()
            .iter()
            .map(|line| line.product.price.amount * Decimal::from(line.quantity))
            .sum();
        let totals = cart.totals();
        assert_eq!(totals.subtotal.amount, expected_subtotal);
        assert_eq!(
            totals.total.amount,
            expected_subtotal + Decimal::new(2500, 2) + Decimal::new(1250, 2)
        );
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut cart = Cart::new();
        cart.add(product("a", 1000));
        let snapshot = cart.snapshot();
        cart.increment(&ProductId::new("a"));
        cart.clear();
        assert_eq!(snapshot[0].quantity, 1);
        assert!(cart.is_empty());
    }
}
