//! Generators for product ids and human-readable reference tokens.

use chrono::Utc;
use rand::Rng;

use atelier_core::{OrderId, ProductId};

const LOWER_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
// No 0/O or 1/I, so tokens survive being read aloud or copied by hand.
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a random string of `length` characters drawn from `charset`.
fn random_string(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset.get(idx).copied().map(char::from)
        })
        .collect()
}

/// A fresh product id: unix milliseconds plus a random suffix.
///
/// Collisions require two ids minted in the same millisecond with the same
/// six-character suffix, which is treated as impossible.
#[must_use]
pub fn fresh_product_id() -> ProductId {
    ProductId::new(format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        random_string(LOWER_ALNUM, 6)
    ))
}

/// A human-readable order reference such as `ORD-7QK2M9XA`.
#[must_use]
pub fn order_reference() -> OrderId {
    OrderId::new(format!("ORD-{}", random_string(REFERENCE_CHARSET, 8)))
}

/// A bank-transfer payment reference such as `ATL-4HX9K2MPQR`.
#[must_use]
pub fn bank_reference() -> String {
    format!("ATL-{}", random_string(REFERENCE_CHARSET, 10))
}
