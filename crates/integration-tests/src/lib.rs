//! Integration tests for Atelier.
//!
//! Scenario tests drive the storefront services end to end over an
//! in-memory store and a scripted text generator, so they need no network,
//! no API key and no disk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `backend_facade` - Catalog, orders and subscribers through the backend
//! - `translation_pipeline` - Dictionary, translation memory, cache and remote tiers
//! - `checkout_flow` - Cart to confirmed order, including failed submissions

use std::sync::Arc;

use atelier_storefront::claude::TextGenerator;
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::models::ShippingDetails;
use atelier_storefront::state::AppState;
use atelier_storefront::store::MemoryStore;
use atelier_storefront::testing::{Reply, ScriptedGenerator};

/// A card number that passes the Luhn check.
pub const TEST_VISA: &str = "4242 4242 4242 4242";

/// Application state over an in-memory store, with handles kept for
/// inspection and fault injection.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub generator: Option<Arc<ScriptedGenerator>>,
}

impl TestContext {
    /// Fresh store, no text service.
    pub async fn new() -> Self {
        Self::over(Arc::new(MemoryStore::new()), None).await
    }

    /// Fresh store with a scripted text service.
    pub async fn with_reply(reply: Reply) -> Self {
        Self::over(
            Arc::new(MemoryStore::new()),
            Some(Arc::new(ScriptedGenerator::new(reply))),
        )
        .await
    }

    /// State over an existing store, as after a restart.
    pub async fn over(store: Arc<MemoryStore>, generator: Option<Arc<ScriptedGenerator>>) -> Self {
        let config = StorefrontConfig {
            simulate_latency: false,
            ..StorefrontConfig::default()
        };
        let state = AppState::with_parts(
            config,
            store.clone(),
            generator.clone().map(|g| g as Arc<dyn TextGenerator>),
        )
        .await
        .expect("Failed to build test state");

        Self {
            state,
            store,
            generator,
        }
    }

    /// Remote calls made so far.
    pub fn remote_calls(&self) -> usize {
        self.generator.as_ref().map_or(0, |g| g.calls())
    }
}

/// Shipping details that pass validation.
pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        full_name: "Amara Diallo".to_string(),
        email: "amara@example.org".to_string(),
        address: "12 Rue Oberkampf".to_string(),
        city: "Paris".to_string(),
        postal_code: "75011".to_string(),
        country: "France".to_string(),
        phone: String::new(),
    }
}
