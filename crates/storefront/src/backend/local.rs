//! Backend implementation over a local key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use atelier_core::{Email, ProductId};

use super::latency::pause;
use super::{ADMIN_PIN, Backend, BackendError, Latency, seed_catalog};
use crate::ids::fresh_product_id;
use crate::models::{Order, Product, ProductDraft, ProductPatch};
use crate::store::{KeyValueStore, StoreKeys};

/// In-memory copy of the persisted records.
#[derive(Debug, Default)]
struct Mirror {
    products: Vec<Product>,
    orders: Vec<Order>,
    subscribers: Vec<String>,
}

/// Backend facade over a [`KeyValueStore`].
///
/// Construct once per process with [`LocalBackend::open`] and share it as an
/// `Arc<dyn Backend>`. Each mutation is applied to a copy of the affected
/// record, persisted, and only then committed to the mirror, so a failed
/// write leaves the visible state unchanged.
pub struct LocalBackend {
    store: Arc<dyn KeyValueStore>,
    keys: StoreKeys,
    latency: Latency,
    mirror: RwLock<Mirror>,
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend")
            .field("keys", &self.keys)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl LocalBackend {
    /// Open the backend, loading every record and seeding the catalog if
    /// this is the first run.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be read or decoded, or if the
    /// seed catalog cannot be persisted.
    #[instrument(skip(store))]
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        keys: StoreKeys,
        latency: Latency,
    ) -> Result<Self, BackendError> {
        let backend = Self {
            store,
            keys,
            latency,
            mirror: RwLock::new(Mirror::default()),
        };
        backend.initialize_if_empty().await?;
        Ok(backend)
    }

    /// Load the persisted records into the mirror, seeding the catalog when
    /// the products record has never been written.
    ///
    /// An empty catalog is therefore never observable on first run; one that
    /// an admin emptied on purpose stays empty.
    async fn initialize_if_empty(&self) -> Result<(), BackendError> {
        let products = match self.load_record::<Product>(&self.keys.products()).await? {
            Some(products) => products,
            None => {
                let seed = seed_catalog().map_err(|e| BackendError::DataCorruption {
                    key: "fixtures/products.json".to_string(),
                    message: e.to_string(),
                })?;
                self.persist(&self.keys.products(), &seed).await?;
                info!(count = seed.len(), "Seeded product catalog");
                seed
            }
        };
        let orders = self
            .load_record::<Order>(&self.keys.orders())
            .await?
            .unwrap_or_default();
        let subscribers = self
            .load_record::<String>(&self.keys.subscribers())
            .await?
            .unwrap_or_default();

        debug!(
            products = products.len(),
            orders = orders.len(),
            subscribers = subscribers.len(),
            "Backend records loaded"
        );

        *self.mirror.write().await = Mirror {
            products,
            orders,
            subscribers,
        };
        Ok(())
    }

    async fn load_record<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Vec<T>>, BackendError> {
        let Some(value) = self.store.load(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| BackendError::DataCorruption {
                key: key.to_owned(),
                message: e.to_string(),
            })
    }

    async fn persist<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), BackendError> {
        let value = serde_json::to_value(records).map_err(crate::store::StoreError::from)?;
        self.store.save(key, &value).await.map_err(|e| {
            warn!(key, error = %e, "Failed to persist record");
            BackendError::from(e)
        })
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        pause(self.latency.read).await;
        Ok(self.mirror.read().await.products.clone())
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn add_product(&self, draft: ProductDraft) -> Result<Product, BackendError> {
        if draft.name.trim().is_empty() {
            return Err(BackendError::InvalidInput(
                "product name cannot be empty".to_string(),
            ));
        }
        if draft.price.amount.is_sign_negative() {
            return Err(BackendError::InvalidInput(
                "product price cannot be negative".to_string(),
            ));
        }
        pause(self.latency.write).await;

        let product = draft.into_product(fresh_product_id());
        let mut mirror = self.mirror.write().await;
        let mut products = Vec::with_capacity(mirror.products.len() + 1);
        products.push(product.clone());
        products.extend(mirror.products.iter().cloned());

        self.persist(&self.keys.products(), &products).await?;
        mirror.products = products;
        info!(id = %product.id, "Product added");
        Ok(product)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, BackendError> {
        pause(self.latency.write).await;

        let mut mirror = self.mirror.write().await;
        let mut products = mirror.products.clone();
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| BackendError::ProductNotFound(id.clone()))?;
        patch.apply(product);
        let updated = product.clone();

        self.persist(&self.keys.products(), &products).await?;
        mirror.products = products;
        info!("Product updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        pause(self.latency.write).await;

        let mut mirror = self.mirror.write().await;
        if !mirror.products.iter().any(|p| &p.id == id) {
            debug!("Delete of absent product ignored");
            return Ok(());
        }
        let products: Vec<Product> = mirror
            .products
            .iter()
            .filter(|p| &p.id != id)
            .cloned()
            .collect();

        self.persist(&self.keys.products(), &products).await?;
        mirror.products = products;
        info!("Product deleted");
        Ok(())
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create_order(&self, order: Order) -> Result<Order, BackendError> {
        pause(self.latency.create_order).await;

        let mut mirror = self.mirror.write().await;
        let mut orders = Vec::with_capacity(mirror.orders.len() + 1);
        orders.push(order.clone());
        orders.extend(mirror.orders.iter().cloned());

        self.persist(&self.keys.orders(), &orders).await?;
        mirror.orders = orders;
        info!(total = %order.totals.total, "Order created");
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
        pause(self.latency.read).await;
        Ok(self.mirror.read().await.orders.clone())
    }

    #[instrument(skip(self))]
    async fn clear_orders(&self) -> Result<(), BackendError> {
        pause(self.latency.write).await;

        let mut mirror = self.mirror.write().await;
        self.persist::<Order>(&self.keys.orders(), &[]).await?;
        let cleared = std::mem::take(&mut mirror.orders).len();
        warn!(cleared, "Order history cleared");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn add_subscriber(&self, email: &str) -> Result<bool, BackendError> {
        let email = Email::parse(email)
            .map_err(|e| BackendError::InvalidInput(e.to_string()))?
            .into_inner();
        pause(self.latency.write).await;

        let mut mirror = self.mirror.write().await;
        if mirror.subscribers.contains(&email) {
            debug!("Subscriber already present");
            return Ok(false);
        }
        let mut subscribers = mirror.subscribers.clone();
        subscribers.push(email);

        self.persist(&self.keys.subscribers(), &subscribers).await?;
        mirror.subscribers = subscribers;
        info!(count = mirror.subscribers.len(), "Subscriber added");
        Ok(true)
    }

    async fn list_subscribers(&self) -> Result<Vec<String>, BackendError> {
        pause(self.latency.read).await;
        Ok(self.mirror.read().await.subscribers.clone())
    }

    async fn verify_admin_pin(&self, pin: &str) -> bool {
        pause(self.latency.verify_pin).await;
        let ok = pin == ADMIN_PIN;
        if !ok {
            warn!("Admin PIN rejected");
        }
        ok
    }
}
