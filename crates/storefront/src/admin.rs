//! Admin gate and dashboard operations.
//!
//! The gate is a fixed PIN with an artificial delay. It keeps casual
//! visitors out of the dashboard and nothing more; it is not an
//! authentication boundary.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use atelier_core::ProductId;

use crate::backend::{Backend, OrderSummary, order_summary};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{Order, Product, ProductDraft, ProductPatch};

/// Dashboard session; locked until [`AdminSession::unlock`] succeeds.
#[derive(Clone)]
pub struct AdminSession {
    backend: Arc<dyn Backend>,
    unlocked: bool,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("unlocked", &self.unlocked)
            .finish_non_exhaustive()
    }
}

impl AdminSession {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            unlocked: false,
        }
    }

    /// Check `pin` and unlock on success. Returns whether the session is
    /// now unlocked.
    pub async fn unlock(&mut self, pin: &str) -> bool {
        self.unlocked = self.backend.verify_admin_pin(pin).await;
        if self.unlocked {
            add_breadcrumb("admin", "Dashboard unlocked", None);
        }
        self.unlocked
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.ensure_unlocked()?;
        Ok(self.backend.list_products().await?)
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked, [`AppError::InvalidInput`]
    /// for a blank name or negative price.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product> {
        self.ensure_unlocked()?;
        let product = self.backend.add_product(draft).await?;
        info!(product_id = %product.id, "Product added");
        add_breadcrumb("admin", "Added product", Some(&[("product_id", product.id.as_str())]));
        Ok(product)
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked, [`AppError::NotFound`] for
    /// an unknown id.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product> {
        self.ensure_unlocked()?;
        if patch.is_empty() {
            return Err(AppError::InvalidInput("nothing to update".to_string()));
        }
        let product = self.backend.update_product(id, patch).await?;
        add_breadcrumb("admin", "Updated product", Some(&[("product_id", id.as_str())]));
        Ok(product)
    }

    /// Delete a product. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.ensure_unlocked()?;
        self.backend.delete_product(id).await?;
        add_breadcrumb("admin", "Deleted product", Some(&[("product_id", id.as_str())]));
        Ok(())
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.ensure_unlocked()?;
        Ok(self.backend.list_orders().await?)
    }

    /// Delete the whole order history. Irreversible.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    pub async fn clear_orders(&self) -> Result<()> {
        self.ensure_unlocked()?;
        self.backend.clear_orders().await?;
        warn!("Order history cleared");
        add_breadcrumb("admin", "Cleared order history", None);
        Ok(())
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    pub async fn subscribers(&self) -> Result<Vec<String>> {
        self.ensure_unlocked()?;
        Ok(self.backend.list_subscribers().await?)
    }

    /// Order count, revenue, average order value, units sold and
    /// subscriber count.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] while locked; otherwise any backend error.
    pub async fn dashboard(&self) -> Result<OrderSummary> {
        self.ensure_unlocked()?;
        Ok(order_summary(self.backend.as_ref()).await?)
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.unlocked {
            Ok(())
        } else {
            Err(AppError::Unauthorized("admin session is locked".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::{Category, CurrencyCode, Price};

    use super::*;
    use crate::backend::{ADMIN_PIN, Latency, LocalBackend};
    use crate::store::{MemoryStore, StoreKeys};

    async fn session() -> AdminSession {
        let backend = LocalBackend::open(
            Arc::new(MemoryStore::new()),
            StoreKeys::default(),
            Latency::none(),
        )
        .await
        .unwrap();
        AdminSession::new(Arc::new(backend))
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Kente Stole".to_string(),
            price: Price::from_cents(7_500, CurrencyCode::EUR),
            category: Category::Clothes,
            description: "Strip-woven cotton stole.".to_string(),
            history: "Woven on narrow looms in Ashanti towns.".to_string(),
            image: "/static/img/products/kente.jpg".to_string(),
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn test_locked_session_rejects_everything() {
        let session = session().await;
        assert!(!session.is_unlocked());
        assert!(matches!(session.products().await, Err(AppError::Unauthorized(_))));
        assert!(matches!(session.add_product(draft()).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(session.clear_orders().await, Err(AppError::Unauthorized(_))));
        assert!(matches!(session.dashboard().await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_wrong_pin_stays_locked() {
        let mut session = session().await;
        assert!(!session.unlock("0000").await);
        assert!(matches!(session.subscribers().await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unlocked_crud() {
        let mut session = session().await;
        assert!(session.unlock(ADMIN_PIN).await);

        let product = session.add_product(draft()).await.unwrap();
        assert_eq!(session.products().await.unwrap()[0].id, product.id);

        let patch = ProductPatch {
            in_stock: Some(false),
            ..ProductPatch::default()
        };
        let updated = session.update_product(&product.id, patch).await.unwrap();
        assert!(!updated.in_stock);

        session.delete_product(&product.id).await.unwrap();
        session.delete_product(&product.id).await.unwrap();
        assert!(session.products().await.unwrap().iter().all(|p| p.id != product.id));

        session.lock();
        assert!(matches!(session.orders().await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let mut session = session().await;
        session.unlock(ADMIN_PIN).await;
        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            ..ProductPatch::default()
        };
        let err = session
            .update_product(&ProductId::new("missing"), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let mut session = session().await;
        session.unlock(ADMIN_PIN).await;
        let summary = session.dashboard().await.unwrap();
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.revenue.to_string(), "€0.00");
    }
}
