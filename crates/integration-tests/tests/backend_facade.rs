//! Backend facade scenarios over a shared in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use atelier_core::{Category, CurrencyCode, Price, ProductId};
use atelier_integration_tests::TestContext;
use atelier_storefront::backend::ADMIN_PIN;
use atelier_storefront::error::AppError;
use atelier_storefront::models::{ProductDraft, ProductPatch};
use atelier_storefront::store::{KeyValueStore, StoreKeys};

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        price: Price::from_cents(7_500, CurrencyCode::EUR),
        category: Category::Clothes,
        description: "Strip-woven cotton stole.".to_string(),
        history: "Woven on narrow looms in Ashanti towns.".to_string(),
        image: "/static/img/products/kente.jpg".to_string(),
        in_stock: true,
    }
}

#[tokio::test]
async fn test_first_run_seeds_catalog_under_prefixed_keys() {
    let ctx = TestContext::new().await;

    let products = ctx.state.backend().list_products().await.unwrap();
    assert_eq!(products.len(), 8);
    assert_eq!(products[0].id, ProductId::new("p-1"));

    let keys = StoreKeys::default();
    assert!(ctx.store.load(&keys.products()).await.unwrap().is_some());
    assert!(ctx.store.load(&keys.auth()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_edits_survive_restart() {
    let ctx = TestContext::new().await;
    let mut session = ctx.state.admin_session();
    assert!(session.unlock(ADMIN_PIN).await);

    let added = session.add_product(draft("Kente Stole")).await.unwrap();
    let patch = ProductPatch {
        in_stock: Some(false),
        ..ProductPatch::default()
    };
    session
        .update_product(&ProductId::new("p-2"), patch)
        .await
        .unwrap();
    session.delete_product(&ProductId::new("p-8")).await.unwrap();

    let restarted = TestContext::over(Arc::clone(&ctx.store), None).await;
    let products = restarted.state.backend().list_products().await.unwrap();

    assert_eq!(products.len(), 8);
    assert_eq!(products[0].id, added.id);
    assert!(
        !products
            .iter()
            .find(|p| p.id.as_str() == "p-2")
            .unwrap()
            .in_stock
    );
    assert!(products.iter().all(|p| p.id.as_str() != "p-8"));
}

#[tokio::test]
async fn test_emptied_catalog_stays_empty_after_restart() {
    let ctx = TestContext::new().await;
    let mut session = ctx.state.admin_session();
    session.unlock(ADMIN_PIN).await;
    for product in session.products().await.unwrap() {
        session.delete_product(&product.id).await.unwrap();
    }

    let restarted = TestContext::over(Arc::clone(&ctx.store), None).await;
    assert!(restarted.state.backend().list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribers_dedupe_and_validate() {
    let ctx = TestContext::new().await;
    let backend = ctx.state.backend();

    assert!(backend.add_subscriber("nadia@example.org").await.unwrap());
    assert!(!backend.add_subscriber("nadia@example.org").await.unwrap());
    assert!(backend.add_subscriber("kofi@example.org").await.unwrap());
    assert!(backend.add_subscriber("not-an-email").await.is_err());

    assert_eq!(
        backend.list_subscribers().await.unwrap(),
        vec!["nadia@example.org".to_string(), "kofi@example.org".to_string()]
    );
}

#[tokio::test]
async fn test_failed_write_leaves_records_unchanged() {
    let ctx = TestContext::new().await;
    let mut session = ctx.state.admin_session();
    session.unlock(ADMIN_PIN).await;

    ctx.store.set_fail_writes(true);
    let err = session.add_product(draft("Kente Stole")).await.unwrap_err();
    assert!(matches!(err, AppError::Service(_)));
    assert!(err.is_retryable());
    assert!(ctx.state.backend().add_subscriber("nadia@example.org").await.is_err());

    ctx.store.set_fail_writes(false);
    assert_eq!(session.products().await.unwrap().len(), 8);
    assert!(session.subscribers().await.unwrap().is_empty());

    let restarted = TestContext::over(Arc::clone(&ctx.store), None).await;
    assert_eq!(restarted.state.backend().list_products().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_locked_session_cannot_touch_catalog() {
    let ctx = TestContext::new().await;
    let mut session = ctx.state.admin_session();
    assert!(!session.unlock("0000").await);

    let err = session
        .delete_product(&ProductId::new("p-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(ctx.state.backend().list_products().await.unwrap().len(), 8);
}
