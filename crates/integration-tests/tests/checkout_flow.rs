//! Cart to confirmed order, end to end.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use atelier_core::{
    CardNetwork, CurrencyCode, LanguageCode, OrderStatus, PaymentMethod, Price, ProductId,
};
use atelier_integration_tests::{TEST_VISA, TestContext, shipping};
use atelier_storefront::backend::ADMIN_PIN;
use atelier_storefront::cart::Cart;
use atelier_storefront::checkout::{
    CardDetails, CheckoutError, CheckoutStep, Field, PaymentInput, ProcessingStage,
};
use atelier_storefront::models::ProductPatch;

async fn cart_of(ctx: &TestContext, lines: &[(&str, u32)]) -> Cart {
    let catalog = ctx.state.backend().list_products().await.unwrap();
    let mut cart = Cart::new();
    for (id, quantity) in lines {
        let product = catalog.iter().find(|p| p.id.as_str() == *id).unwrap();
        cart.add(product.clone());
        cart.set_quantity(&product.id, *quantity);
    }
    cart
}

fn card(number: &str, expiry: &str, cvc: &str) -> PaymentInput {
    PaymentInput::Card(CardDetails {
        number: number.to_string(),
        expiry: expiry.to_string(),
        cvc: cvc.to_string(),
    })
}

#[tokio::test]
async fn test_card_checkout_snapshots_cart_and_feeds_dashboard() {
    let ctx = TestContext::new().await;
    let mut cart = cart_of(&ctx, &[("p-1", 2), ("p-4", 1)]).await;

    let stages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&stages);
    let mut flow = ctx
        .state
        .checkout(LanguageCode::parse("fr").unwrap())
        .on_progress(move |stage| seen.lock().unwrap().push(stage));

    flow.submit_shipping(shipping()).unwrap();
    let order = flow
        .submit_payment(&cart, card(TEST_VISA, "12/29", "123"))
        .await
        .unwrap();

    // 2 x 89.00 + 100.00 + 25.00 shipping + 12.50 duties
    assert_eq!(order.totals.total.to_string(), "€315.50");
    assert_eq!(order.card_network, Some(CardNetwork::Visa));
    assert_eq!(order.payment_method, PaymentMethod::CreditCard);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.language.as_str(), "fr");
    assert_eq!(flow.step(), &CheckoutStep::Confirmation(order.clone()));
    assert_eq!(
        stages.lock().unwrap().last(),
        Some(&ProcessingStage::PlacingOrder)
    );

    // Neither the live cart nor later catalog edits reach the stored order.
    cart.clear();
    let mut session = ctx.state.admin_session();
    session.unlock(ADMIN_PIN).await;
    let patch = ProductPatch {
        price: Some(Price::from_cents(9_900, CurrencyCode::EUR)),
        ..ProductPatch::default()
    };
    session.update_product(&ProductId::new("p-1"), patch).await.unwrap();

    let stored = session.orders().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, order.id);
    assert_eq!(stored[0].items.len(), 2);
    assert_eq!(stored[0].items[0].product.price.to_string(), "€89.00");

    let summary = session.dashboard().await.unwrap();
    assert_eq!(summary.order_count, 1);
    assert_eq!(summary.units_sold, 3);
    assert_eq!(summary.revenue.to_string(), "€315.50");
}

#[tokio::test]
async fn test_bank_transfer_quotes_reference_for_total() {
    let ctx = TestContext::new().await;
    let cart = cart_of(&ctx, &[("p-4", 1)]).await;
    let mut flow = ctx.state.checkout(LanguageCode::english());

    flow.submit_shipping(shipping()).unwrap();
    let order = flow
        .submit_payment(&cart, PaymentInput::BankTransfer)
        .await
        .unwrap();

    let bank = flow.bank_details().unwrap();
    assert_eq!(bank.amount, order.totals.total);
    assert_eq!(bank.amount.to_string(), "€137.50");
    assert!(!bank.reference.is_empty());
    assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.card_network, None);
}

#[tokio::test]
async fn test_failed_submission_keeps_everything_for_retry() {
    let ctx = TestContext::new().await;
    let cart = cart_of(&ctx, &[("p-3", 1)]).await;
    let mut flow = ctx.state.checkout(LanguageCode::english());
    flow.submit_shipping(shipping()).unwrap();

    ctx.store.set_fail_writes(true);
    let err = flow
        .submit_payment(&cart, PaymentInput::BankTransfer)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Service(_)));
    assert_eq!(flow.step(), &CheckoutStep::Payment);
    assert_eq!(flow.shipping(), &shipping());
    let reference = flow.bank_details().unwrap().reference.clone();
    assert!(ctx.state.backend().list_orders().await.unwrap().is_empty());

    ctx.store.set_fail_writes(false);
    flow.submit_payment(&cart, PaymentInput::BankTransfer)
        .await
        .unwrap();
    assert_eq!(flow.bank_details().unwrap().reference, reference);
    assert_eq!(ctx.state.backend().list_orders().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_card_reports_every_field() {
    let ctx = TestContext::new().await;
    let cart = cart_of(&ctx, &[("p-5", 1)]).await;
    let mut flow = ctx.state.checkout(LanguageCode::english());
    flow.submit_shipping(shipping()).unwrap();

    let err = flow
        .submit_payment(&cart, card("4242 4242 4242 4241", "13/27", "12"))
        .await
        .unwrap_err();
    let CheckoutError::Validation(validation) = err else {
        panic!("expected validation errors");
    };
    assert!(validation.has(Field::CardNumber));
    assert!(validation.has(Field::Expiry));
    assert!(validation.has(Field::Cvc));
    assert_eq!(flow.step(), &CheckoutStep::Payment);
    assert!(ctx.state.backend().list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_orders_are_listed_newest_first() {
    let ctx = TestContext::new().await;
    let mut ids = Vec::new();
    for line in ["p-1", "p-2"] {
        let cart = cart_of(&ctx, &[(line, 1)]).await;
        let mut flow = ctx.state.checkout(LanguageCode::english());
        flow.submit_shipping(shipping()).unwrap();
        let order = flow.submit_payment(&cart, PaymentInput::Paypal).await.unwrap();
        ids.push(order.id);
    }

    let orders = ctx.state.backend().list_orders().await.unwrap();
    assert_eq!(orders[0].id, ids[1]);
    assert_eq!(orders[1].id, ids[0]);
}
