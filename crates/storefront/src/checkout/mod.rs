//! Checkout wizard: `Shipping -> Payment -> Confirmation`.
//!
//! There is no failed state. A rejected submission leaves the flow where it
//! was, with everything the visitor typed still in place, so they can fix
//! it and retry.
//!
//! Payment is simulated end to end. Card details are validated and then
//! discarded (only the detected network is kept); the PayPal branch is a
//! fixed timed sequence standing in for a redirect, with no callback or
//! webhook behind it; bank transfer only issues a reference and leaves the
//! order pending until someone reconciles it by hand.

pub mod pricing;
pub mod validation;

pub use pricing::{DUTIES_FLAT, SHIPPING_FLAT};
pub use validation::{
    CardDetails, Field, FieldError, ValidationError, detect_network, luhn_valid, validate_card,
    validate_cvc, validate_expiry, validate_shipping,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use atelier_core::{CardNetwork, LanguageCode, OrderStatus, PaymentMethod, Price};

use crate::backend::{Backend, BackendError, pause};
use crate::cart::Cart;
use crate::error::add_breadcrumb;
use crate::ids::{bank_reference, order_reference};
use crate::models::{Order, OrderTotals, ShippingDetails};

/// Errors returned by checkout steps.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Form input needs fixing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The call does not apply to the current step.
    #[error("checkout is at the {actual} step, not {expected}")]
    WrongStep {
        expected: &'static str,
        actual: &'static str,
    },

    /// The order could not be stored; safe to retry.
    #[error("order could not be placed: {0}")]
    Service(#[from] BackendError),
}

/// Where the wizard is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Confirmation(Order),
}

impl CheckoutStep {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Confirmation(_) => "confirmation",
        }
    }
}

/// Payment as entered in the second step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInput {
    Card(CardDetails),
    Paypal,
    BankTransfer,
}

impl PaymentInput {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::CreditCard,
            Self::Paypal => PaymentMethod::Paypal,
            Self::BankTransfer => PaymentMethod::BankTransfer,
        }
    }
}

/// Informational status shown while a payment is "processing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    VerifyingCard,
    ContactingIssuer,
    Authorizing,
    OpeningPaypal,
    AwaitingPaypalConfirmation,
    PaypalConfirmed,
    IssuingBankReference,
    PlacingOrder,
}

impl ProcessingStage {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::VerifyingCard => "Verifying card details...",
            Self::ContactingIssuer => "Contacting your bank...",
            Self::Authorizing => "Authorizing payment...",
            Self::OpeningPaypal => "Opening PayPal in a new window...",
            Self::AwaitingPaypalConfirmation => "Waiting for PayPal confirmation...",
            Self::PaypalConfirmed => "PayPal payment confirmed",
            Self::IssuingBankReference => "Generating your transfer reference...",
            Self::PlacingOrder => "Placing your order...",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Beneficiary details shown for a bank transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDetails {
    pub beneficiary: String,
    pub iban: String,
    pub bic: String,
    /// Reference the visitor must quote on the transfer.
    pub reference: String,
    pub amount: Price,
}

const BENEFICIARY: &str = "Atelier Cultural Goods SARL";
const IBAN: &str = "FR76 3000 6000 0112 3456 7890 189";
const BIC: &str = "AGRIFRPPXXX";

/// Delays between simulated payment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each card processing stage.
    pub card_stage: Duration,
    /// Pause after each PayPal stage.
    pub paypal_stage: Duration,
    /// Pause before a bank transfer order is placed.
    pub bank_transfer: Duration,
}

impl Pacing {
    #[must_use]
    pub const fn simulated() -> Self {
        Self {
            card_stage: Duration::from_millis(700),
            paypal_stage: Duration::from_millis(1500),
            bank_transfer: Duration::from_millis(800),
        }
    }

    #[must_use]
    pub const fn instant() -> Self {
        Self {
            card_stage: Duration::ZERO,
            paypal_stage: Duration::ZERO,
            bank_transfer: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::simulated()
    }
}

type ProgressFn = Box<dyn Fn(ProcessingStage) + Send + Sync>;

/// One visitor's pass through checkout.
pub struct CheckoutFlow {
    backend: Arc<dyn Backend>,
    language: LanguageCode,
    pacing: Pacing,
    progress: Option<ProgressFn>,
    step: CheckoutStep,
    shipping: ShippingDetails,
    bank_details: Option<BankDetails>,
}

impl fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("language", &self.language)
            .field("pacing", &self.pacing)
            .field("step", &self.step)
            .field("shipping", &self.shipping)
            .field("bank_details", &self.bank_details)
            .finish_non_exhaustive()
    }
}

impl CheckoutFlow {
    /// Start at the shipping step. `language` is recorded on the order.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, language: LanguageCode) -> Self {
        Self {
            backend,
            language,
            pacing: Pacing::default(),
            progress: None,
            step: CheckoutStep::Shipping,
            shipping: ShippingDetails::default(),
            bank_details: None,
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Receive each [`ProcessingStage`] as payment proceeds.
    #[must_use]
    pub fn on_progress(mut self, progress: impl Fn(ProcessingStage) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    #[must_use]
    pub const fn step(&self) -> &CheckoutStep {
        &self.step
    }

    /// Shipping details as last entered, valid or not.
    #[must_use]
    pub const fn shipping(&self) -> &ShippingDetails {
        &self.shipping
    }

    /// Transfer instructions, once bank transfer has been chosen.
    #[must_use]
    pub const fn bank_details(&self) -> Option<&BankDetails> {
        self.bank_details.as_ref()
    }

    /// The placed order, once confirmed.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match &self.step {
            CheckoutStep::Confirmation(order) => Some(order),
            _ => None,
        }
    }

    /// Store shipping details and move to payment if they validate.
    ///
    /// Details are kept even when rejected.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] outside the shipping step, or
    /// [`CheckoutError::Validation`] listing every bad field.
    pub fn submit_shipping(&mut self, details: ShippingDetails) -> Result<(), CheckoutError> {
        self.expect_step("shipping")?;
        self.shipping = details;
        validate_shipping(&self.shipping)?;

        add_breadcrumb("checkout", "Shipping details accepted", None);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Return from payment to shipping. Returns whether the step changed.
    pub fn back(&mut self) -> bool {
        if self.step == CheckoutStep::Payment {
            self.step = CheckoutStep::Shipping;
            true
        } else {
            false
        }
    }

    /// Run the chosen payment branch and place the order.
    ///
    /// The cart is snapshotted by value at this point; the caller should
    /// clear it once the flow reaches confirmation.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStep`] outside the payment step
    /// - [`CheckoutError::EmptyCart`] if `cart` has no lines
    /// - [`CheckoutError::Validation`] for bad card fields
    /// - [`CheckoutError::Service`] if the order could not be stored; the
    ///   flow stays at payment and the call can be repeated
    #[instrument(skip_all, fields(method = %payment.method(), lines = cart.items().len()))]
    pub async fn submit_payment(
        &mut self,
        cart: &Cart,
        payment: PaymentInput,
    ) -> Result<Order, CheckoutError> {
        self.expect_step("payment")?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let card_network = match &payment {
            PaymentInput::Card(card) => Some(self.process_card(card).await?),
            PaymentInput::Paypal => {
                self.process_paypal().await;
                None
            }
            PaymentInput::BankTransfer => {
                self.process_bank_transfer(cart).await;
                None
            }
        };

        self.finalize(cart, payment.method(), card_network).await
    }

    async fn process_card(&self, card: &CardDetails) -> Result<CardNetwork, CheckoutError> {
        validate_card(card)?;
        for stage in [
            ProcessingStage::VerifyingCard,
            ProcessingStage::ContactingIssuer,
            ProcessingStage::Authorizing,
        ] {
            self.stage(stage, self.pacing.card_stage).await;
        }
        Ok(detect_network(&card.number))
    }

    async fn process_paypal(&self) {
        for stage in [
            ProcessingStage::OpeningPaypal,
            ProcessingStage::AwaitingPaypalConfirmation,
            ProcessingStage::PaypalConfirmed,
        ] {
            self.stage(stage, self.pacing.paypal_stage).await;
        }
    }

    async fn process_bank_transfer(&mut self, cart: &Cart) {
        let amount = cart.totals().total;
        match &mut self.bank_details {
            // Keep the reference already shown if this is a retry.
            Some(details) => details.amount = amount,
            None => {
                self.bank_details = Some(BankDetails {
                    beneficiary: BENEFICIARY.to_string(),
                    iban: IBAN.to_string(),
                    bic: BIC.to_string(),
                    reference: bank_reference(),
                    amount,
                });
            }
        }
        self.stage(ProcessingStage::IssuingBankReference, self.pacing.bank_transfer)
            .await;
    }

    async fn stage(&self, stage: ProcessingStage, delay: Duration) {
        if let Some(progress) = &self.progress {
            progress(stage);
        }
        pause(delay).await;
    }

    async fn finalize(
        &mut self,
        cart: &Cart,
        payment_method: PaymentMethod,
        card_network: Option<CardNetwork>,
    ) -> Result<Order, CheckoutError> {
        if let Some(progress) = &self.progress {
            progress(ProcessingStage::PlacingOrder);
        }

        let items = cart.snapshot();
        let totals = OrderTotals::for_items(&items);
        let order = Order {
            id: order_reference(),
            created_at: Utc::now(),
            items,
            totals,
            shipping: self.shipping.clone(),
            payment_method,
            card_network,
            language: self.language.clone(),
            status: OrderStatus::Pending,
        };

        match self.backend.create_order(order).await {
            Ok(order) => {
                info!(order_id = %order.id, total = %order.totals.total, "Order placed");
                add_breadcrumb(
                    "checkout",
                    "Order placed",
                    Some(&[("order_id", order.id.as_str())]),
                );
                self.step = CheckoutStep::Confirmation(order.clone());
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed, staying at payment");
                Err(CheckoutError::Service(e))
            }
        }
    }

    fn expect_step(&self, expected: &'static str) -> Result<(), CheckoutError> {
        let actual = self.step.name();
        if actual == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep { expected, actual })
        }
    }
}
