//! Checkout command: fill a cart and walk it through the wizard.

use clap::Args;
use thiserror::Error;

use atelier_core::{LanguageCode, PaymentMethod, ProductId};
use atelier_storefront::cart::Cart;
use atelier_storefront::checkout::{CardDetails, CheckoutError, PaymentInput};
use atelier_storefront::error::{AppError, Result};
use atelier_storefront::models::{Product, ShippingDetails};
use atelier_storefront::state::AppState;

/// A malformed `--item` argument.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid item {0:?}: expected ID or ID:QUANTITY with QUANTITY >= 1")]
pub struct ItemSpecError(String);

/// One `--item ID[:QUANTITY]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: ProductId,
    pub quantity: u32,
}

impl std::str::FromStr for ItemSpec {
    type Err = ItemSpecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ItemSpecError(s.to_owned());
        let (id, quantity) = match s.split_once(':') {
            Some((id, quantity)) => (id, quantity.parse().map_err(|_| invalid())?),
            None => (s, 1),
        };
        if id.trim().is_empty() || quantity == 0 {
            return Err(invalid());
        }
        Ok(Self {
            id: ProductId::new(id.trim()),
            quantity,
        })
    }
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Product to order, as `ID` or `ID:QUANTITY` (repeatable)
    #[arg(short, long = "item", required = true)]
    items: Vec<ItemSpec>,

    /// Payment method (`card`, `paypal`, `bank`)
    #[arg(short, long, default_value = "card")]
    method: PaymentMethod,

    /// Language recorded on the order
    #[arg(long, default_value = "en")]
    lang: LanguageCode,

    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    postal_code: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value = "")]
    phone: String,

    /// Card number (card payments only)
    #[arg(long, default_value = "")]
    card_number: String,
    /// Card expiry as MM/YY
    #[arg(long, default_value = "")]
    expiry: String,
    #[arg(long, default_value = "")]
    cvc: String,
}

impl CheckoutArgs {
    fn shipping(&self) -> ShippingDetails {
        ShippingDetails {
            full_name: self.name.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
        }
    }

    fn payment(&self) -> PaymentInput {
        match self.method {
            PaymentMethod::CreditCard => PaymentInput::Card(CardDetails {
                number: self.card_number.clone(),
                expiry: self.expiry.clone(),
                cvc: self.cvc.clone(),
            }),
            PaymentMethod::Paypal => PaymentInput::Paypal,
            PaymentMethod::BankTransfer => PaymentInput::BankTransfer,
        }
    }
}

/// Build a cart from `items`. Repeated ids add up; sold-out products
/// cannot be added.
///
/// # Errors
///
/// [`AppError::NotFound`] for an unknown id, [`AppError::InvalidInput`] for
/// a sold-out product.
pub fn fill_cart(catalog: &[Product], items: &[ItemSpec]) -> Result<Cart> {
    let mut cart = Cart::new();
    for item in items {
        let product = catalog
            .iter()
            .find(|p| p.id == item.id)
            .ok_or_else(|| AppError::NotFound(format!("product {}", item.id)))?;
        if !product.in_stock {
            return Err(AppError::InvalidInput(format!("{} is sold out", product.name)));
        }
        let quantity = match cart.get(&product.id).map(|line| line.quantity) {
            Some(current) => current.saturating_add(item.quantity),
            None => {
                cart.add(product.clone());
                item.quantity
            }
        };
        cart.set_quantity(&product.id, quantity);
    }
    Ok(cart)
}

/// Run the checkout for `args` and print the confirmation.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState, args: CheckoutArgs) -> Result<()> {
    let catalog = state.backend().list_products().await?;
    let cart = fill_cart(&catalog, &args.items)?;

    let totals = cart.totals();
    println!("Subtotal {:>12}", totals.subtotal.to_string());
    println!("Shipping {:>12}", totals.shipping.to_string());
    println!("Duties   {:>12}", totals.duties.to_string());
    println!("Total    {:>12}", totals.total.to_string());

    let mut flow = state
        .checkout(args.lang.clone())
        .on_progress(|stage| println!("  {stage}"));

    flow.submit_shipping(args.shipping()).map_err(report_fields)?;

    let order = match flow.submit_payment(&cart, args.payment()).await {
        Ok(order) => order,
        Err(e) => return Err(report_fields(e)),
    };

    if let Some(bank) = flow.bank_details() {
        println!();
        println!("Transfer {} to:", bank.amount);
        println!("  Beneficiary  {}", bank.beneficiary);
        println!("  IBAN         {}", bank.iban);
        println!("  BIC          {}", bank.bic);
        println!("  Reference    {}", bank.reference);
    }

    println!();
    println!(
        "Order {} placed: {} item(s), {} ({}, {})",
        order.id,
        order.unit_count(),
        order.totals.total,
        order.payment_method,
        order.status
    );
    Ok(())
}

/// Print every field violation before handing the error back.
#[allow(clippy::print_stdout)]
fn report_fields(err: CheckoutError) -> AppError {
    if let CheckoutError::Validation(validation) = &err {
        for error in &validation.errors {
            println!("  {}: {}", error.field, error.message);
        }
    }
    err.into()
}
