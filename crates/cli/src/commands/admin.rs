//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! atelier admin --pin 1234 add-product --name "Kente Stole" --price 75 --category clothes
//! atelier admin --pin 1234 update-product p-3 --sold-out
//! atelier admin --pin 1234 clear-orders
//! ```

use clap::Args;
use rust_decimal::Decimal;

use atelier_core::{Category, CurrencyCode, Price, ProductId};
use atelier_storefront::admin::AdminSession;
use atelier_storefront::error::{AppError, Result};
use atelier_storefront::models::{Order, Product, ProductDraft, ProductPatch};
use atelier_storefront::state::AppState;

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    /// Unit price in euros (e.g. `89.00`)
    #[arg(long)]
    price: Decimal,

    #[arg(long, default_value = "miscellaneous")]
    category: Category,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    history: String,

    /// Image URL or asset path
    #[arg(long, default_value = "")]
    image: String,

    /// List the product as sold out
    #[arg(long)]
    sold_out: bool,
}

impl From<ProductArgs> for ProductDraft {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            price: Price::new(args.price, CurrencyCode::EUR),
            category: args.category,
            description: args.description,
            history: args.history,
            image: args.image,
            in_stock: !args.sold_out,
        }
    }
}

#[derive(Debug, Args)]
pub struct PatchArgs {
    /// Product id
    id: ProductId,

    #[arg(long)]
    name: Option<String>,

    /// Unit price in euros
    #[arg(long)]
    price: Option<Decimal>,

    #[arg(long)]
    category: Option<Category>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    history: Option<String>,

    #[arg(long)]
    image: Option<String>,

    /// Mark the product as sold out
    #[arg(long, conflicts_with = "in_stock")]
    sold_out: bool,

    /// Mark the product as available again
    #[arg(long)]
    in_stock: bool,
}

impl PatchArgs {
    fn into_parts(self) -> (ProductId, ProductPatch) {
        let in_stock = match (self.in_stock, self.sold_out) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let patch = ProductPatch {
            name: self.name,
            price: self.price.map(|amount| Price::new(amount, CurrencyCode::EUR)),
            category: self.category,
            description: self.description,
            history: self.history,
            image: self.image,
            in_stock,
        };
        (self.id, patch)
    }
}

/// Open an admin session with `pin`.
///
/// # Errors
///
/// [`AppError::Unauthorized`] if the PIN is wrong.
pub async fn unlock(state: &AppState, pin: &str) -> Result<AdminSession> {
    let mut session = state.admin_session();
    if session.unlock(pin).await {
        Ok(session)
    } else {
        Err(AppError::Unauthorized("incorrect PIN".to_string()))
    }
}

#[allow(clippy::print_stdout)]
pub async fn dashboard(session: &AdminSession) -> Result<()> {
    let summary = session.dashboard().await?;
    println!("Orders           {}", summary.order_count);
    println!("Units sold       {}", summary.units_sold);
    println!("Revenue          {}", summary.revenue);
    println!("Average order    {}", summary.average_order_value);
    println!("Subscribers      {}", summary.subscriber_count);
    Ok(())
}

pub async fn products(session: &AdminSession) -> Result<()> {
    for product in session.products().await? {
        print_product(&product);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add_product(session: &AdminSession, args: ProductArgs) -> Result<()> {
    let product = session.add_product(args.into()).await?;
    println!("Added:");
    print_product(&product);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn update_product(session: &AdminSession, args: PatchArgs) -> Result<()> {
    let (id, patch) = args.into_parts();
    let product = session.update_product(&id, patch).await?;
    println!("Updated:");
    print_product(&product);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_product(session: &AdminSession, id: &ProductId) -> Result<()> {
    session.delete_product(id).await?;
    println!("Deleted {id}.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn orders(session: &AdminSession) -> Result<()> {
    let orders = session.orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn clear_orders(session: &AdminSession) -> Result<()> {
    session.clear_orders().await?;
    println!("Order history cleared.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn subscribers(session: &AdminSession) -> Result<()> {
    for email in session.subscribers().await? {
        println!("{email}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product) {
    let stock = if product.in_stock { "in stock" } else { "sold out" };
    println!(
        "{:<6} {:<32} {:>10}  {:<14} {stock}",
        product.id.as_str(),
        product.name,
        product.price.to_string(),
        product.category.to_string()
    );
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!(
        "{}  {}  {}  {} unit(s)  {}  {}  [{}]",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.shipping.full_name,
        order.unit_count(),
        order.totals.total,
        order.payment_method,
        order.status
    );
    for line in &order.items {
        println!("    {} x {}", line.quantity, line.product.name);
    }
}
