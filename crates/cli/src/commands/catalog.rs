//! Catalog browsing and newsletter commands.

use atelier_core::{Category, LanguageCode, ProductId};
use atelier_storefront::error::{AppError, Result};
use atelier_storefront::state::AppState;

/// List products in `category`, translated into `lang`.
#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState, category: Category, lang: &LanguageCode) -> Result<()> {
    let translator = state.translator();
    translator.warm(lang).await;

    let products = state.backend().list_products().await?;
    let visible: Vec<_> = products
        .into_iter()
        .filter(|p| p.category.matches(category))
        .collect();

    if visible.is_empty() {
        println!("No products in {category}.");
        return Ok(());
    }

    for product in &visible {
        let name = translator
            .translate(&product.name, lang, Some(&product.field_key("name")))
            .await;
        let stock = if product.in_stock { "" } else { "  [sold out]" };
        println!(
            "{:<6} {:<32} {:>10}  {}{stock}",
            product.id.as_str(),
            name.text,
            product.price.to_string(),
            product.category
        );
    }
    Ok(())
}

/// Show one product with its description and history.
///
/// # Errors
///
/// [`AppError::NotFound`] for an unknown id.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, id: &ProductId, lang: &LanguageCode) -> Result<()> {
    let product = state
        .backend()
        .list_products()
        .await?
        .into_iter()
        .find(|p| &p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let translator = state.translator();
    translator.warm(lang).await;
    let localized = translator.localize_product(&product, lang).await;

    println!("{}", localized.name);
    println!(
        "{} | {} | {}",
        product.category,
        product.price,
        if product.in_stock { "in stock" } else { "sold out" }
    );
    println!();
    println!("{}", localized.description);
    println!();
    println!("{}", localized.history);
    Ok(())
}

/// Add `email` to the newsletter list.
#[allow(clippy::print_stdout)]
pub async fn subscribe(state: &AppState, email: &str) -> Result<()> {
    if state.backend().add_subscriber(email).await? {
        println!("Subscribed {}.", email.trim());
    } else {
        println!("{} is already subscribed.", email.trim());
    }
    Ok(())
}
