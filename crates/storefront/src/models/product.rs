//! Catalog product records.

use serde::{Deserialize, Serialize};

use atelier_core::{Category, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Catalog category.
    pub category: Category,
    /// Short description shown in listings.
    pub description: String,
    /// Long-form historical background shown on the detail view.
    pub history: String,
    /// Image reference (URL or asset path).
    pub image: String,
    /// Whether the product can currently be ordered.
    pub in_stock: bool,
}

impl Product {
    /// Semantic dictionary key for one of this product's text fields
    /// (e.g. `product.p-3.name`).
    #[must_use]
    pub fn field_key(&self, field: &str) -> String {
        format!("product.{}.{field}", self.id)
    }
}

/// Input for creating a product; the backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub category: Category,
    pub description: String,
    pub history: String,
    pub image: String,
    pub in_stock: bool,
}

impl ProductDraft {
    /// Attach an id, producing a full product record.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            history: self.history,
            image: self.image,
            in_stock: self.in_stock,
        }
    }
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.history.is_none()
            && self.image.is_none()
            && self.in_stock.is_none()
    }

    /// Merge the set fields into `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(history) = self.history {
            product.history = history;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
    }
}

#[cfg(test)]
mod tests {
    use atelier_core::CurrencyCode;

    use super::*;

    fn sample() -> Product {
        Product {
            id: ProductId::new("p-1"),
            name: "Ikat Shawl".to_string(),
            price: Price::from_cents(8_900, CurrencyCode::EUR),
            category: Category::Clothes,
            description: "Hand-dyed silk".to_string(),
            history: "Woven in the Fergana valley".to_string(),
            image: "/img/ikat.jpg".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut product = sample();
        ProductPatch {
            name: Some("Ikat Scarf".to_string()),
            in_stock: Some(false),
            ..ProductPatch::default()
        }
        .apply(&mut product);

        assert_eq!(product.name, "Ikat Scarf");
        assert!(!product.in_stock);
        assert_eq!(product.description, "Hand-dyed silk");
        assert_eq!(product.category, Category::Clothes);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ProductPatch::default().is_empty());
        assert!(
            !ProductPatch {
                image: Some(String::new()),
                ..ProductPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_field_key() {
        assert_eq!(sample().field_key("name"), "product.p-1.name");
    }
}
