//! Catalog domain types.

use chrono::{DateTime, Utc};

use auxilia_core::{CategoryId, Price, ProductId};

/// A product as shown in the shop.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// `None` means stock is not tracked.
    pub stock: Option<i32>,
    pub category: String,
    pub image_name: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Public URL of the product image, if one was uploaded.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.image_name
            .as_ref()
            .map(|name| format!("/uploads/products/{name}"))
    }

    /// Whether any unit is left to sell. Untracked stock never runs out.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.accepts_more(0)
    }

    /// Whether one more unit can join the `in_cart` units already in a cart.
    #[must_use]
    pub fn accepts_more(&self, in_cart: u32) -> bool {
        self.stock
            .is_none_or(|stock| i64::from(in_cart) < i64::from(stock))
    }
}

/// A catalog category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}
