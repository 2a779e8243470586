//! Catalog types as the back-office sees them.

use chrono::{DateTime, Utc};

use auxilia_core::{CategoryId, Price, ProductId, StockFilter};

/// A product, including fields the shop never shows.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// `None` means stock is not tracked.
    pub stock: Option<i32>,
    pub category: String,
    /// Bare file name inside the product images directory.
    pub image_name: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Stock bucket the product is shown in.
    #[must_use]
    pub const fn stock_bucket(&self) -> StockFilter {
        StockFilter::classify(self.stock)
    }
}

/// A catalog category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(stock: Option<i32>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Lampe".to_owned(),
            description: None,
            price: Price::new(Decimal::new(1999, 2)),
            stock,
            category: "Maison".to_owned(),
            image_name: None,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_bucket() {
        assert_eq!(product(None).stock_bucket(), StockFilter::Out);
        assert_eq!(product(Some(0)).stock_bucket(), StockFilter::Out);
        assert_eq!(product(Some(5)).stock_bucket(), StockFilter::Low);
        assert_eq!(product(Some(30)).stock_bucket(), StockFilter::Medium);
        assert_eq!(product(Some(31)).stock_bucket(), StockFilter::High);
    }
}
