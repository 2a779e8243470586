//! Display rows shared by the listing pages and the dashboard.

use crate::models::{Order, Product, User};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// A product as listed in tables.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    /// CSS modifier for the stock badge.
    pub stock_class: &'static str,
    pub is_featured: bool,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.display(),
            stock: product
                .stock
                .map_or_else(|| "—".to_owned(), |n| n.to_string()),
            stock_class: product.stock_bucket().as_str(),
            is_featured: product.is_featured,
            image_url: product
                .image_name
                .as_ref()
                .map(|name| format!("/uploads/products/{name}")),
            created_at: product.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// An order as listed in tables.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: i32,
    pub customer: String,
    pub user_id: Option<i32>,
    pub status: &'static str,
    pub status_label: &'static str,
    pub total: String,
    pub ordered_at: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            customer: order
                .customer_email
                .clone()
                .unwrap_or_else(|| "Compte supprimé".to_owned()),
            user_id: order.user_id.map(|id| id.as_i32()),
            status: order.status.as_str(),
            status_label: order.status.label(),
            total: order.total.display(),
            ordered_at: order.ordered_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// A user account as listed in tables.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role_label: &'static str,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.to_string(),
            name: user.display_name(),
            role_label: user.role.label(),
            is_admin: user.is_admin(),
            is_active: user.is_active,
            created_at: user.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Convert a slice of models into display rows.
pub fn rows<'m, M: 'm, R: From<&'m M>>(models: &'m [M]) -> Vec<R> {
    models.iter().map(R::from).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use auxilia_core::{OrderId, OrderStatus, Price, ProductId};

    use super::*;

    #[test]
    fn test_product_row_formatting() {
        let product = Product {
            id: ProductId::new(4),
            name: "Chaise".to_owned(),
            description: None,
            price: Price::new(Decimal::new(4950, 2)),
            stock: None,
            category: "Maison".to_owned(),
            image_name: Some("chaise-ab12.png".to_owned()),
            is_featured: true,
            created_at: Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap(),
        };

        let row = ProductRow::from(&product);
        assert_eq!(row.stock, "—");
        assert_eq!(row.stock_class, "out");
        assert_eq!(row.image_url.as_deref(), Some("/uploads/products/chaise-ab12.png"));
        assert_eq!(row.created_at, "09/03/2025 14:05");
    }

    #[test]
    fn test_order_row_for_deleted_account() {
        let order = Order {
            id: OrderId::new(8),
            user_id: None,
            customer_email: None,
            status: OrderStatus::Shipped,
            total: Price::ZERO,
            ordered_at: Utc::now(),
        };

        let row = OrderRow::from(&order);
        assert_eq!(row.customer, "Compte supprimé");
        assert_eq!(row.status, "shipped");
        assert_eq!(row.status_label, "Expédiée");
    }
}
