//! Order types for the back-office.

use chrono::{DateTime, Utc};

use auxilia_core::{OrderId, OrderStatus, Price, ProductId, UserId};

/// A placed order with its customer's email, when the account still exists.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_email: Option<String>,
    pub status: OrderStatus,
    pub total: Price,
    pub ordered_at: DateTime<Utc>,
}

/// A frozen order line.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// An order together with its lines.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
