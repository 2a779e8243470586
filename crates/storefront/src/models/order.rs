//! Order domain types.

use chrono::{DateTime, Utc};

use auxilia_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub total: Price,
    pub ordered_at: DateTime<Utc>,
}

/// A line of an order, frozen at checkout time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    /// `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
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
