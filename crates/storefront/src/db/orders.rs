//! Order repository: checkout writes and order history reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use auxilia_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::{RepositoryError, quantity_from_db};
use crate::models::{Order, OrderItem, OrderWithItems};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    status: OrderStatus,
    total: Decimal,
    ordered_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            status: row.status,
            total: Price::new(row.total),
            ordered_at: row.ordered_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    product_id: Option<i32>,
    product_name: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            quantity: quantity_from_db(row.quantity)?,
            price: Price::new(row.price),
        })
    }
}

/// A line to write at checkout.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Price,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a quantity does not fit the
    /// column, or `RepositoryError::Database` if any insert fails. Nothing is
    /// written in either case.
    pub async fn create(
        &self,
        user_id: UserId,
        status: OrderStatus,
        total: Price,
        items: &[NewOrderItem],
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO orders (user_id, status, total, ordered_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(status)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} too large", item.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO order_item (order_id, product_id, product_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }

    /// Orders placed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, ordered_at
            FROM orders
            WHERE user_id = $1
            ORDER BY ordered_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// An order with its lines, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, ordered_at
            FROM orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, product_id, product_name, quantity, price
            FROM order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderWithItems {
            order: row.into(),
            items,
        }))
    }
}
