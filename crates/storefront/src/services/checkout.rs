//! Checkout: turns the session cart into a persisted order.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use auxilia_core::{OrderId, OrderStatus, ShippingDetails, UserId};

use super::cart::{CartContents, CartError, CartService};
use crate::db::orders::NewOrderItem;
use crate::db::{OrderRepository, RepositoryError, UserRepository};

/// Reasons checkout cannot proceed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("shipping details are incomplete")]
    IncompleteProfile,
    #[error("order total is too large")]
    TotalTooLarge,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Everything the confirmation page shows.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub contents: CartContents,
    pub shipping: ShippingDetails,
}

/// Checkout for the signed-in user of one request.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    cart: CartService<'a>,
    user_id: UserId,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, session: &'a Session, user_id: UserId) -> Self {
        Self {
            pool,
            cart: CartService::new(pool, session, Some(user_id)),
            user_id,
        }
    }

    /// Check that the cart has lines and the profile has shipping details.
    ///
    /// The cart is checked first so an empty cart never sends the user to
    /// fill in a profile for nothing.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart`, `TotalTooLarge` or `IncompleteProfile` when
    /// checkout cannot proceed.
    pub async fn summary(&self) -> Result<CheckoutSummary, CheckoutError> {
        let contents = self.cart.contents().await?;
        check_cart(&contents)?;

        let user = UserRepository::new(self.pool)
            .get_by_id(self.user_id)
            .await?
            .ok_or(CheckoutError::UserNotFound)?;
        let shipping = user
            .profile
            .shipping_details()
            .ok_or(CheckoutError::IncompleteProfile)?;

        Ok(CheckoutSummary { contents, shipping })
    }

    /// Persist the order as paid and empty the cart.
    ///
    /// Each line keeps the product name and unit price at the time of
    /// purchase.
    ///
    /// # Errors
    ///
    /// Returns the `summary` errors, or a repository error if the order
    /// cannot be written. The cart is left untouched on failure.
    pub async fn place_order(&self) -> Result<OrderId, CheckoutError> {
        let CheckoutSummary { contents, .. } = self.summary().await?;

        let items = order_items(&contents);
        let order_id = OrderRepository::new(self.pool)
            .create(self.user_id, OrderStatus::Paid, contents.total, &items)
            .await?;

        self.cart.clear().await?;

        tracing::info!(
            order_id = %order_id,
            user_id = %self.user_id,
            total = %contents.total,
            lines = items.len(),
            "Order placed"
        );

        Ok(order_id)
    }
}

/// The cart must have lines and a total the orders table can hold.
fn check_cart(contents: &CartContents) -> Result<(), CheckoutError> {
    if contents.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if !contents.total.fits_column() {
        return Err(CheckoutError::TotalTooLarge);
    }
    Ok(())
}

fn order_items(contents: &CartContents) -> Vec<NewOrderItem> {
    contents
        .lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product.id,
            product_name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect()
}
