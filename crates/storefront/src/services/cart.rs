//! Session-backed shopping cart.
//!
//! The visitor's [`Cart`] lives in the session under [`session_keys::CART`].
//! For signed-in users every change is also written to `users.cart`, so the
//! cart follows the account across devices and is merged back in on the
//! next login.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use auxilia_core::{Cart, Price, ProductId, UserId};

use crate::db::{ProductRepository, RepositoryError, UserRepository};
use crate::models::{Product, session_keys};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),
    #[error("product {0} has no stock left")]
    OutOfStock(ProductId),
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One resolved cart line.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Price,
}

/// A cart with its products loaded and totals computed.
#[derive(Debug, Clone, Default)]
pub struct CartContents {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl CartContents {
    /// Build the resolved view from a cart and the products it references.
    ///
    /// Lines whose product is missing from `products` are skipped.
    #[must_use]
    pub fn resolve(cart: &Cart, products: Vec<Product>) -> Self {
        let lines: Vec<CartLine> = products
            .into_iter()
            .filter_map(|product| {
                let quantity = cart.quantity(product.id);
                (quantity > 0).then(|| CartLine {
                    line_total: product.price * quantity,
                    product,
                    quantity,
                })
            })
            .collect();
        let total = lines.iter().map(|line| line.line_total).sum();
        Self { lines, total }
    }

    /// Whether there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn quantity_sum(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the cart from the session. A missing cart is an empty one.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart to the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn store(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Number of units in the session cart, for the header badge.
///
/// Session failures read as an empty cart.
pub async fn count(session: &Session) -> u32 {
    load(session)
        .await
        .map(|cart| cart.quantity_sum())
        .unwrap_or_default()
}

/// Merge a saved account cart into the session cart and return the result.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn merge_into_session(
    session: &Session,
    saved: &Cart,
) -> Result<Cart, tower_sessions::session::Error> {
    let mut cart = load(session).await?;
    cart.merge(saved);
    store(session, &cart).await?;
    Ok(cart)
}

/// Refuse a unit the stock cannot cover.
fn check_stock(product: &Product, in_cart: u32) -> Result<(), CartError> {
    if product.accepts_more(in_cart) {
        Ok(())
    } else {
        Err(CartError::OutOfStock(product.id))
    }
}

// =============================================================================
// Service
// =============================================================================

/// Cart operations for one request.
pub struct CartService<'a> {
    pool: &'a PgPool,
    session: &'a Session,
    user_id: Option<UserId>,
}

impl<'a> CartService<'a> {
    /// Create a cart service bound to the request session.
    ///
    /// Pass the signed-in user, if any, so changes are mirrored onto the account.
    #[must_use]
    pub const fn new(pool: &'a PgPool, session: &'a Session, user_id: Option<UserId>) -> Self {
        Self {
            pool,
            session,
            user_id,
        }
    }

    /// Add one unit of an existing product, within its stock.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownProduct` if the product does not exist, or
    /// `CartError::OutOfStock` if the cart already holds every unit left.
    pub async fn add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let product = ProductRepository::new(self.pool)
            .get_by_id(product_id)
            .await?
            .ok_or(CartError::UnknownProduct(product_id))?;

        let in_cart = load(self.session).await?.quantity(product_id);
        check_stock(&product, in_cart)?;

        self.update(|cart| cart.add(product_id)).await
    }

    /// Remove one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the account cart cannot be written.
    pub async fn decrement(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.update(|cart| cart.decrement(product_id)).await
    }

    /// Remove a product line.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the account cart cannot be written.
    pub async fn delete(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.update(|cart| cart.delete(product_id)).await
    }

    /// Remove several product lines at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the account cart cannot be written.
    pub async fn delete_selection(&self, product_ids: Vec<ProductId>) -> Result<Cart, CartError> {
        self.update(|cart| cart.delete_selection(product_ids)).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the account cart cannot be written.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.update(Cart::clear).await.map(|_| ())
    }

    /// Load the cart with its products.
    ///
    /// Lines pointing at deleted products are dropped from the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the products cannot be loaded or the pruned cart
    /// cannot be written back.
    pub async fn contents(&self) -> Result<CartContents, CartError> {
        let mut cart = load(self.session).await?;
        if cart.is_empty() {
            return Ok(CartContents::default());
        }

        let products = ProductRepository::new(self.pool)
            .get_many(&cart.product_ids())
            .await?;

        let known: Vec<ProductId> = products.iter().map(|p| p.id).collect();
        if cart.retain_known(&known) {
            tracing::info!(lines = cart.len(), "Pruned deleted products from cart");
            self.persist(&cart).await?;
        }

        Ok(CartContents::resolve(&cart, products))
    }

    /// Fold the cart saved on the account into the session cart.
    ///
    /// Called right after a successful login; the merged cart is written to
    /// both the session and the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the account cart cannot be written.
    pub async fn merge_on_login(&self, saved: &Cart) -> Result<Cart, CartError> {
        let cart = merge_into_session(self.session, saved).await?;
        self.mirror(&cart).await?;
        Ok(cart)
    }

    async fn update<F>(&self, change: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart),
    {
        let mut cart = load(self.session).await?;
        change(&mut cart);
        self.persist(&cart).await?;
        Ok(cart)
    }

    async fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        store(self.session, cart).await?;
        self.mirror(cart).await
    }

    async fn mirror(&self, cart: &Cart) -> Result<(), CartError> {
        if let Some(user_id) = self.user_id {
            UserRepository::new(self.pool)
                .save_cart(user_id, cart)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produit {id}"),
            description: None,
            price: Price::new(Decimal::new(cents, 2)),
            stock: Some(5),
            category: "Orthèses".to_owned(),
            image_name: None,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_cart_is_empty() {
        let session = session();
        assert!(load(&session).await.unwrap().is_empty());
        assert_eq!(count(&session).await, 0);
    }

    #[tokio::test]
    async fn test_store_then_count() {
        let session = session();
        let cart: Cart = [(ProductId::new(1), 2), (ProductId::new(4), 3)]
            .into_iter()
            .collect();
        store(&session, &cart).await.unwrap();

        assert_eq!(load(&session).await.unwrap(), cart);
        assert_eq!(count(&session).await, 5);
    }

    #[tokio::test]
    async fn test_merge_into_session_sums_quantities() {
        let session = session();
        let anonymous: Cart = [(ProductId::new(1), 1), (ProductId::new(2), 2)]
            .into_iter()
            .collect();
        store(&session, &anonymous).await.unwrap();

        let saved: Cart = [(ProductId::new(2), 3), (ProductId::new(7), 1)]
            .into_iter()
            .collect();
        let merged = merge_into_session(&session, &saved).await.unwrap();

        assert_eq!(merged.quantity(ProductId::new(1)), 1);
        assert_eq!(merged.quantity(ProductId::new(2)), 5);
        assert_eq!(merged.quantity(ProductId::new(7)), 1);
        assert_eq!(load(&session).await.unwrap(), merged);
    }

    #[tokio::test]
    async fn test_merge_into_empty_session_takes_saved_cart() {
        let session = session();
        let saved: Cart = [(ProductId::new(3), 2)].into_iter().collect();
        let merged = merge_into_session(&session, &saved).await.unwrap();
        assert_eq!(merged, saved);
    }

    #[test]
    fn test_resolve_computes_line_and_grand_totals() {
        let cart: Cart = [(ProductId::new(1), 2), (ProductId::new(2), 1)]
            .into_iter()
            .collect();
        let contents = CartContents::resolve(&cart, vec![product(1, 1_250), product(2, 999)]);

        assert_eq!(contents.lines.len(), 2);
        assert_eq!(contents.lines[0].line_total.amount(), Decimal::new(2_500, 2));
        assert_eq!(contents.total.amount(), Decimal::new(3_499, 2));
        assert_eq!(contents.quantity_sum(), 3);
    }

    #[test]
    fn test_resolve_skips_products_not_in_cart() {
        let cart: Cart = [(ProductId::new(1), 1)].into_iter().collect();
        let contents = CartContents::resolve(&cart, vec![product(1, 100), product(9, 100)]);
        assert_eq!(contents.lines.len(), 1);
        assert_eq!(contents.total.amount(), Decimal::new(100, 2));
    }

    #[test]
    fn test_stock_caps_cart_quantity() {
        let mut lamp = product(1, 1_999);
        assert!(check_stock(&lamp, 0).is_ok());
        assert!(check_stock(&lamp, 4).is_ok());
        assert!(matches!(
            check_stock(&lamp, 5),
            Err(CartError::OutOfStock(id)) if id == ProductId::new(1)
        ));

        lamp.stock = Some(0);
        assert!(!lamp.is_available());
        assert!(check_stock(&lamp, 0).is_err());

        lamp.stock = None;
        assert!(lamp.is_available());
        assert!(check_stock(&lamp, 1_000).is_ok());
    }

    #[test]
    fn test_empty_contents() {
        let contents = CartContents::default();
        assert!(contents.is_empty());
        assert_eq!(contents.total, Price::ZERO);
    }
}
