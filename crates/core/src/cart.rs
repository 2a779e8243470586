//! Shopping cart contents.
//!
//! A [`Cart`] maps product IDs to quantities. It is stored as JSON both in
//! the visitor's session and, for signed-in users, in `users.cart`, so the
//! serialized form is a plain object keyed by product ID:
//!
//! ```json
//! {"3": 2, "17": 1}
//! ```
//!
//! Every line in a cart has a quantity of at least one; operations that
//! would bring a line to zero remove it instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Product quantities keyed by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<ProductId, u32>);

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add one unit of a product.
    pub fn add(&mut self, product_id: ProductId) {
        let quantity = self.0.entry(product_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
    }

    /// Remove one unit of a product, dropping the line when it reaches zero.
    ///
    /// Unknown products are ignored.
    pub fn decrement(&mut self, product_id: ProductId) {
        if let Some(quantity) = self.0.get_mut(&product_id) {
            if *quantity > 1 {
                *quantity -= 1;
            } else {
                self.0.remove(&product_id);
            }
        }
    }

    /// Remove a line entirely.
    pub fn delete(&mut self, product_id: ProductId) {
        self.0.remove(&product_id);
    }

    /// Remove every listed line. Unknown IDs are ignored.
    pub fn delete_selection<I>(&mut self, product_ids: I)
    where
        I: IntoIterator<Item = ProductId>,
    {
        for product_id in product_ids {
            self.0.remove(&product_id);
        }
    }

    /// Fold another cart into this one, summing quantities.
    ///
    /// Used when a visitor signs in: the cart saved on their account is
    /// merged into whatever they collected while anonymous.
    pub fn merge(&mut self, other: &Self) {
        for (&product_id, &quantity) in &other.0 {
            if quantity == 0 {
                continue;
            }
            let line = self.0.entry(product_id).or_insert(0);
            *line = line.saturating_add(quantity);
        }
    }

    /// Drop lines whose product is not in `known`.
    ///
    /// Returns `true` if anything was removed.
    pub fn retain_known(&mut self, known: &[ProductId]) -> bool {
        let before = self.0.len();
        self.0.retain(|product_id, _| known.contains(product_id));
        self.0.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Quantity of a single product.
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.0.get(&product_id).copied().unwrap_or(0)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn quantity_sum(&self) -> u32 {
        self.0.values().fold(0, |sum, q| sum.saturating_add(*q))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Product IDs in the cart, ascending.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.0.keys().copied().collect()
    }

    /// Iterate over `(product, quantity)` lines, ascending by product ID.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.0.iter().map(|(&id, &q)| (id, q))
    }

    /// Build a cart from stored JSON, discarding zero quantities.
    ///
    /// Anything that is not a well-formed cart yields an empty cart rather
    /// than an error; a corrupt saved cart must never block sign-in.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut cart: Self = serde_json::from_value(value.clone()).unwrap_or_default();
        cart.0.retain(|_, q| *q > 0);
        cart
    }

    /// JSON form for storage.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(id, q)| (id.to_string(), serde_json::Value::from(*q)))
                .collect(),
        )
    }
}

impl FromIterator<(ProductId, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, q)| *q > 0).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(n: i32) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let mut cart = Cart::new();
        cart.add(id(1));
        cart.add(id(1));
        cart.add(id(2));
        assert_eq!(cart.quantity(id(1)), 2);
        assert_eq!(cart.quantity(id(2)), 1);
        assert_eq!(cart.quantity_sum(), 3);
    }

    #[test]
    fn test_decrement_drops_line_at_one() {
        let mut cart: Cart = [(id(1), 2)].into_iter().collect();
        cart.decrement(id(1));
        assert_eq!(cart.quantity(id(1)), 1);
        cart.decrement(id(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_unknown_is_noop() {
        let mut cart: Cart = [(id(1), 2)].into_iter().collect();
        cart.decrement(id(9));
        assert_eq!(cart.quantity_sum(), 2);
    }

    #[test]
    fn test_delete_and_delete_selection() {
        let mut cart: Cart = [(id(1), 3), (id(2), 1), (id(3), 4)].into_iter().collect();
        cart.delete(id(1));
        assert_eq!(cart.len(), 2);
        cart.delete_selection([id(2), id(3), id(42)]);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_sums_overlapping_lines() {
        let mut session: Cart = [(id(1), 1), (id(2), 2)].into_iter().collect();
        let saved: Cart = [(id(2), 3), (id(5), 1)].into_iter().collect();
        session.merge(&saved);
        assert_eq!(session.quantity(id(1)), 1);
        assert_eq!(session.quantity(id(2)), 5);
        assert_eq!(session.quantity(id(5)), 1);
    }

    #[test]
    fn test_merge_into_empty_copies() {
        let mut session = Cart::new();
        let saved: Cart = [(id(7), 2)].into_iter().collect();
        session.merge(&saved);
        assert_eq!(session, saved);
    }

    #[test]
    fn test_retain_known_prunes_deleted_products() {
        let mut cart: Cart = [(id(1), 1), (id(2), 1)].into_iter().collect();
        assert!(cart.retain_known(&[id(2)]));
        assert_eq!(cart.product_ids(), vec![id(2)]);
        assert!(!cart.retain_known(&[id(2)]));
    }

    #[test]
    fn test_json_shape_is_keyed_by_product_id() {
        let cart: Cart = [(id(3), 2), (id(17), 1)].into_iter().collect();
        let json = cart.to_json();
        assert_eq!(json, serde_json::json!({"3": 2, "17": 1}));
        assert_eq!(serde_json::to_value(&cart).unwrap(), json);
        assert_eq!(Cart::from_json(&json), cart);
    }

    #[test]
    fn test_from_json_tolerates_garbage() {
        assert!(Cart::from_json(&serde_json::json!([])).is_empty());
        assert!(Cart::from_json(&serde_json::Value::Null).is_empty());
        let cart = Cart::from_json(&serde_json::json!({"4": 0, "5": 2}));
        assert_eq!(cart.product_ids(), vec![id(5)]);
    }

    #[test]
    fn test_add_saturates() {
        let mut cart: Cart = [(id(1), u32::MAX)].into_iter().collect();
        cart.add(id(1));
        assert_eq!(cart.quantity(id(1)), u32::MAX);
    }
}
