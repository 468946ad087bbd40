//! Shopping cart model.
//!
//! The cart is an insertion-ordered set of [`CartItem`]s keyed by product
//! id. Lookups go through a position index so add/remove by id never scan
//! the list. Quantities are always at least one: decrementing the last
//! unit removes the line.
//!
//! Every operation here is total. In particular [`Cart::add`] does not
//! check stock; [`Storefront::add_to_cart`](crate::Storefront::add_to_cart)
//! applies that guard before calling it.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use corner_shop_core::{ProductId, ShippingMethod};

use crate::catalog::{Product, StockStatus};

/// Errors raised by cart mutations that go through the storefront.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product id is not in the catalog.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    /// The cart already holds every unit in stock.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<ShippingMethod>,
}

impl CartItem {
    fn from_product(product: &Product, shipping_method: Option<ShippingMethod>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            image: product.image.clone(),
            quantity: 1,
            shipping_method,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Units that could still be added before reaching stock.
    #[must_use]
    pub fn remaining_stock(&self) -> i64 {
        i64::from(self.stock) - i64::from(self.quantity)
    }

    /// Whether the line already holds every unit in stock.
    #[must_use]
    pub const fn is_at_stock_limit(&self) -> bool {
        self.quantity >= self.stock
    }

    /// Stock badge for this line.
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_remaining(self.remaining_stock())
    }
}

/// The shopper's cart.
///
/// Serializes as a plain JSON array of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
    index: HashMap<ProductId, usize>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line or appends a new line at quantity 1.
    /// The shipping method only applies to a new line; an existing line
    /// keeps the method it was first added with. Returns the new quantity.
    pub fn add(&mut self, product: &Product, shipping_method: Option<ShippingMethod>) -> u32 {
        if let Some(item) = self.get_mut(product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }

        self.index.insert(product.id, self.items.len());
        self.items
            .push(CartItem::from_product(product, shipping_method));
        1
    }

    /// Remove one unit of the product, deleting the line at zero.
    ///
    /// Returns the remaining quantity (zero when the line was deleted), or
    /// `None` if the product is not in the cart.
    pub fn remove(&mut self, id: ProductId) -> Option<u32> {
        let item = self.get_mut(id)?;
        item.quantity = item.quantity.saturating_sub(1);
        let remaining = item.quantity;

        if remaining == 0 {
            self.remove_item(id);
        }
        Some(remaining)
    }

    /// Delete the product's line regardless of quantity.
    pub fn remove_item(&mut self, id: ProductId) -> Option<CartItem> {
        let position = self.index.remove(&id)?;
        let removed = self.items.remove(position);
        self.reindex_from(position);
        Some(removed)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.index.get(&id).and_then(|&i| self.items.get(i))
    }

    /// Quantity of `id` in the cart (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.quantity)
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Σ price × quantity over every line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ quantity over every line.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        let position = *self.index.get(&id)?;
        self.items.get_mut(position)
    }

    fn reindex_from(&mut self, start: usize) {
        for (position, item) in self.items.iter().enumerate().skip(start) {
            self.index.insert(item.id, position);
        }
    }
}

impl From<Vec<CartItem>> for Cart {
    /// Rebuild a cart from persisted lines.
    ///
    /// Lines with quantity zero are dropped and repeated ids are merged into
    /// the first occurrence, so the result always satisfies the cart
    /// invariants whatever was stored.
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|item| item.quantity > 0) {
            if let Some(existing) = cart.get_mut(item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                cart.index.insert(item.id, cart.items.len());
                cart.items.push(item);
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_adding_n_times_yields_quantity_n() {
        let lamp = product(1, "Lamp", dec!(10), 5);
        let mut cart = Cart::new();

        for expected in 1..=4 {
            assert_eq!(cart.add(&lamp, None), expected);
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(lamp.id), 4);
    }

    #[test]
    fn test_add_is_not_stock_limited() {
        let lamp = product(1, "Lamp", dec!(10), 1);
        let mut cart = Cart::new();

        cart.add(&lamp, None);
        cart.add(&lamp, None);

        let line = cart.get(lamp.id).unwrap();
        assert_eq!(line.quantity, 2);
        assert!(line.is_at_stock_limit());
        assert_eq!(line.stock_status(), StockStatus::OutOfStock);
    }

    #[test]
    fn test_remove_decrements_then_deletes() {
        let lamp = product(1, "Lamp", dec!(10), 5);
        let mut cart = Cart::new();
        cart.add(&lamp, None);
        cart.add(&lamp, None);

        assert_eq!(cart.remove(lamp.id), Some(1));
        assert_eq!(cart.remove(lamp.id), Some(0));
        assert!(cart.get(lamp.id).is_none());
        assert!(cart.is_empty());

        // Never goes negative
        assert_eq!(cart.remove(lamp.id), None);
    }

    #[test]
    fn test_remove_item_keeps_order_and_index() {
        let a = product(1, "A", dec!(1), 5);
        let b = product(2, "B", dec!(2), 5);
        let c = product(3, "C", dec!(3), 5);
        let mut cart = Cart::new();
        cart.add(&a, None);
        cart.add(&b, None);
        cart.add(&b, None);
        cart.add(&c, None);

        let removed = cart.remove_item(b.id).unwrap();
        assert_eq!(removed.quantity, 2);

        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);

        // Index still points at the right line after the shift
        cart.add(&c, None);
        assert_eq!(cart.quantity_of(c.id), 2);
        assert_eq!(cart.remove_item(b.id), None);
    }

    #[test]
    fn test_total_example() {
        let mut cart = Cart::new();
        let one = product(1, "One", dec!(10), 5);
        let two = product(2, "Two", dec!(5), 5);
        cart.add(&one, None);
        cart.add(&one, None);
        cart.add(&two, None);

        assert_eq!(cart.total(), dec!(25.00));
        assert_eq!(cart.total(), cart.total());
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_shipping_method_set_on_first_add_only() {
        let lamp = product(1, "Lamp", dec!(10), 5);
        let mut cart = Cart::new();

        cart.add(&lamp, Some(ShippingMethod::Express));
        cart.add(&lamp, Some(ShippingMethod::Overnight));

        assert_eq!(
            cart.get(lamp.id).unwrap().shipping_method,
            Some(ShippingMethod::Express)
        );
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&product(1, "A", dec!(1), 1), None);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_as_array_of_lines() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Lamp", dec!(10), 5), Some(ShippingMethod::Standard));

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "name": "Lamp",
                "price": 10.0,
                "stock": 5,
                "image": "/images/products/1.jpg",
                "quantity": 1,
                "shippingMethod": "standard"
            }])
        );

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_rehydration_normalizes_lines() {
        let json = r#"[
            {"id":1,"name":"A","price":2,"stock":9,"image":"","quantity":2},
            {"id":2,"name":"B","price":3,"stock":9,"image":"","quantity":0},
            {"id":1,"name":"A","price":2,"stock":9,"image":"","quantity":1}
        ]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
        assert_eq!(cart.quantity_of(ProductId::new(2)), 0);
    }
}
