//! Cart store.
//!
//! Lines are keyed by product identity: the product ID when present, else
//! the SKU. A key appears at most once and every stored quantity is positive.

use leipomo_core::{Price, ProductId, price};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::api::Product;

/// Errors from cart operations. A failed operation leaves the cart unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("no cart line matches {0}")]
    LineNotFound(String),
}

impl CartError {
    /// Message suitable for display to the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::LineNotFound(_) => "That item is no longer in your cart.",
        }
    }
}

/// Something that can be put in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Option<ProductId>,
    pub sku: Option<String>,
    pub name: String,
    pub unit_price: Option<Price>,
}

impl CartItem {
    /// The merge key, or `None` when the item has no identity.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        line_key(self.product_id, self.sku.as_deref())
    }
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: Some(product.id),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.price,
        }
    }
}

fn line_key(product_id: Option<ProductId>, sku: Option<&str>) -> Option<String> {
    product_id.map(|id| id.to_string()).or_else(|| {
        sku.map(str::trim)
            .filter(|sku| !sku.is_empty())
            .map(str::to_owned)
    })
}

/// How to find a line for a quantity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRef {
    Product(ProductId),
    Key(String),
}

impl LineRef {
    fn matches(&self, line: &CartLine) -> bool {
        match self {
            Self::Product(id) => line.product_id == Some(*id),
            Self::Key(key) => line.key == *key,
        }
    }
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product {id}"),
            Self::Key(key) => write!(f, "key '{key}'"),
        }
    }
}

impl From<ProductId> for LineRef {
    fn from(id: ProductId) -> Self {
        Self::Product(id)
    }
}

impl From<&str> for LineRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub key: String,
    pub product_id: Option<ProductId>,
    pub sku: Option<String>,
    pub name: String,
    #[serde(with = "price::exact")]
    pub unit_price: Option<Price>,
    pub quantity: u32,
}

impl CartLine {
    /// Line total, or `None` when the product has no price.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        self.unit_price.map(|price| price.times(self.quantity))
    }
}

/// A cart line as found in a stored session. Older records used `id` and
/// `price`, and quantities may be out of range.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    #[serde(default)]
    key: String,
    #[serde(default, alias = "id")]
    product_id: Option<ProductId>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, alias = "price", with = "price::exact")]
    unit_price: Option<Price>,
    #[serde(default)]
    quantity: i64,
}

/// Totals derived from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
    /// Sum over priced lines.
    pub subtotal: Price,
    /// Some lines have no price and are excluded from the subtotal.
    pub has_unpriced_lines: bool,
    pub can_checkout: bool,
}

/// The cart: an ordered list of lines, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<CartLine>", from = "Vec<Value>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, key: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.key == key)
    }

    /// Quantity held for a product, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == Some(product_id))
            .map_or(0, |line| line.quantity)
    }

    /// Add `quantity` of `item`, merging into an existing line with the same
    /// key. Returns the line's resulting quantity; zero means there is no line.
    ///
    /// Items with neither a product ID nor a SKU are ignored.
    pub fn add_item(&mut self, item: &CartItem, quantity: i64) -> u32 {
        let Some(key) = item.key() else {
            warn!(name = %item.name, "Ignoring cart item without product ID or SKU");
            return 0;
        };

        if let Some(index) = self.lines.iter().position(|line| line.key == key) {
            return self.apply_delta(index, quantity);
        }

        let Some(quantity) = positive(quantity) else {
            return 0;
        };
        self.lines.push(CartLine {
            key,
            product_id: item.product_id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity,
        });
        quantity
    }

    /// Apply `delta` to the line matching `line`, removing it at zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if nothing matches.
    pub fn change_quantity(&mut self, line: &LineRef, delta: i64) -> Result<u32, CartError> {
        let index = self
            .lines
            .iter()
            .position(|candidate| line.matches(candidate))
            .ok_or_else(|| CartError::LineNotFound(line.to_string()))?;
        Ok(self.apply_delta(index, delta))
    }

    /// Remove the line with `key`, if any.
    pub fn remove_line(&mut self, key: &str) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.key == key)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |sum, line| sum.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let total_quantity = self.total_quantity();
        CartSummary {
            lines: self.lines.clone(),
            total_quantity,
            subtotal: self.lines.iter().filter_map(CartLine::total).sum(),
            has_unpriced_lines: self.lines.iter().any(|line| line.unit_price.is_none()),
            can_checkout: total_quantity > 0,
        }
    }

    fn apply_delta(&mut self, index: usize, delta: i64) -> u32 {
        let Some(line) = self.lines.get_mut(index) else {
            return 0;
        };
        match positive(i64::from(line.quantity).saturating_add(delta)) {
            Some(quantity) => {
                line.quantity = quantity;
                quantity
            }
            None => {
                self.lines.remove(index);
                0
            }
        }
    }
}

/// Clamp to a positive `u32`, or `None` for zero and below.
fn positive(quantity: i64) -> Option<u32> {
    (quantity > 0).then(|| u32::try_from(quantity).unwrap_or(u32::MAX))
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl From<Vec<Value>> for Cart {
    /// Rebuild a cart from stored lines, dropping malformed lines and lines
    /// without identity or quantity, and merging duplicate keys.
    fn from(stored: Vec<Value>) -> Self {
        let mut cart = Self::new();
        for value in stored {
            let line = match serde_json::from_value::<StoredLine>(value) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed stored cart line");
                    continue;
                }
            };
            let key = Some(line.key.trim().to_owned())
                .filter(|key| !key.is_empty())
                .or_else(|| line_key(line.product_id, line.sku.as_deref()));
            let Some(key) = key else {
                continue;
            };

            if let Some(index) = cart.lines.iter().position(|existing| existing.key == key) {
                cart.apply_delta(index, line.quantity);
            } else if let Some(quantity) = positive(line.quantity) {
                cart.lines.push(CartLine {
                    key,
                    product_id: line.product_id,
                    sku: line.sku,
                    name: line.name,
                    unit_price: line.unit_price,
                    quantity,
                });
            }
        }
        cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn pulla() -> CartItem {
        CartItem {
            product_id: Some(ProductId::new(7)),
            sku: None,
            name: "Pulla".to_string(),
            unit_price: Some(Price::from_cents(350)),
        }
    }

    fn sku_item(sku: &str) -> CartItem {
        CartItem {
            product_id: None,
            sku: Some(sku.to_string()),
            name: format!("Item {sku}"),
            unit_price: None,
        }
    }

    fn assert_invariants(cart: &Cart) {
        let keys: HashSet<&str> = cart.lines().iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys.len(), cart.lines().len(), "duplicate keys in {cart:?}");
        assert!(cart.lines().iter().all(|l| l.quantity > 0));
    }

    #[test]
    fn test_add_merges_by_key() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(&pulla(), 2), 2);
        assert_eq!(cart.add_item(&pulla(), 1), 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line("7").unwrap().quantity, 3);
    }

    #[test]
    fn test_product_id_wins_over_sku() {
        let item = CartItem {
            sku: Some("PULLA-1".to_string()),
            ..pulla()
        };
        assert_eq!(item.key().as_deref(), Some("7"));
        assert_eq!(sku_item(" RUIS ").key().as_deref(), Some("RUIS"));
    }

    #[test]
    fn test_add_without_identity_is_ignored() {
        let mut cart = Cart::new();
        let item = CartItem {
            product_id: None,
            sku: Some("  ".to_string()),
            name: "Mystery".to_string(),
            unit_price: None,
        };
        assert_eq!(cart.add_item(&item, 1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_non_positive_add_never_stores_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(&pulla(), 0), 0);
        assert_eq!(cart.add_item(&pulla(), -3), 0);
        assert!(cart.is_empty());

        cart.add_item(&pulla(), 2);
        assert_eq!(cart.add_item(&pulla(), -5), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_by_id_or_key() {
        let mut cart = Cart::new();
        cart.add_item(&pulla(), 2);
        cart.add_item(&sku_item("RUIS"), 1);

        assert_eq!(cart.change_quantity(&ProductId::new(7).into(), 1).unwrap(), 3);
        assert_eq!(cart.change_quantity(&"RUIS".into(), -1).unwrap(), 0);
        assert!(cart.line("RUIS").is_none());
        assert_eq!(
            cart.change_quantity(&"RUIS".into(), 1),
            Err(CartError::LineNotFound("key 'RUIS'".to_string()))
        );
    }

    #[test]
    fn test_invariants_hold_over_mixed_operations() {
        let mut cart = Cart::new();
        let items = [pulla(), sku_item("A"), sku_item("B")];
        let deltas = [3, -1, 2, -4, 1, 0, -2, 5, -10, 1];

        for (item, delta) in items.iter().cycle().zip(deltas) {
            cart.add_item(item, delta);
            assert_invariants(&cart);
            if let Some(key) = item.key() {
                let _ = cart.change_quantity(&LineRef::Key(key), -delta);
            }
            assert_invariants(&cart);
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&pulla(), 2);
        cart.add_item(&sku_item("A"), 1);

        assert_eq!(cart.remove_line("7").unwrap().name, "Pulla");
        assert!(cart.remove_line("7").is_none());
        assert_eq!(cart.total_quantity(), 1);

        cart.clear();
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_summary() {
        let mut cart = Cart::new();
        cart.add_item(&pulla(), 2);
        cart.add_item(&sku_item("A"), 1);

        let summary = cart.summary();
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.subtotal, Price::from_cents(700));
        assert!(summary.has_unpriced_lines);
        assert!(summary.can_checkout);
        assert!(!Cart::new().summary().can_checkout);
    }

    #[test]
    fn test_stored_cart_is_normalised() {
        let cart: Cart = serde_json::from_str(
            r#"[
                {"key": "7", "productId": 7, "name": "Pulla", "unitPrice": 3.5, "quantity": 2},
                {"id": 7, "name": "Pulla", "price": 3.5, "quantity": 1},
                {"sku": "RUIS", "name": "Ruisleipä", "quantity": 0},
                {"name": "Nameless", "quantity": 4},
                {"key": "B", "sku": "B", "name": "Bagel", "quantity": -1}
            ]"#,
        )
        .unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line("7").unwrap().quantity, 3);
    }

    #[test]
    fn test_serialized_line_shape() {
        let mut cart = Cart::new();
        cart.add_item(&pulla(), 2);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "key": "7",
                "productId": 7,
                "sku": null,
                "name": "Pulla",
                "unitPrice": "3.50",
                "quantity": 2
            }])
        );
    }

    #[test]
    fn test_stored_price_keeps_precision() {
        let mut cart = Cart::new();
        let precise = Price::new("1.2345678901234567891".parse().unwrap());
        cart.add_item(
            &CartItem {
                unit_price: Some(precise),
                ..pulla()
            },
            1,
        );

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.line("7").unwrap().unit_price, Some(precise));
    }

    #[test]
    fn test_malformed_stored_line_is_skipped() {
        let cart: Cart = serde_json::from_str(
            r#"[
                {"key": "7", "productId": 7, "name": "Pulla", "unitPrice": "3.50", "quantity": 2},
                {"key": "B", "sku": "B", "name": "Bagel", "quantity": "lots"},
                {"sku": "RUIS", "name": "Ruisleipä", "unitPrice": 6, "quantity": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.line("7").unwrap().unit_price, Some(Price::from_cents(350)));
        assert_eq!(cart.line("RUIS").unwrap().quantity, 1);
        assert!(cart.line("B").is_none());
    }
}
